use crate::domain::{
    ChangeList, CommitDetails, Credentials, FileLines, Preferences, RepoSnapshot,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum InboundEvent {
    #[serde(rename = "start-process")]
    StartProcess,
    #[serde(rename = "end-process")]
    EndProcess,
    #[serde(rename = "update_all")]
    UpdateAll(RepoSnapshot),
    #[serde(rename = "update_changes")]
    UpdateChanges(ChangeList),
    #[serde(rename = "show-file-lines")]
    ShowFileLines(FileLines),
    #[serde(rename = "commit-info")]
    CommitInfo(CommitDetails),
    #[serde(rename = "get-credentials")]
    GetCredentials,
    #[serde(rename = "show-preferences")]
    ShowPreferences(Preferences),
    #[serde(rename = "error")]
    Error(String),
}

impl InboundEvent {
    pub fn tag(&self) -> &'static str {
        match self {
            InboundEvent::StartProcess => "start-process",
            InboundEvent::EndProcess => "end-process",
            InboundEvent::UpdateAll(_) => "update_all",
            InboundEvent::UpdateChanges(_) => "update_changes",
            InboundEvent::ShowFileLines(_) => "show-file-lines",
            InboundEvent::CommitInfo(_) => "commit-info",
            InboundEvent::GetCredentials => "get-credentials",
            InboundEvent::ShowPreferences(_) => "show-preferences",
            InboundEvent::Error(_) => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", content = "payload", rename_all = "kebab-case")]
pub enum OutboundCommand {
    Refresh,
    Stage { paths: Vec<String> },
    Unstage { paths: Vec<String> },
    Commit { message: String },
    CommitPush { message: String },
    Fetch,
    Pull,
    Push { force: bool },
    Checkout { shorthand: String },
    CheckoutRemote { shorthand: String },
    Branch { name: String, checkout: bool },
    DeleteLocalBranch { shorthand: String, force: bool },
    DeleteRemoteBranch { shorthand: String },
    DeleteTag { shorthand: String },
    SaveCredentials(Credentials),
    SavePreferences(Preferences),
    LoadPreferences,
    FileDiff { path: String, staged: bool },
    CommitInfo { oid: String },
}

impl OutboundCommand {
    pub fn tag(&self) -> &'static str {
        match self {
            OutboundCommand::Refresh => "refresh",
            OutboundCommand::Stage { .. } => "stage",
            OutboundCommand::Unstage { .. } => "unstage",
            OutboundCommand::Commit { .. } => "commit",
            OutboundCommand::CommitPush { .. } => "commit-push",
            OutboundCommand::Fetch => "fetch",
            OutboundCommand::Pull => "pull",
            OutboundCommand::Push { .. } => "push",
            OutboundCommand::Checkout { .. } => "checkout",
            OutboundCommand::CheckoutRemote { .. } => "checkout-remote",
            OutboundCommand::Branch { .. } => "branch",
            OutboundCommand::DeleteLocalBranch { .. } => "delete-local-branch",
            OutboundCommand::DeleteRemoteBranch { .. } => "delete-remote-branch",
            OutboundCommand::DeleteTag { .. } => "delete-tag",
            OutboundCommand::SaveCredentials(_) => "save-credentials",
            OutboundCommand::SavePreferences(_) => "save-preferences",
            OutboundCommand::LoadPreferences => "load-preferences",
            OutboundCommand::FileDiff { .. } => "file-diff",
            OutboundCommand::CommitInfo { .. } => "commit-info",
        }
    }

    pub fn validate(&self) -> Result<(), ProtocolError> {
        let violation = match self {
            OutboundCommand::Stage { paths } | OutboundCommand::Unstage { paths }
                if paths.is_empty() =>
            {
                Some("paths must not be empty")
            }
            OutboundCommand::Stage { paths } | OutboundCommand::Unstage { paths }
                if paths.iter().any(|p| p.trim().is_empty()) =>
            {
                Some("paths must not contain blank entries")
            }
            OutboundCommand::Commit { message } | OutboundCommand::CommitPush { message }
                if message.trim().is_empty() =>
            {
                Some("commit message must not be empty")
            }
            OutboundCommand::Branch { name, .. } if !is_valid_ref_name(name) => {
                Some("branch name is not a valid ref name")
            }
            OutboundCommand::Checkout { shorthand }
            | OutboundCommand::CheckoutRemote { shorthand }
            | OutboundCommand::DeleteLocalBranch { shorthand, .. }
            | OutboundCommand::DeleteRemoteBranch { shorthand }
            | OutboundCommand::DeleteTag { shorthand }
                if shorthand.trim().is_empty() =>
            {
                Some("ref name must not be empty")
            }
            OutboundCommand::FileDiff { path, .. } if path.trim().is_empty() => {
                Some("path must not be empty")
            }
            OutboundCommand::CommitInfo { oid } if oid.trim().is_empty() => {
                Some("commit id must not be empty")
            }
            _ => None,
        };

        match violation {
            Some(reason) => Err(ProtocolError::Invalid {
                tag: self.tag(),
                reason,
            }),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("invalid {tag} payload: {reason}")]
    Invalid {
        tag: &'static str,
        reason: &'static str,
    },
}

pub fn decode_event(line: &str) -> Result<InboundEvent, ProtocolError> {
    Ok(serde_json::from_str(line.trim())?)
}

pub fn encode_command(command: &OutboundCommand) -> Result<String, ProtocolError> {
    command.validate()?;
    Ok(serde_json::to_string(command)?)
}

/// A conservative subset of git's ref name rules.
pub fn is_valid_ref_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('-')
        && !name.starts_with('/')
        && !name.ends_with('/')
        && !name.ends_with('.')
        && !name.ends_with(".lock")
        && !name.contains("..")
        && !name.contains("//")
        && !name.contains("@{")
        && name != "@"
        && !name
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || "~^:?*[\\".contains(c))
}

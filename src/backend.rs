use crate::domain::{Credentials, Preferences};
use crate::infra::{RepoClient, command_to_invocations};
use crate::protocol::{InboundEvent, OutboundCommand};
use anyhow::{Result, bail};
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

#[derive(Debug, Default)]
pub(crate) struct WorkerState {
    pub preferences: Preferences,
    pub credentials: Option<Credentials>,
}

#[derive(Debug)]
enum Failure {
    Error(String),
    NeedsCredentials(String),
}

impl From<anyhow::Error> for Failure {
    fn from(err: anyhow::Error) -> Self {
        Failure::Error(format!("{err:#}"))
    }
}

/// Every command gets exactly one completion: `end-process` or `error`.
pub(crate) async fn worker_loop(
    client: Arc<dyn RepoClient>,
    mut state: WorkerState,
    mut command_rx: UnboundedReceiver<OutboundCommand>,
    event_tx: UnboundedSender<InboundEvent>,
) {
    while let Some(command) = command_rx.recv().await {
        let tag = command.tag();
        tracing::info!(command = tag, "backend command received");

        let events = match handle_command(&client, &mut state, command).await {
            Ok(mut events) => {
                events.push(InboundEvent::EndProcess);
                events
            }
            Err(Failure::Error(message)) => {
                tracing::warn!(command = tag, %message, "backend command failed");
                vec![InboundEvent::Error(message)]
            }
            Err(Failure::NeedsCredentials(message)) => {
                tracing::warn!(command = tag, %message, "backend command needs credentials");
                vec![InboundEvent::Error(message), InboundEvent::GetCredentials]
            }
        };

        for event in events {
            if event_tx.send(event).is_err() {
                return;
            }
        }
    }
}

async fn handle_command(
    client: &Arc<dyn RepoClient>,
    state: &mut WorkerState,
    command: OutboundCommand,
) -> std::result::Result<Vec<InboundEvent>, Failure> {
    let events = match command {
        OutboundCommand::Refresh => {
            let limit = state.preferences.commit_limit;
            let snapshot = blocking(client, move |c| c.snapshot(limit)).await?;
            vec![InboundEvent::UpdateAll(snapshot)]
        }
        OutboundCommand::FileDiff { path, staged } => {
            let lines = blocking(client, move |c| c.file_diff(&path, staged)).await?;
            vec![InboundEvent::ShowFileLines(lines)]
        }
        OutboundCommand::CommitInfo { oid } => {
            let details = blocking(client, move |c| c.commit_details(&oid)).await?;
            vec![InboundEvent::CommitInfo(details)]
        }
        OutboundCommand::SaveCredentials(credentials) => {
            state.credentials = Some(credentials);
            Vec::new()
        }
        OutboundCommand::SavePreferences(preferences) => {
            state.preferences = preferences;
            Vec::new()
        }
        OutboundCommand::LoadPreferences => {
            vec![InboundEvent::ShowPreferences(state.preferences)]
        }
        command @ (OutboundCommand::Stage { .. } | OutboundCommand::Unstage { .. }) => {
            run_git(client, state, &command).await?;
            let changes = blocking(client, |c| c.changes()).await?;
            vec![InboundEvent::UpdateChanges(changes)]
        }
        command => {
            run_git(client, state, &command).await?;
            let limit = state.preferences.commit_limit;
            let snapshot = blocking(client, move |c| c.snapshot(limit)).await?;
            vec![InboundEvent::UpdateAll(snapshot)]
        }
    };
    Ok(events)
}

async fn run_git(
    client: &Arc<dyn RepoClient>,
    state: &WorkerState,
    command: &OutboundCommand,
) -> std::result::Result<(), Failure> {
    for invocation in command_to_invocations(command, &state.preferences)? {
        let credentials = state.credentials.clone();
        let result =
            blocking(client, move |c| c.run(&invocation, credentials.as_ref())).await?;
        if result.success() {
            continue;
        }

        let message = format!(
            "{} failed (exit={}): {}",
            command.tag(),
            result.exit_code,
            squash_lines(&result.stderr)
        );
        if result.is_auth_failure() {
            return Err(Failure::NeedsCredentials(message));
        }
        return Err(Failure::Error(message));
    }
    Ok(())
}

async fn blocking<T, F>(client: &Arc<dyn RepoClient>, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&dyn RepoClient) -> Result<T> + Send + 'static,
{
    let client = client.clone();
    match tokio::task::spawn_blocking(move || f(client.as_ref())).await {
        Ok(result) => result,
        Err(err) => bail!("join error: {err}"),
    }
}

fn squash_lines(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        ChangeList, ChangedFile, CommitDetails, CommitSummary, FileLines, FileStatus,
        RepoSnapshot,
    };
    use crate::infra::{CommandResult, GitInvocation};
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    #[derive(Default)]
    struct FakeClient {
        runs: Mutex<Vec<(Vec<String>, bool)>>,
        stderr: Option<String>,
    }

    impl RepoClient for FakeClient {
        fn snapshot(&self, commit_limit: usize) -> Result<RepoSnapshot> {
            Ok(RepoSnapshot {
                commits: (0..commit_limit.min(2))
                    .map(|i| CommitSummary {
                        oid: format!("{i:040}"),
                        parents: Vec::new(),
                        author: "dev".to_string(),
                        time: 0,
                        summary: format!("commit {i}"),
                        refs: Vec::new(),
                    })
                    .collect(),
                ..RepoSnapshot::default()
            })
        }

        fn changes(&self) -> Result<ChangeList> {
            Ok(ChangeList {
                unstaged: Vec::new(),
                staged: vec![ChangedFile {
                    path: "a.rs".to_string(),
                    status: FileStatus::Modified,
                }],
            })
        }

        fn file_diff(&self, path: &str, staged: bool) -> Result<FileLines> {
            Ok(FileLines {
                path: path.to_string(),
                staged,
                file_type: "rs".to_string(),
                lines: Vec::new(),
            })
        }

        fn commit_details(&self, _oid: &str) -> Result<CommitDetails> {
            bail!("unknown revision")
        }

        fn run(
            &self,
            invocation: &GitInvocation,
            credentials: Option<&Credentials>,
        ) -> Result<CommandResult> {
            let args = invocation
                .args
                .iter()
                .map(|arg| arg.to_string_lossy().to_string())
                .collect();
            self.runs
                .lock()
                .expect("lock runs")
                .push((args, credentials.is_some()));
            Ok(CommandResult {
                exit_code: if self.stderr.is_some() { 128 } else { 0 },
                stdout: String::new(),
                stderr: self.stderr.clone().unwrap_or_default(),
                duration_ms: 1,
            })
        }
    }

    async fn run_commands(
        client: Arc<FakeClient>,
        commands: Vec<OutboundCommand>,
    ) -> Vec<InboundEvent> {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        for command in commands {
            command_tx.send(command).expect("queue command");
        }
        drop(command_tx);

        worker_loop(client, WorkerState::default(), command_rx, event_tx).await;

        let mut events = Vec::new();
        while let Ok(event) = event_rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn tags(events: &[InboundEvent]) -> Vec<&'static str> {
        events.iter().map(InboundEvent::tag).collect()
    }

    #[tokio::test]
    async fn every_command_gets_exactly_one_completion() {
        let client = Arc::new(FakeClient::default());
        let events = run_commands(
            client,
            vec![
                OutboundCommand::Refresh,
                OutboundCommand::Stage {
                    paths: vec!["a.rs".to_string()],
                },
                OutboundCommand::CommitInfo {
                    oid: "nope".to_string(),
                },
                OutboundCommand::LoadPreferences,
            ],
        )
        .await;

        assert_eq!(
            tags(&events),
            vec![
                "update_all",
                "end-process",
                "update_changes",
                "end-process",
                "error",
                "show-preferences",
                "end-process",
            ]
        );
    }

    #[tokio::test]
    async fn auth_failure_asks_for_credentials_and_retry_uses_them() {
        let failing = Arc::new(FakeClient {
            stderr: Some("fatal: Authentication failed for 'https://example.com'".to_string()),
            ..FakeClient::default()
        });
        let events = run_commands(failing, vec![OutboundCommand::Fetch]).await;
        assert_eq!(tags(&events), vec!["error", "get-credentials"]);

        let client = Arc::new(FakeClient::default());
        run_commands(
            client.clone(),
            vec![
                OutboundCommand::SaveCredentials(Credentials {
                    username: "octo".to_string(),
                    password: "secret".to_string(),
                }),
                OutboundCommand::Fetch,
                OutboundCommand::Commit {
                    message: "msg".to_string(),
                },
            ],
        )
        .await;

        let runs = client.runs.lock().expect("lock runs").clone();
        assert_eq!(
            runs,
            vec![
                (vec!["fetch".to_string(), "--all".to_string()], true),
                (
                    vec!["commit".to_string(), "-m".to_string(), "msg".to_string()],
                    true
                ),
            ]
        );
    }

    #[tokio::test]
    async fn saved_preferences_drive_later_commands() {
        let client = Arc::new(FakeClient::default());
        let events = run_commands(
            client.clone(),
            vec![
                OutboundCommand::SavePreferences(Preferences {
                    commit_limit: 1,
                    prune_on_fetch: true,
                }),
                OutboundCommand::Fetch,
            ],
        )
        .await;

        let Some(InboundEvent::UpdateAll(snapshot)) = events.get(1) else {
            panic!("expected snapshot after fetch, got {:?}", tags(&events));
        };
        assert_eq!(snapshot.commits.len(), 1);

        let runs = client.runs.lock().expect("lock runs").clone();
        assert_eq!(
            runs[0].0,
            vec!["fetch".to_string(), "--all".to_string(), "--prune".to_string()]
        );
    }

    #[test]
    fn squash_lines_joins_non_empty_lines() {
        assert_eq!(squash_lines("a\n\n  b  \n"), "a | b");
    }
}

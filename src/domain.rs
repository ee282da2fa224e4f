use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefKind {
    Local,
    Remote,
    Tag,
}

impl RefKind {
    pub const ALL: [RefKind; 3] = [RefKind::Local, RefKind::Remote, RefKind::Tag];

    pub fn title(self) -> &'static str {
        match self {
            RefKind::Local => "Local",
            RefKind::Remote => "Remote",
            RefKind::Tag => "Tags",
        }
    }

    /// What activating a leaf of this kind does.
    pub fn affordance(self) -> &'static str {
        match self {
            RefKind::Local => "checkout",
            RefKind::Remote => "track",
            RefKind::Tag => "tag",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceEntry {
    pub full_name: String,
    pub shorthand: String,
    pub kind: RefKind,
    #[serde(default)]
    pub is_head: bool,
    #[serde(default)]
    pub ahead: u32,
    #[serde(default)]
    pub behind: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
    Copied,
    TypeChange,
    Untracked,
    Conflicted,
}

impl FileStatus {
    pub fn from_status_char(c: char) -> Option<Self> {
        match c {
            'A' => Some(Self::Added),
            'M' => Some(Self::Modified),
            'D' => Some(Self::Deleted),
            'R' => Some(Self::Renamed),
            'C' => Some(Self::Copied),
            'T' => Some(Self::TypeChange),
            '?' => Some(Self::Untracked),
            'U' => Some(Self::Conflicted),
            _ => None,
        }
    }

    pub fn as_symbol(self) -> char {
        match self {
            Self::Added => 'A',
            Self::Modified => 'M',
            Self::Deleted => 'D',
            Self::Renamed => 'R',
            Self::Copied => 'C',
            Self::TypeChange => 'T',
            Self::Untracked => '?',
            Self::Conflicted => 'U',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFile {
    pub path: String,
    pub status: FileStatus,
}

impl fmt::Display for ChangedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status.as_symbol(), self.path)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeList {
    #[serde(default)]
    pub unstaged: Vec<ChangedFile>,
    #[serde(default)]
    pub staged: Vec<ChangedFile>,
}

impl ChangeList {
    pub fn files_changed(&self) -> usize {
        self.unstaged.len() + self.staged.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitSummary {
    pub oid: String,
    #[serde(default)]
    pub parents: Vec<String>,
    pub author: String,
    pub time: i64,
    pub summary: String,
    #[serde(default)]
    pub refs: Vec<String>,
}

impl CommitSummary {
    pub fn short_oid(&self) -> &str {
        match self.oid.char_indices().nth(7) {
            Some((idx, _)) => &self.oid[..idx],
            None => &self.oid,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitDetails {
    pub summary: CommitSummary,
    pub message: String,
    #[serde(default)]
    pub files: Vec<ChangedFile>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiffOrigin {
    FileHeader,
    HunkHeader,
    Context,
    Addition,
    Deletion,
}

impl DiffOrigin {
    pub fn marker(self) -> char {
        match self {
            DiffOrigin::FileHeader => 'F',
            DiffOrigin::HunkHeader => 'H',
            DiffOrigin::Context => ' ',
            DiffOrigin::Addition => '+',
            DiffOrigin::Deletion => '-',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLine {
    pub old_lineno: Option<u32>,
    pub new_lineno: Option<u32>,
    pub origin: DiffOrigin,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileLines {
    pub path: String,
    pub staged: bool,
    #[serde(default)]
    pub file_type: String,
    pub lines: Vec<DiffLine>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralInfo {
    pub head_has_upstream: bool,
    pub is_merging: bool,
    pub is_rebasing: bool,
    pub is_cherrypicking: bool,
    pub is_reverting: bool,
}

impl GeneralInfo {
    pub fn operation_in_progress(&self) -> Option<&'static str> {
        if self.is_merging {
            Some("MERGING")
        } else if self.is_rebasing {
            Some("REBASING")
        } else if self.is_cherrypicking {
            Some("CHERRY-PICKING")
        } else if self.is_reverting {
            Some("REVERTING")
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoSnapshot {
    #[serde(default)]
    pub general: GeneralInfo,
    #[serde(default)]
    pub commits: Vec<CommitSummary>,
    #[serde(default)]
    pub changes: ChangeList,
    #[serde(default)]
    pub refs: Vec<NamespaceEntry>,
    #[serde(default)]
    pub remotes: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub commit_limit: usize,
    pub prune_on_fetch: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            commit_limit: 500,
            prune_on_fetch: false,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

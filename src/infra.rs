use crate::domain::{
    ChangeList, ChangedFile, CommitDetails, CommitSummary, Credentials, DiffLine, DiffOrigin,
    FileLines, FileStatus, GeneralInfo, NamespaceEntry, Preferences, RefKind, RepoSnapshot,
};
use crate::protocol::OutboundCommand;
use anyhow::{Context, Result, bail};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

const FIELD_SEP: char = '\0';
const COMMIT_FORMAT: &str = "--format=%H%x00%P%x00%an%x00%at%x00%s%x00%D";
const REF_FORMAT: &str =
    "--format=%(refname)%00%(refname:short)%00%(HEAD)%00%(upstream:track,nobracket)";

// Reads the secret from the environment so it never appears in argv.
const CREDENTIAL_HELPER: &str = "credential.helper=!f() { test \"$1\" = get || exit 0; \
echo \"username=$GITPANE_USERNAME\"; echo \"password=$GITPANE_PASSWORD\"; }; f";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn is_auth_failure(&self) -> bool {
        let stderr = self.stderr.to_ascii_lowercase();
        stderr.contains("authentication failed")
            || stderr.contains("could not read username")
            || stderr.contains("could not read password")
            || stderr.contains("terminal prompts disabled")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitInvocation {
    pub args: Vec<OsString>,
    pub network: bool,
}

pub trait RepoClient: Send + Sync {
    fn snapshot(&self, commit_limit: usize) -> Result<RepoSnapshot>;
    fn changes(&self) -> Result<ChangeList>;
    fn file_diff(&self, path: &str, staged: bool) -> Result<FileLines>;
    fn commit_details(&self, oid: &str) -> Result<CommitDetails>;
    fn run(
        &self,
        invocation: &GitInvocation,
        credentials: Option<&Credentials>,
    ) -> Result<CommandResult>;
}

#[derive(Debug, Clone)]
pub struct ShellGitClient {
    binary: String,
    repo_dir: PathBuf,
}

impl ShellGitClient {
    pub fn new(repo_dir: PathBuf) -> Self {
        Self {
            binary: "git".to_string(),
            repo_dir,
        }
    }

    fn run_raw<I, S>(&self, args: I, credentials: Option<&Credentials>) -> Result<CommandResult>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<OsString> = args
            .into_iter()
            .map(|arg| arg.as_ref().to_os_string())
            .collect();
        let mut cmd = Command::new(&self.binary);
        cmd.arg("-C").arg(&self.repo_dir);
        cmd.env("GIT_TERMINAL_PROMPT", "0");
        if let Some(creds) = credentials {
            cmd.arg("-c").arg(CREDENTIAL_HELPER);
            cmd.env("GITPANE_USERNAME", &creds.username);
            cmd.env("GITPANE_PASSWORD", &creds.password);
        }
        cmd.args(&args);

        let started = Instant::now();
        let output = cmd
            .output()
            .with_context(|| format!("failed to execute {} {:?}", self.binary, args))?;
        let duration_ms = started.elapsed().as_millis() as u64;

        let exit_code = output.status.code().unwrap_or(-1);
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        tracing::debug!(?args, exit_code, duration_ms, "git finished");

        Ok(CommandResult {
            exit_code,
            stdout,
            stderr,
            duration_ms,
        })
    }

    fn query<I, S>(&self, args: I, what: &str) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let result = self.run_raw(args, None)?;
        if !result.success() {
            bail!("git {what} failed: {}", result.stderr.trim());
        }
        Ok(result.stdout)
    }

    fn refs(&self) -> Result<Vec<NamespaceEntry>> {
        let out = self.query(
            ["for-each-ref", REF_FORMAT, "refs/heads", "refs/remotes", "refs/tags"],
            "for-each-ref",
        )?;
        Ok(parse_ref_output(&out))
    }

    fn commits(&self, limit: usize) -> Result<Vec<CommitSummary>> {
        let max_count = format!("--max-count={limit}");
        let result = self.run_raw(["log", max_count.as_str(), COMMIT_FORMAT], None)?;
        if !result.success() {
            // A freshly initialized repository has no HEAD to walk.
            if result.stderr.contains("does not have any commits") {
                return Ok(Vec::new());
            }
            bail!("git log failed: {}", result.stderr.trim());
        }
        parse_log_output(&result.stdout)
    }

    fn remotes(&self) -> Result<Vec<String>> {
        let out = self.query(["remote"], "remote")?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn general(&self) -> Result<GeneralInfo> {
        let git_dir = self.query(["rev-parse", "--absolute-git-dir"], "rev-parse")?;
        let git_dir = PathBuf::from(git_dir.trim());
        let upstream = self.run_raw(
            ["rev-parse", "--abbrev-ref", "--symbolic-full-name", "@{u}"],
            None,
        )?;
        Ok(general_info_from_git_dir(&git_dir, upstream.success()))
    }
}

impl RepoClient for ShellGitClient {
    fn snapshot(&self, commit_limit: usize) -> Result<RepoSnapshot> {
        Ok(RepoSnapshot {
            general: self.general()?,
            commits: self.commits(commit_limit)?,
            changes: self.changes()?,
            refs: self.refs()?,
            remotes: self.remotes()?,
        })
    }

    fn changes(&self) -> Result<ChangeList> {
        let out = self.query(
            ["status", "--porcelain=v1", "-z", "--untracked-files=all"],
            "status",
        )?;
        parse_status_output(&out)
    }

    fn file_diff(&self, path: &str, staged: bool) -> Result<FileLines> {
        let mut args = vec!["diff", "--no-color", "--no-ext-diff"];
        if staged {
            args.push("--cached");
        }
        args.extend(["--", path]);
        let mut text = self.query(&args, "diff")?;

        if text.trim().is_empty() && !staged {
            // Untracked files only show up against /dev/null; exit code 1 means "differs".
            let result = self.run_raw(
                ["diff", "--no-color", "--no-index", "--", "/dev/null", path],
                None,
            )?;
            if result.exit_code > 1 {
                bail!("git diff failed: {}", result.stderr.trim());
            }
            text = result.stdout;
        }

        Ok(FileLines {
            path: path.to_string(),
            staged,
            file_type: file_type_of(path),
            lines: parse_unified_diff(&text),
        })
    }

    fn commit_details(&self, oid: &str) -> Result<CommitDetails> {
        let header_format = format!("{COMMIT_FORMAT}%x00%B");
        let header = self.query(
            ["show", "-s", header_format.as_str(), oid, "--"],
            "show",
        )?;
        let files = self.query(
            ["show", "--format=", "--name-status", "--no-color", oid, "--"],
            "show",
        )?;
        parse_commit_details(&header, &files)
    }

    fn run(
        &self,
        invocation: &GitInvocation,
        credentials: Option<&Credentials>,
    ) -> Result<CommandResult> {
        let credentials = if invocation.network {
            credentials
        } else {
            None
        };
        self.run_raw(&invocation.args, credentials)
    }
}

pub fn command_to_invocations(
    command: &OutboundCommand,
    preferences: &Preferences,
) -> Result<Vec<GitInvocation>> {
    let invocations = match command {
        OutboundCommand::Stage { paths } => {
            vec![local(with_paths(vec![os("add")], paths))]
        }
        OutboundCommand::Unstage { paths } => {
            vec![local(with_paths(
                vec![os("restore"), os("--staged")],
                paths,
            ))]
        }
        OutboundCommand::Commit { message } => {
            vec![local(vec![os("commit"), os("-m"), os(message)])]
        }
        OutboundCommand::CommitPush { message } => vec![
            local(vec![os("commit"), os("-m"), os(message)]),
            network(vec![os("push")]),
        ],
        OutboundCommand::Fetch => {
            let mut args = vec![os("fetch"), os("--all")];
            if preferences.prune_on_fetch {
                args.push(os("--prune"));
            }
            vec![network(args)]
        }
        OutboundCommand::Pull => vec![network(vec![os("pull"), os("--ff-only")])],
        OutboundCommand::Push { force } => {
            let mut args = vec![os("push")];
            if *force {
                args.push(os("--force-with-lease"));
            }
            vec![network(args)]
        }
        OutboundCommand::Checkout { shorthand } => {
            vec![local(vec![os("checkout"), os(shorthand)])]
        }
        OutboundCommand::CheckoutRemote { shorthand } => {
            vec![local(vec![os("checkout"), os("--track"), os(shorthand)])]
        }
        OutboundCommand::Branch { name, checkout } => {
            let args = if *checkout {
                vec![os("checkout"), os("-b"), os(name)]
            } else {
                vec![os("branch"), os(name)]
            };
            vec![local(args)]
        }
        OutboundCommand::DeleteLocalBranch { shorthand, force } => {
            let flag = if *force { "-D" } else { "-d" };
            vec![local(vec![os("branch"), os(flag), os(shorthand)])]
        }
        OutboundCommand::DeleteRemoteBranch { shorthand } => {
            let Some((remote, branch)) = shorthand.split_once('/') else {
                bail!("remote branch {shorthand:?} has no remote prefix");
            };
            vec![network(vec![
                os("push"),
                os(remote),
                os("--delete"),
                os(branch),
            ])]
        }
        OutboundCommand::DeleteTag { shorthand } => {
            vec![local(vec![os("tag"), os("-d"), os(shorthand)])]
        }
        other => bail!("{} does not map to a git command", other.tag()),
    };
    Ok(invocations)
}

fn os(value: &str) -> OsString {
    OsString::from(value)
}

fn with_paths(mut args: Vec<OsString>, paths: &[String]) -> Vec<OsString> {
    args.push(os("--"));
    args.extend(paths.iter().map(|path| os(path)));
    args
}

fn local(args: Vec<OsString>) -> GitInvocation {
    GitInvocation {
        args,
        network: false,
    }
}

fn network(args: Vec<OsString>) -> GitInvocation {
    GitInvocation {
        args,
        network: true,
    }
}

pub fn parse_ref_output(output: &str) -> Vec<NamespaceEntry> {
    output.lines().filter_map(parse_ref_line).collect()
}

fn parse_ref_line(line: &str) -> Option<NamespaceEntry> {
    let mut fields = line.split(FIELD_SEP);
    let refname = fields.next()?;
    let shorthand = fields.next()?;
    let head = fields.next().unwrap_or_default();
    let track = fields.next().unwrap_or_default();

    let (kind, full_name) = if let Some(rest) = refname.strip_prefix("refs/heads/") {
        (RefKind::Local, rest)
    } else if let Some(rest) = refname.strip_prefix("refs/remotes/") {
        // origin/HEAD is a symbolic alias, not a branch.
        if rest.ends_with("/HEAD") {
            return None;
        }
        (RefKind::Remote, rest)
    } else if let Some(rest) = refname.strip_prefix("refs/tags/") {
        (RefKind::Tag, rest)
    } else {
        return None;
    };

    let (ahead, behind) = parse_track(track);
    Some(NamespaceEntry {
        full_name: full_name.to_string(),
        shorthand: shorthand.to_string(),
        kind,
        is_head: head.trim() == "*",
        ahead,
        behind,
    })
}

/// Parses `upstream:track,nobracket` output such as `ahead 2, behind 1` or `gone`.
fn parse_track(track: &str) -> (u32, u32) {
    let mut ahead = 0;
    let mut behind = 0;
    for part in track.split(',') {
        let mut words = part.split_whitespace();
        match (words.next(), words.next().and_then(|n| n.parse().ok())) {
            (Some("ahead"), Some(n)) => ahead = n,
            (Some("behind"), Some(n)) => behind = n,
            _ => {}
        }
    }
    (ahead, behind)
}

pub fn parse_status_output(output: &str) -> Result<ChangeList> {
    let mut changes = ChangeList::default();
    let mut records = output.split(FIELD_SEP).filter(|record| !record.is_empty());

    while let Some(record) = records.next() {
        let mut chars = record.chars();
        let (Some(x), Some(y), Some(' ')) = (chars.next(), chars.next(), chars.next()) else {
            bail!("invalid status record: {record:?}");
        };
        let path = chars.as_str().to_string();

        // Renames and copies carry the original path as the next record.
        if matches!(x, 'R' | 'C') || matches!(y, 'R' | 'C') {
            records.next();
        }

        if x == '?' && y == '?' {
            changes.unstaged.push(ChangedFile {
                path,
                status: FileStatus::Untracked,
            });
            continue;
        }
        if is_conflict(x, y) {
            changes.unstaged.push(ChangedFile {
                path,
                status: FileStatus::Conflicted,
            });
            continue;
        }

        if let Some(status) = FileStatus::from_status_char(x) {
            changes.staged.push(ChangedFile {
                path: path.clone(),
                status,
            });
        }
        if let Some(status) = FileStatus::from_status_char(y) {
            changes.unstaged.push(ChangedFile { path, status });
        }
    }

    Ok(changes)
}

fn is_conflict(x: char, y: char) -> bool {
    x == 'U' || y == 'U' || (x == 'A' && y == 'A') || (x == 'D' && y == 'D')
}

pub fn parse_log_output(output: &str) -> Result<Vec<CommitSummary>> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_commit_record)
        .collect()
}

fn parse_commit_record(record: &str) -> Result<CommitSummary> {
    let fields: Vec<&str> = record.splitn(6, FIELD_SEP).collect();
    let [oid, parents, author, time, summary, decorations] = fields.as_slice() else {
        bail!("invalid log record: {record:?}");
    };
    let time = time
        .trim()
        .parse::<i64>()
        .with_context(|| format!("invalid commit time in record: {record:?}"))?;

    Ok(CommitSummary {
        oid: oid.trim().to_string(),
        parents: parents.split_whitespace().map(str::to_string).collect(),
        author: author.to_string(),
        time,
        summary: summary.to_string(),
        refs: decorations
            .split(", ")
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect(),
    })
}

pub fn parse_commit_details(header: &str, name_status: &str) -> Result<CommitDetails> {
    let mut fields = header.splitn(7, FIELD_SEP);
    let record: Vec<&str> = fields.by_ref().take(6).collect();
    let message = fields.next().unwrap_or_default().trim_end().to_string();
    let summary = parse_commit_record(&record.join("\0"))?;

    Ok(CommitDetails {
        summary,
        message,
        files: parse_name_status(name_status),
    })
}

/// Parses `--name-status` lines such as `M\tsrc/lib.rs` or `R100\told\tnew`.
pub fn parse_name_status(output: &str) -> Vec<ChangedFile> {
    output
        .lines()
        .filter_map(|line| {
            let mut parts = line.split('\t');
            let code = parts.next()?;
            let status = FileStatus::from_status_char(code.chars().next()?)?;
            let path = parts.last()?;
            Some(ChangedFile {
                path: path.to_string(),
                status,
            })
        })
        .collect()
}

pub fn parse_unified_diff(text: &str) -> Vec<DiffLine> {
    let mut lines = Vec::new();
    let mut old_line = 0u32;
    let mut new_line = 0u32;
    let mut in_hunk = false;

    for raw in text.lines() {
        if raw.starts_with("diff --git") {
            in_hunk = false;
        }

        if let Some((old_start, new_start)) = parse_hunk_header(raw) {
            old_line = old_start;
            new_line = new_start;
            in_hunk = true;
            lines.push(diff_line(None, None, DiffOrigin::HunkHeader, raw));
            continue;
        }

        if !in_hunk {
            lines.push(diff_line(None, None, DiffOrigin::FileHeader, raw));
            continue;
        }

        if let Some(rest) = raw.strip_prefix('+') {
            lines.push(diff_line(None, Some(new_line), DiffOrigin::Addition, rest));
            new_line += 1;
        } else if let Some(rest) = raw.strip_prefix('-') {
            lines.push(diff_line(Some(old_line), None, DiffOrigin::Deletion, rest));
            old_line += 1;
        } else if raw.starts_with('\\') {
            lines.push(diff_line(None, None, DiffOrigin::Context, raw));
        } else {
            let rest = raw.strip_prefix(' ').unwrap_or(raw);
            lines.push(diff_line(
                Some(old_line),
                Some(new_line),
                DiffOrigin::Context,
                rest,
            ));
            old_line += 1;
            new_line += 1;
        }
    }

    lines
}

fn diff_line(
    old_lineno: Option<u32>,
    new_lineno: Option<u32>,
    origin: DiffOrigin,
    content: &str,
) -> DiffLine {
    DiffLine {
        old_lineno,
        new_lineno,
        origin,
        content: content.to_string(),
    }
}

fn parse_hunk_header(line: &str) -> Option<(u32, u32)> {
    let rest = line.strip_prefix("@@ -")?;
    let (ranges, _) = rest.split_once(" @@")?;
    let (old, new) = ranges.split_once(" +")?;
    let start = |range: &str| range.split(',').next()?.parse::<u32>().ok();
    Some((start(old)?, start(new)?))
}

pub fn file_type_of(path: &str) -> String {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default()
}

pub fn general_info_from_git_dir(git_dir: &Path, head_has_upstream: bool) -> GeneralInfo {
    GeneralInfo {
        head_has_upstream,
        is_merging: git_dir.join("MERGE_HEAD").exists(),
        is_rebasing: git_dir.join("rebase-merge").exists() || git_dir.join("rebase-apply").exists(),
        is_cherrypicking: git_dir.join("CHERRY_PICK_HEAD").exists(),
        is_reverting: git_dir.join("REVERT_HEAD").exists(),
    }
}

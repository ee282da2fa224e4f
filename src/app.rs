use crate::config::AppConfig;
use crate::domain::{
    ChangeList, ChangedFile, CommitDetails, CommitSummary, FileLines, GeneralInfo,
    NamespaceEntry, Preferences, RefKind,
};
use crate::fit::{TruncatedLabel, display_width};
use crate::namespace::{NamespaceTreeNode, PathId};
use crate::protocol::OutboundCommand;
use crate::reconcile::{TreeView, VisibleRow};

const MAX_LOG_LINES: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaneFocus {
    Refs,
    Changes,
    Commits,
    Detail,
    Log,
}

impl PaneFocus {
    pub fn next(self) -> Self {
        match self {
            Self::Refs => Self::Changes,
            Self::Changes => Self::Commits,
            Self::Commits => Self::Detail,
            Self::Detail => Self::Log,
            Self::Log => Self::Refs,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangesTab {
    Unstaged,
    Staged,
}

impl ChangesTab {
    pub fn title(self) -> &'static str {
        match self {
            Self::Unstaged => "Unstaged",
            Self::Staged => "Staged",
        }
    }

    pub fn other(self) -> Self {
        match self {
            Self::Unstaged => Self::Staged,
            Self::Staged => Self::Unstaged,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefRow {
    pub label: String,
    pub entry: Option<NamespaceEntry>,
}

impl RefRow {
    pub fn render(node: &NamespaceTreeNode, _path: &PathId) -> Self {
        Self {
            label: node.segment.clone(),
            entry: node.entry.clone(),
        }
    }

    pub fn decorated(&self) -> String {
        let Some(entry) = &self.entry else {
            return self.label.clone();
        };
        let mut text = String::new();
        text.push_str(if entry.is_head { "* " } else { "  " });
        text.push_str(&self.label);
        if entry.ahead > 0 {
            text.push_str(&format!(" ↑{}", entry.ahead));
        }
        if entry.behind > 0 {
            text.push_str(&format!(" ↓{}", entry.behind));
        }
        text
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefSection {
    pub kind: RefKind,
    pub view: TreeView<RefRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefLine<'a> {
    Section(RefKind),
    Node {
        kind: RefKind,
        row: VisibleRow<'a, RefRow>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detail {
    Empty,
    File(FileLines),
    Commit(CommitDetails),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    CommitMessage { push: bool },
    BranchName,
    Username,
}

impl InputKind {
    pub fn prompt(self) -> &'static str {
        match self {
            Self::CommitMessage { push: false } => "commit message",
            Self::CommitMessage { push: true } => "commit message (commit and push)",
            Self::BranchName => "new branch name (checked out after creation)",
            Self::Username => "username",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceField {
    CommitLimit,
    PruneOnFetch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalState {
    None,
    Help,
    Input {
        kind: InputKind,
        value: String,
    },
    Password {
        username: String,
        value: String,
    },
    Confirm {
        prompt: String,
        command: OutboundCommand,
    },
    Preferences {
        draft: Preferences,
        field: PreferenceField,
        limit_text: String,
    },
}

pub struct App {
    pub config: AppConfig,
    pub focus: PaneFocus,
    pub sections: Vec<RefSection>,
    pub ref_selected: usize,
    pub commits: Vec<CommitSummary>,
    pub commit_selected: usize,
    pub general: GeneralInfo,
    pub remotes: Vec<String>,
    pub changes: ChangeList,
    pub changes_tab: ChangesTab,
    pub change_selected: usize,
    unstaged_labels: Vec<TruncatedLabel>,
    staged_labels: Vec<TruncatedLabel>,
    pub label_width: i32,
    pub detail: Detail,
    pub detail_scroll: usize,
    pub logs: Vec<String>,
    pub log_tail_offset: usize,
    pub status_line: Option<String>,
    pub modal: ModalState,
    pub busy: bool,
    pub config_dirty: bool,
    pub config_from_fallback: bool,
    credentials_pending: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            focus: PaneFocus::Refs,
            sections: RefKind::ALL
                .iter()
                .map(|kind| RefSection {
                    kind: *kind,
                    view: TreeView::new(),
                })
                .collect(),
            ref_selected: 0,
            commits: Vec::new(),
            commit_selected: 0,
            general: GeneralInfo::default(),
            remotes: Vec::new(),
            changes: ChangeList::default(),
            changes_tab: ChangesTab::Unstaged,
            change_selected: 0,
            unstaged_labels: Vec::new(),
            staged_labels: Vec::new(),
            label_width: 0,
            detail: Detail::Empty,
            detail_scroll: 0,
            logs: Vec::new(),
            log_tail_offset: 0,
            status_line: None,
            modal: ModalState::None,
            busy: false,
            config_dirty: false,
            config_from_fallback: false,
            credentials_pending: false,
            should_quit: false,
        }
    }

    #[cfg(test)]
    pub fn section(&self, kind: RefKind) -> Option<&RefSection> {
        self.sections.iter().find(|section| section.kind == kind)
    }

    pub fn section_mut(&mut self, kind: RefKind) -> Option<&mut RefSection> {
        self.sections.iter_mut().find(|section| section.kind == kind)
    }

    pub fn ref_lines(&self) -> Vec<RefLine<'_>> {
        let mut lines = Vec::new();
        for section in &self.sections {
            lines.push(RefLine::Section(section.kind));
            lines.extend(section.view.visible_rows().into_iter().map(|row| RefLine::Node {
                kind: section.kind,
                row,
            }));
        }
        lines
    }

    pub fn selected_ref_line(&self) -> Option<RefLine<'_>> {
        self.ref_lines().into_iter().nth(self.ref_selected)
    }

    pub fn toggle_selected_group(&mut self) -> bool {
        self.with_selected_group(|view, path| view.toggle(path))
    }

    pub fn expand_selected_group(&mut self) -> bool {
        self.with_selected_group(|view, path| view.expand(path))
    }

    pub fn collapse_selected_group(&mut self) -> bool {
        self.with_selected_group(|view, path| view.collapse(path))
    }

    fn with_selected_group(
        &mut self,
        apply: impl FnOnce(&mut TreeView<RefRow>, &PathId) -> bool,
    ) -> bool {
        let Some(RefLine::Node { kind, row }) = self.selected_ref_line() else {
            return false;
        };
        if !row.is_group {
            return false;
        }
        let path = row.path.clone();
        self.section_mut(kind)
            .map(|section| apply(&mut section.view, &path))
            .unwrap_or(false)
    }

    pub fn selected_ref_key(&self) -> Option<(RefKind, Option<PathId>)> {
        match self.selected_ref_line()? {
            RefLine::Section(kind) => Some((kind, None)),
            RefLine::Node { kind, row } => Some((kind, Some(row.path.clone()))),
        }
    }

    pub fn restore_ref_selection(&mut self, key: &(RefKind, Option<PathId>)) {
        let found = self.ref_lines().iter().position(|line| match (line, key) {
            (RefLine::Section(kind), (want, None)) => kind == want,
            (RefLine::Node { kind, row }, (want, Some(path))) => kind == want && row.path == path,
            _ => false,
        });
        if let Some(index) = found {
            self.ref_selected = index;
        }
    }

    pub fn selected_ref_entry(&self) -> Option<NamespaceEntry> {
        match self.selected_ref_line()? {
            RefLine::Node { row, .. } => row.content.entry.clone(),
            RefLine::Section(_) => None,
        }
    }

    pub fn change_labels(&self, tab: ChangesTab) -> &[TruncatedLabel] {
        match tab {
            ChangesTab::Unstaged => &self.unstaged_labels,
            ChangesTab::Staged => &self.staged_labels,
        }
    }

    pub fn change_files(&self, tab: ChangesTab) -> &[ChangedFile] {
        match tab {
            ChangesTab::Unstaged => &self.changes.unstaged,
            ChangesTab::Staged => &self.changes.staged,
        }
    }

    pub fn selected_change(&self) -> Option<&ChangedFile> {
        self.change_files(self.changes_tab).get(self.change_selected)
    }

    pub fn set_changes(&mut self, changes: ChangeList) {
        let selected_path = self.selected_change().map(|file| file.path.clone());
        self.unstaged_labels = labels_for(&changes.unstaged);
        self.staged_labels = labels_for(&changes.staged);
        self.changes = changes;

        self.change_selected = selected_path
            .and_then(|path| {
                self.change_files(self.changes_tab)
                    .iter()
                    .position(|file| file.path == path)
            })
            .unwrap_or(self.change_selected);
        self.sync_selection_bounds();
        self.refit_labels();
    }

    pub fn set_label_width(&mut self, width: i32) {
        self.label_width = width;
        self.refit_labels();
    }

    pub fn refit_labels(&mut self) {
        let width = self.label_width;
        for label in self
            .unstaged_labels
            .iter_mut()
            .chain(self.staged_labels.iter_mut())
        {
            label.refit(width, display_width);
        }
    }

    pub fn switch_changes_tab(&mut self, tab: ChangesTab) {
        self.changes_tab = tab;
        self.change_selected = 0;
        self.refit_labels();
    }

    pub fn select_next(&mut self) {
        let len = self.focused_len();
        if let Some(index) = self.focused_index_mut() {
            *index = if len == 0 { 0 } else { (*index + 1) % len };
        }
    }

    pub fn select_prev(&mut self) {
        let len = self.focused_len();
        if let Some(index) = self.focused_index_mut() {
            *index = if len == 0 {
                0
            } else if *index == 0 {
                len - 1
            } else {
                *index - 1
            };
        }
    }

    fn focused_len(&self) -> usize {
        match self.focus {
            PaneFocus::Refs => self.ref_lines().len(),
            PaneFocus::Changes => self.change_files(self.changes_tab).len(),
            PaneFocus::Commits => self.commits.len(),
            PaneFocus::Detail | PaneFocus::Log => 0,
        }
    }

    fn focused_index_mut(&mut self) -> Option<&mut usize> {
        match self.focus {
            PaneFocus::Refs => Some(&mut self.ref_selected),
            PaneFocus::Changes => Some(&mut self.change_selected),
            PaneFocus::Commits => Some(&mut self.commit_selected),
            PaneFocus::Detail | PaneFocus::Log => None,
        }
    }

    pub fn sync_selection_bounds(&mut self) {
        let refs = self.ref_lines().len();
        let changes = self.change_files(self.changes_tab).len();
        let commits = self.commits.len();
        self.ref_selected = clamp_index(self.ref_selected, refs);
        self.change_selected = clamp_index(self.change_selected, changes);
        self.commit_selected = clamp_index(self.commit_selected, commits);
    }

    pub fn selected_commit(&self) -> Option<&CommitSummary> {
        self.commits.get(self.commit_selected)
    }

    pub fn set_detail(&mut self, detail: Detail) {
        self.detail = detail;
        self.detail_scroll = 0;
    }

    pub fn detail_title(&self) -> String {
        match &self.detail {
            Detail::Empty => "Diff".to_string(),
            Detail::File(file) if file.staged => format!("Diff (staged): {}", file.path),
            Detail::File(file) => format!("Diff: {}", file.path),
            Detail::Commit(details) => format!("Commit {}", details.summary.short_oid()),
        }
    }

    pub fn scroll_detail_down(&mut self, lines: usize) {
        self.detail_scroll = self.detail_scroll.saturating_add(lines);
    }

    pub fn scroll_detail_up(&mut self, lines: usize) {
        self.detail_scroll = self.detail_scroll.saturating_sub(lines);
    }

    pub fn open_help(&mut self) {
        self.modal = ModalState::Help;
    }

    pub fn open_input(&mut self, kind: InputKind) {
        self.modal = ModalState::Input {
            kind,
            value: String::new(),
        };
    }

    pub fn open_password(&mut self, username: String) {
        self.modal = ModalState::Password {
            username,
            value: String::new(),
        };
    }

    pub fn open_confirm(&mut self, prompt: String, command: OutboundCommand) {
        self.modal = ModalState::Confirm { prompt, command };
    }

    pub fn open_preferences(&mut self, preferences: Preferences) {
        self.modal = ModalState::Preferences {
            draft: preferences,
            field: PreferenceField::CommitLimit,
            limit_text: preferences.commit_limit.to_string(),
        };
    }

    pub fn close_modal(&mut self) {
        self.modal = ModalState::None;
        if std::mem::take(&mut self.credentials_pending) {
            self.open_input(InputKind::Username);
        }
    }

    /// Opens the username prompt, or queues it until the open modal closes.
    pub fn request_credentials(&mut self) {
        match self.modal {
            ModalState::None => self.open_input(InputKind::Username),
            ModalState::Input {
                kind: InputKind::Username,
                ..
            }
            | ModalState::Password { .. } => {}
            _ => {
                self.credentials_pending = true;
                self.log("credentials prompt queued behind the open dialog".to_string());
            }
        }
    }

    // A fallback config is only written after the user saves preferences.
    pub fn save_config_on_exit(&self) -> bool {
        !self.config_from_fallback
    }

    pub fn log(&mut self, line: String) {
        self.logs.push(line);
        if self.log_tail_offset > 0 {
            self.log_tail_offset = self.log_tail_offset.saturating_add(1);
        }
        if self.logs.len() > MAX_LOG_LINES {
            let to_trim = self.logs.len() - MAX_LOG_LINES;
            self.logs.drain(0..to_trim);
        }
    }

    pub fn scroll_log_up(&mut self, lines: usize) -> bool {
        let before = self.log_tail_offset;
        self.log_tail_offset = self
            .log_tail_offset
            .saturating_add(lines)
            .min(self.logs.len().saturating_sub(1));
        self.log_tail_offset != before
    }

    pub fn scroll_log_down(&mut self, lines: usize) -> bool {
        let before = self.log_tail_offset;
        self.log_tail_offset = self.log_tail_offset.saturating_sub(lines);
        self.log_tail_offset != before
    }
}

fn labels_for(files: &[ChangedFile]) -> Vec<TruncatedLabel> {
    files
        .iter()
        .map(|file| TruncatedLabel::new(file.path.clone()))
        .collect()
}

fn clamp_index(index: usize, len: usize) -> usize {
    if len == 0 { 0 } else { index.min(len - 1) }
}

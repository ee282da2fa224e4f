use crate::app::{ChangesTab, InputKind, ModalState, PaneFocus, PreferenceField, RefLine};
use crate::coordinator::Coordinator;
use crate::domain::{Credentials, NamespaceEntry, RefKind};
use crate::protocol::OutboundCommand;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub(crate) fn handle_key_event(coordinator: &mut Coordinator, key: KeyEvent) {
    if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
        coordinator.app.should_quit = true;
        return;
    }

    match coordinator.app.modal.clone() {
        ModalState::None => handle_key_without_modal(coordinator, key),
        ModalState::Help => coordinator.app.close_modal(),
        ModalState::Input { kind, value } => handle_input_key(coordinator, key, kind, value),
        ModalState::Password { username, value } => {
            handle_password_key(coordinator, key, username, value)
        }
        ModalState::Confirm { command, .. } => handle_confirm_key(coordinator, key, command),
        ModalState::Preferences {
            draft,
            field,
            limit_text,
        } => handle_preferences_key(coordinator, key, draft, field, limit_text),
    }
}

fn handle_key_without_modal(coordinator: &mut Coordinator, key: KeyEvent) {
    let app = &mut coordinator.app;
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('?') => app.open_help(),
        KeyCode::Tab => app.focus = app.focus.next(),
        KeyCode::Char('j') | KeyCode::Down => match app.focus {
            PaneFocus::Detail => app.scroll_detail_down(1),
            PaneFocus::Log => {
                app.scroll_log_down(1);
            }
            _ => app.select_next(),
        },
        KeyCode::Char('k') | KeyCode::Up => match app.focus {
            PaneFocus::Detail => app.scroll_detail_up(1),
            PaneFocus::Log => {
                app.scroll_log_up(1);
            }
            _ => app.select_prev(),
        },
        KeyCode::PageDown => match app.focus {
            PaneFocus::Detail => app.scroll_detail_down(20),
            PaneFocus::Log => {
                app.scroll_log_down(20);
            }
            _ => {}
        },
        KeyCode::PageUp => match app.focus {
            PaneFocus::Detail => app.scroll_detail_up(20),
            PaneFocus::Log => {
                app.scroll_log_up(20);
            }
            _ => {}
        },
        KeyCode::Char('l') | KeyCode::Right => match app.focus {
            PaneFocus::Refs => {
                app.expand_selected_group();
            }
            PaneFocus::Changes => {
                let tab = app.changes_tab.other();
                coordinator.switch_changes_tab(tab);
            }
            _ => {}
        },
        KeyCode::Char('h') | KeyCode::Left => match app.focus {
            PaneFocus::Refs => {
                app.collapse_selected_group();
            }
            PaneFocus::Changes => {
                let tab = app.changes_tab.other();
                coordinator.switch_changes_tab(tab);
            }
            _ => {}
        },
        KeyCode::Char('[') => coordinator.switch_changes_tab(ChangesTab::Unstaged),
        KeyCode::Char(']') => coordinator.switch_changes_tab(ChangesTab::Staged),
        KeyCode::Char('r') => coordinator.dispatch(OutboundCommand::Refresh),
        KeyCode::Char('f') => coordinator.dispatch(OutboundCommand::Fetch),
        KeyCode::Char('p') => coordinator.dispatch(OutboundCommand::Pull),
        KeyCode::Char('P') => coordinator.dispatch(OutboundCommand::Push { force: false }),
        KeyCode::Char('F') => app.open_confirm(
            "force push the current branch?".to_string(),
            OutboundCommand::Push { force: true },
        ),
        KeyCode::Char('o') => coordinator.dispatch(OutboundCommand::LoadPreferences),
        KeyCode::Char('b') => app.open_input(InputKind::BranchName),
        KeyCode::Char('c') => open_commit(coordinator, false),
        KeyCode::Char('C') => open_commit(coordinator, true),
        KeyCode::Char('s') => stage_selected(coordinator),
        KeyCode::Char('u') => unstage_selected(coordinator),
        KeyCode::Char('A') => stage_all(coordinator),
        KeyCode::Char('D') => confirm_delete_selected_ref(coordinator),
        KeyCode::Enter => activate_selection(coordinator),
        _ => {}
    }
}

fn activate_selection(coordinator: &mut Coordinator) {
    match coordinator.app.focus {
        PaneFocus::Refs => {
            // A group that is itself a ref (`a` next to `a/b`) checks out; h/l fold it.
            match coordinator.app.selected_ref_entry() {
                Some(entry) => checkout(coordinator, entry),
                None => {
                    coordinator.app.toggle_selected_group();
                }
            }
        }
        PaneFocus::Changes => {
            let staged = coordinator.app.changes_tab == ChangesTab::Staged;
            if let Some(file) = coordinator.app.selected_change() {
                let path = file.path.clone();
                coordinator.dispatch(OutboundCommand::FileDiff { path, staged });
            }
        }
        PaneFocus::Commits => {
            if let Some(commit) = coordinator.app.selected_commit() {
                let oid = commit.oid.clone();
                coordinator.dispatch(OutboundCommand::CommitInfo { oid });
            }
        }
        PaneFocus::Detail | PaneFocus::Log => {}
    }
}

fn checkout(coordinator: &mut Coordinator, entry: NamespaceEntry) {
    if entry.is_head {
        coordinator
            .app
            .log(format!("already on {}", entry.shorthand));
        return;
    }
    let command = match entry.kind {
        RefKind::Local | RefKind::Tag => OutboundCommand::Checkout {
            shorthand: entry.shorthand,
        },
        RefKind::Remote => OutboundCommand::CheckoutRemote {
            shorthand: entry.shorthand,
        },
    };
    coordinator.dispatch(command);
}

fn confirm_delete_selected_ref(coordinator: &mut Coordinator) {
    if coordinator.app.focus != PaneFocus::Refs {
        return;
    }
    let Some(RefLine::Node { row, .. }) = coordinator.app.selected_ref_line() else {
        return;
    };
    let Some(entry) = row.content.entry.clone() else {
        coordinator
            .app
            .log("select a single ref to delete".to_string());
        return;
    };
    if entry.is_head {
        coordinator
            .app
            .log(format!("cannot delete the checked out branch {}", entry.shorthand));
        return;
    }

    let (prompt, command) = match entry.kind {
        RefKind::Local => (
            format!("delete local branch {}?", entry.shorthand),
            OutboundCommand::DeleteLocalBranch {
                shorthand: entry.shorthand,
                force: false,
            },
        ),
        RefKind::Remote => (
            format!("delete remote branch {}?", entry.shorthand),
            OutboundCommand::DeleteRemoteBranch {
                shorthand: entry.shorthand,
            },
        ),
        RefKind::Tag => (
            format!("delete tag {}?", entry.shorthand),
            OutboundCommand::DeleteTag {
                shorthand: entry.shorthand,
            },
        ),
    };
    coordinator.app.open_confirm(prompt, command);
}

fn open_commit(coordinator: &mut Coordinator, push: bool) {
    if coordinator.app.changes.staged.is_empty() {
        coordinator.app.log("nothing staged to commit".to_string());
        return;
    }
    coordinator.app.open_input(InputKind::CommitMessage { push });
}

fn stage_selected(coordinator: &mut Coordinator) {
    if coordinator.app.focus != PaneFocus::Changes
        || coordinator.app.changes_tab != ChangesTab::Unstaged
    {
        return;
    }
    if let Some(file) = coordinator.app.selected_change() {
        let paths = vec![file.path.clone()];
        coordinator.dispatch(OutboundCommand::Stage { paths });
    }
}

fn unstage_selected(coordinator: &mut Coordinator) {
    if coordinator.app.focus != PaneFocus::Changes
        || coordinator.app.changes_tab != ChangesTab::Staged
    {
        return;
    }
    if let Some(file) = coordinator.app.selected_change() {
        let paths = vec![file.path.clone()];
        coordinator.dispatch(OutboundCommand::Unstage { paths });
    }
}

fn stage_all(coordinator: &mut Coordinator) {
    let paths: Vec<String> = coordinator
        .app
        .changes
        .unstaged
        .iter()
        .map(|file| file.path.clone())
        .collect();
    if paths.is_empty() {
        coordinator.app.log("nothing to stage".to_string());
        return;
    }
    coordinator.dispatch(OutboundCommand::Stage { paths });
}

fn handle_input_key(
    coordinator: &mut Coordinator,
    key: KeyEvent,
    kind: InputKind,
    mut value: String,
) {
    match key.code {
        KeyCode::Esc => coordinator.app.close_modal(),
        KeyCode::Enter => {
            coordinator.app.close_modal();
            match kind {
                InputKind::CommitMessage { push: false } => {
                    coordinator.dispatch(OutboundCommand::Commit { message: value })
                }
                InputKind::CommitMessage { push: true } => {
                    coordinator.dispatch(OutboundCommand::CommitPush { message: value })
                }
                InputKind::BranchName => coordinator.dispatch(OutboundCommand::Branch {
                    name: value.trim().to_string(),
                    checkout: true,
                }),
                InputKind::Username => coordinator.app.open_password(value),
            }
        }
        KeyCode::Backspace => {
            value.pop();
            coordinator.app.modal = ModalState::Input { kind, value };
        }
        KeyCode::Char(c) => {
            value.push(c);
            coordinator.app.modal = ModalState::Input { kind, value };
        }
        _ => {}
    }
}

fn handle_password_key(
    coordinator: &mut Coordinator,
    key: KeyEvent,
    username: String,
    mut value: String,
) {
    match key.code {
        KeyCode::Esc => coordinator.app.close_modal(),
        KeyCode::Enter => {
            coordinator.app.close_modal();
            coordinator.dispatch(OutboundCommand::SaveCredentials(Credentials {
                username,
                password: value,
            }));
            coordinator
                .app
                .log("credentials saved, retry the operation".to_string());
        }
        KeyCode::Backspace => {
            value.pop();
            coordinator.app.modal = ModalState::Password { username, value };
        }
        KeyCode::Char(c) => {
            value.push(c);
            coordinator.app.modal = ModalState::Password { username, value };
        }
        _ => {}
    }
}

fn handle_confirm_key(coordinator: &mut Coordinator, key: KeyEvent, command: OutboundCommand) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => {
            coordinator.app.close_modal();
            coordinator.dispatch(command);
        }
        KeyCode::Char('n') | KeyCode::Esc => coordinator.app.close_modal(),
        _ => {}
    }
}

fn handle_preferences_key(
    coordinator: &mut Coordinator,
    key: KeyEvent,
    mut draft: crate::domain::Preferences,
    mut field: PreferenceField,
    mut limit_text: String,
) {
    match key.code {
        KeyCode::Esc => {
            coordinator.app.close_modal();
            return;
        }
        KeyCode::Enter => {
            match limit_text.parse::<usize>() {
                Ok(limit) if limit > 0 => {
                    draft.commit_limit = limit;
                    coordinator.app.close_modal();
                    coordinator.dispatch(OutboundCommand::SavePreferences(draft));
                }
                _ => coordinator
                    .app
                    .log("commit limit must be a positive number".to_string()),
            }
            return;
        }
        KeyCode::Char('j') | KeyCode::Char('k') | KeyCode::Down | KeyCode::Up => {
            field = match field {
                PreferenceField::CommitLimit => PreferenceField::PruneOnFetch,
                PreferenceField::PruneOnFetch => PreferenceField::CommitLimit,
            };
        }
        KeyCode::Char(' ') if field == PreferenceField::PruneOnFetch => {
            draft.prune_on_fetch = !draft.prune_on_fetch;
        }
        KeyCode::Char(c) if field == PreferenceField::CommitLimit && c.is_ascii_digit() => {
            limit_text.push(c);
        }
        KeyCode::Backspace if field == PreferenceField::CommitLimit => {
            limit_text.pop();
        }
        _ => {}
    }

    coordinator.app.modal = ModalState::Preferences {
        draft,
        field,
        limit_text,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::App;
    use crate::config::AppConfig;
    use crate::domain::{ChangeList, ChangedFile, FileStatus, Preferences, RepoSnapshot};
    use crate::protocol::InboundEvent;
    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    fn setup() -> (Coordinator, UnboundedReceiver<OutboundCommand>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        (
            Coordinator::new(App::new(AppConfig::default()), command_tx),
            command_rx,
        )
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(c: &mut Coordinator, text: &str) {
        for ch in text.chars() {
            handle_key_event(c, key(KeyCode::Char(ch)));
        }
    }

    fn file(path: &str) -> ChangedFile {
        ChangedFile {
            path: path.to_string(),
            status: FileStatus::Modified,
        }
    }

    fn entry(name: &str, kind: RefKind, is_head: bool) -> NamespaceEntry {
        NamespaceEntry {
            full_name: name.to_string(),
            shorthand: name.to_string(),
            kind,
            is_head,
            ahead: 0,
            behind: 0,
        }
    }

    fn drain(rx: &mut UnboundedReceiver<OutboundCommand>) -> Vec<OutboundCommand> {
        let mut out = Vec::new();
        while let Ok(command) = rx.try_recv() {
            out.push(command);
        }
        out
    }

    #[test]
    fn ctrl_c_quits() {
        let (mut c, _rx) = setup();
        handle_key_event(&mut c, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(c.app.should_quit);
    }

    #[test]
    fn stage_selected_unstaged_file() {
        let (mut c, mut rx) = setup();
        c.handle_event(InboundEvent::UpdateChanges(ChangeList {
            unstaged: vec![file("a.rs"), file("b.rs")],
            staged: Vec::new(),
        }));
        c.app.focus = PaneFocus::Changes;

        handle_key_event(&mut c, key(KeyCode::Char('j')));
        handle_key_event(&mut c, key(KeyCode::Char('s')));

        assert_eq!(
            drain(&mut rx),
            vec![OutboundCommand::Stage {
                paths: vec!["b.rs".to_string()],
            }]
        );
        assert!(c.app.busy);
    }

    #[test]
    fn unstage_requires_staged_tab() {
        let (mut c, mut rx) = setup();
        c.handle_event(InboundEvent::UpdateChanges(ChangeList {
            unstaged: vec![file("a.rs")],
            staged: vec![file("b.rs")],
        }));
        c.app.focus = PaneFocus::Changes;

        handle_key_event(&mut c, key(KeyCode::Char('u')));
        assert!(drain(&mut rx).is_empty());

        handle_key_event(&mut c, key(KeyCode::Char(']')));
        handle_key_event(&mut c, key(KeyCode::Char('u')));
        assert_eq!(
            drain(&mut rx),
            vec![OutboundCommand::Unstage {
                paths: vec!["b.rs".to_string()],
            }]
        );
    }

    #[test]
    fn stage_all_sends_every_unstaged_path() {
        let (mut c, mut rx) = setup();
        c.handle_event(InboundEvent::UpdateChanges(ChangeList {
            unstaged: vec![file("a.rs"), file("b.rs")],
            staged: Vec::new(),
        }));

        handle_key_event(&mut c, key(KeyCode::Char('A')));
        assert_eq!(
            drain(&mut rx),
            vec![OutboundCommand::Stage {
                paths: vec!["a.rs".to_string(), "b.rs".to_string()],
            }]
        );
    }

    #[test]
    fn commit_flow_sends_typed_message() {
        let (mut c, mut rx) = setup();
        c.handle_event(InboundEvent::UpdateChanges(ChangeList {
            unstaged: Vec::new(),
            staged: vec![file("a.rs")],
        }));

        handle_key_event(&mut c, key(KeyCode::Char('C')));
        type_text(&mut c, "fixx");
        handle_key_event(&mut c, key(KeyCode::Backspace));
        handle_key_event(&mut c, key(KeyCode::Enter));

        assert_eq!(
            drain(&mut rx),
            vec![OutboundCommand::CommitPush {
                message: "fix".to_string(),
            }]
        );
        assert_eq!(c.app.modal, ModalState::None);
    }

    #[test]
    fn commit_without_staged_changes_is_refused() {
        let (mut c, mut rx) = setup();
        handle_key_event(&mut c, key(KeyCode::Char('c')));
        assert_eq!(c.app.modal, ModalState::None);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn enter_on_group_toggles_and_on_leaf_checks_out() {
        let (mut c, mut rx) = setup();
        c.handle_event(InboundEvent::UpdateAll(RepoSnapshot {
            refs: vec![
                entry("main", RefKind::Local, true),
                entry("feature/a", RefKind::Local, false),
                entry("origin/dev", RefKind::Remote, false),
            ],
            ..RepoSnapshot::default()
        }));

        // Local title, main, feature
        c.app.ref_selected = 2;
        handle_key_event(&mut c, key(KeyCode::Enter));
        assert!(drain(&mut rx).is_empty());

        handle_key_event(&mut c, key(KeyCode::Char('j')));
        handle_key_event(&mut c, key(KeyCode::Enter));
        assert_eq!(
            drain(&mut rx),
            vec![OutboundCommand::Checkout {
                shorthand: "feature/a".to_string(),
            }]
        );

        c.app.ref_selected = 1;
        handle_key_event(&mut c, key(KeyCode::Enter));
        assert!(drain(&mut rx).is_empty());
        assert!(c.app.logs.iter().any(|line| line == "already on main"));
    }

    #[test]
    fn l_and_h_expand_and_collapse_groups() {
        let (mut c, _rx) = setup();
        c.handle_event(InboundEvent::UpdateAll(RepoSnapshot {
            refs: vec![
                entry("feature/a", RefKind::Local, false),
                entry("feature/b", RefKind::Local, false),
            ],
            ..RepoSnapshot::default()
        }));
        c.app.ref_selected = 1;
        let rows = |c: &Coordinator| c.app.ref_lines().len();
        assert_eq!(rows(&c), 4);

        handle_key_event(&mut c, key(KeyCode::Char('l')));
        handle_key_event(&mut c, key(KeyCode::Right));
        assert_eq!(rows(&c), 6);

        handle_key_event(&mut c, key(KeyCode::Char('h')));
        assert_eq!(rows(&c), 4);
    }

    #[test]
    fn h_and_l_switch_tabs_in_changes_pane() {
        let (mut c, _rx) = setup();
        c.app.focus = PaneFocus::Changes;
        handle_key_event(&mut c, key(KeyCode::Char('l')));
        assert_eq!(c.app.changes_tab, ChangesTab::Staged);
        handle_key_event(&mut c, key(KeyCode::Left));
        assert_eq!(c.app.changes_tab, ChangesTab::Unstaged);
    }

    #[test]
    fn delete_requires_confirmation() {
        let (mut c, mut rx) = setup();
        c.handle_event(InboundEvent::UpdateAll(RepoSnapshot {
            refs: vec![entry("v1.0", RefKind::Tag, false)],
            ..RepoSnapshot::default()
        }));
        // Local title, Remote title, Tags title, v1.0
        c.app.ref_selected = 3;

        handle_key_event(&mut c, key(KeyCode::Char('D')));
        assert!(drain(&mut rx).is_empty());
        assert!(matches!(c.app.modal, ModalState::Confirm { .. }));

        handle_key_event(&mut c, key(KeyCode::Char('y')));
        assert_eq!(
            drain(&mut rx),
            vec![OutboundCommand::DeleteTag {
                shorthand: "v1.0".to_string(),
            }]
        );
    }

    #[test]
    fn credentials_prompt_collects_username_then_password() {
        let (mut c, mut rx) = setup();
        c.handle_event(InboundEvent::GetCredentials);

        type_text(&mut c, "octo");
        handle_key_event(&mut c, key(KeyCode::Enter));
        type_text(&mut c, "pw");
        handle_key_event(&mut c, key(KeyCode::Enter));

        assert_eq!(
            drain(&mut rx),
            vec![OutboundCommand::SaveCredentials(Credentials {
                username: "octo".to_string(),
                password: "pw".to_string(),
            })]
        );
    }

    #[test]
    fn preferences_editor_saves_edited_values() {
        let (mut c, mut rx) = setup();
        c.handle_event(InboundEvent::ShowPreferences(Preferences::default()));

        handle_key_event(&mut c, key(KeyCode::Backspace));
        handle_key_event(&mut c, key(KeyCode::Backspace));
        handle_key_event(&mut c, key(KeyCode::Backspace));
        type_text(&mut c, "42");
        handle_key_event(&mut c, key(KeyCode::Down));
        handle_key_event(&mut c, key(KeyCode::Char(' ')));
        handle_key_event(&mut c, key(KeyCode::Enter));

        assert_eq!(
            drain(&mut rx),
            vec![OutboundCommand::SavePreferences(Preferences {
                commit_limit: 42,
                prune_on_fetch: true,
            })]
        );
        assert_eq!(c.app.config.commit_limit, 42);
    }

    #[test]
    fn enter_on_changed_file_requests_diff_for_active_tab() {
        let (mut c, mut rx) = setup();
        c.handle_event(InboundEvent::UpdateChanges(ChangeList {
            unstaged: Vec::new(),
            staged: vec![file("a.rs")],
        }));
        c.app.focus = PaneFocus::Changes;
        handle_key_event(&mut c, key(KeyCode::Char(']')));
        handle_key_event(&mut c, key(KeyCode::Enter));

        assert_eq!(
            drain(&mut rx),
            vec![OutboundCommand::FileDiff {
                path: "a.rs".to_string(),
                staged: true,
            }]
        );
    }
}

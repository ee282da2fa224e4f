use crate::activity::ActivityCounter;
use crate::app::{App, ChangesTab, Detail, RefRow};
use crate::domain::{NamespaceEntry, RefKind, RepoSnapshot};
use crate::namespace;
use crate::protocol::{InboundEvent, OutboundCommand};
use crate::ui;
use ratatui::layout::Rect;
use tokio::sync::mpsc::UnboundedSender;

pub struct Coordinator {
    pub app: App,
    activity: ActivityCounter,
    command_tx: UnboundedSender<OutboundCommand>,
}

impl Coordinator {
    pub fn new(app: App, command_tx: UnboundedSender<OutboundCommand>) -> Self {
        let mut activity = ActivityCounter::new();
        activity.subscribe(|activity| tracing::debug!(?activity, "activity changed"));
        Self {
            app,
            activity,
            command_tx,
        }
    }

    #[cfg(test)]
    pub fn in_flight(&self) -> usize {
        self.activity.in_flight()
    }

    pub fn handle_event(&mut self, event: InboundEvent) {
        tracing::debug!(event = event.tag(), "backend event");
        match event {
            InboundEvent::StartProcess => self.start_activity(),
            InboundEvent::EndProcess => self.end_activity(),
            InboundEvent::UpdateAll(snapshot) => self.apply_snapshot(snapshot),
            InboundEvent::UpdateChanges(changes) => self.app.set_changes(changes),
            InboundEvent::ShowFileLines(lines) => {
                self.app.set_detail(Detail::File(lines));
            }
            InboundEvent::CommitInfo(details) => {
                self.app.set_detail(Detail::Commit(details));
            }
            InboundEvent::GetCredentials => {
                self.app.log("credentials required".to_string());
                self.app.request_credentials();
            }
            InboundEvent::ShowPreferences(preferences) => {
                self.app.open_preferences(preferences);
            }
            InboundEvent::Error(message) => {
                self.end_activity();
                tracing::warn!(%message, "backend error");
                self.app.log(format!("error: {message}"));
                self.app.status_line = Some(message);
            }
        }
    }

    pub fn dispatch(&mut self, command: OutboundCommand) {
        if let Err(err) = command.validate() {
            self.app.log(format!("not sent: {err}"));
            return;
        }

        if let OutboundCommand::SavePreferences(preferences) = &command {
            self.app.config.apply_preferences(*preferences);
            self.app.config_dirty = true;
            self.app.config_from_fallback = false;
        }

        let tag = command.tag();
        self.start_activity();
        if self.command_tx.send(command).is_err() {
            self.end_activity();
            tracing::error!(command = tag, "backend channel closed");
            self.app.log(format!("error: backend unavailable, {tag} not sent"));
            return;
        }
        self.app.log(format!("sent {tag}"));
    }

    pub fn resize(&mut self, area: Rect) {
        self.app.set_label_width(ui::change_label_width(area));
    }

    pub fn switch_changes_tab(&mut self, tab: ChangesTab) {
        self.app.switch_changes_tab(tab);
    }

    fn start_activity(&mut self) {
        if self.activity.start().is_some() {
            self.apply_activity();
        }
    }

    fn end_activity(&mut self) {
        if self.activity.end().is_some() {
            self.apply_activity();
        }
    }

    fn apply_activity(&mut self) {
        self.app.busy = self.activity.is_busy();
        if self.app.busy {
            self.app.status_line = None;
        }
    }

    fn apply_snapshot(&mut self, snapshot: RepoSnapshot) {
        let RepoSnapshot {
            general,
            commits,
            changes,
            refs,
            remotes,
        } = snapshot;

        self.app.set_changes(changes);

        let selected_ref = self.app.selected_ref_key();
        let separator = self.app.config.path_separator.clone();
        for kind in RefKind::ALL {
            let entries: Vec<NamespaceEntry> = refs
                .iter()
                .filter(|entry| entry.kind == kind)
                .cloned()
                .collect();
            let tree = namespace::build(&entries, &separator);
            if let Some(section) = self.app.section_mut(kind) {
                section.view.replace(&tree, RefRow::render);
            }
        }

        if let Some(key) = selected_ref {
            self.app.restore_ref_selection(&key);
        }

        let selected_oid = self.app.selected_commit().map(|c| c.oid.clone());
        self.app.commits = commits;
        if let Some(oid) = selected_oid
            && let Some(index) = self.app.commits.iter().position(|c| c.oid == oid)
        {
            self.app.commit_selected = index;
        }
        self.app.general = general;
        self.app.remotes = remotes;
        self.app.sync_selection_bounds();
    }
}

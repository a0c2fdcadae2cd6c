//! The editing loop: undo history over the working project, persisted through a store.

use crate::{
    config::EditorConfig,
    foundation::{error::MockshotResult, time::TimeSource},
    history::{History, HistoryOptions},
    scene::project::Project,
    storage::{JsonFileStore, ProjectStore},
};

pub struct EditorSession<S, C> {
    history: History<Project, C>,
    store: S,
}

impl<S, C> EditorSession<S, C>
where
    S: ProjectStore,
    C: TimeSource,
{
    /// Resume the stored project, or start a fresh one when nothing usable is stored.
    pub fn open(options: HistoryOptions, store: S, clock: C) -> Self {
        let project = store.load().unwrap_or_else(|| {
            tracing::info!("no stored project, starting a new one");
            Project::new_default(None)
        });
        Self {
            history: History::new(project, options, clock),
            store,
        }
    }

    pub fn project(&self) -> &Project {
        self.history.present()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Apply an edit without an undo point.
    pub fn edit(&mut self, f: impl FnOnce(&Project) -> Project) {
        self.history.update(f);
        self.store.save(self.history.present());
    }

    /// Apply an edit and schedule an undo point.
    pub fn edit_with_history(&mut self, f: impl FnOnce(&Project) -> Project) {
        self.history.update_with_history(f);
        self.store.save(self.history.present());
    }

    pub fn undo(&mut self) {
        self.history.undo();
        self.store.save(self.history.present());
    }

    pub fn redo(&mut self) {
        self.history.redo();
        self.store.save(self.history.present());
    }

    /// Swap in a different project, e.g. after an import. Undo history is dropped.
    pub fn replace(&mut self, project: Project) {
        self.history.reset(project);
        self.store.save(self.history.present());
    }

    /// Fire any due history commit and store write. Returns whether either happened.
    pub fn poll(&mut self) -> MockshotResult<bool> {
        let committed = self.history.poll();
        let written = self.store.poll()?;
        Ok(committed || written)
    }

    /// Commit the pending undo point and write the project now.
    pub fn flush(&mut self) -> MockshotResult<()> {
        self.history.flush();
        self.store.save_now(self.history.present())
    }
}

impl<C> EditorSession<JsonFileStore<C>, C>
where
    C: TimeSource + Clone,
{
    /// A session over `storage.path`, with the configured history depth and debounces.
    pub fn from_config(cfg: &EditorConfig, clock: C) -> Self {
        let store = JsonFileStore::new(
            &cfg.storage.path,
            clock.clone(),
            cfg.storage.save_debounce_ms,
        );
        Self::open(cfg.history, store, clock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{foundation::time::ManualTimeSource, storage::MemoryStore};

    fn renamed(name: &str) -> impl FnOnce(&Project) -> Project + '_ {
        move |p| Project {
            name: name.to_owned(),
            ..p.clone()
        }
    }

    #[test]
    fn empty_store_starts_a_default_project() {
        let session = EditorSession::open(
            HistoryOptions::default(),
            MemoryStore::new(),
            ManualTimeSource::new(0.0),
        );
        assert_eq!(session.project().name, "My Project");
        assert!(!session.can_undo());
    }

    #[test]
    fn stored_project_is_resumed() {
        let stored = Project::new_default(Some("Stored"));
        let json = serde_json::to_string(&stored).unwrap();
        let session = EditorSession::open(
            HistoryOptions::default(),
            MemoryStore::with_json(json),
            ManualTimeSource::new(0.0),
        );
        assert_eq!(session.project().id, stored.id);
    }

    #[test]
    fn every_edit_is_saved_and_bursts_share_one_undo_step() {
        let clock = ManualTimeSource::new(0.0);
        let mut session =
            EditorSession::open(HistoryOptions::default(), MemoryStore::new(), clock.clone());

        session.edit_with_history(renamed("A"));
        clock.advance_ms(300.0);
        session.edit_with_history(renamed("B"));
        assert_eq!(session.store().saves(), 2);

        clock.advance_ms(1000.0);
        assert!(session.poll().unwrap());
        session.undo();
        assert_eq!(session.project().name, "My Project");
        assert!(session.can_redo());
        session.redo();
        assert_eq!(session.project().name, "B");
        assert_eq!(session.store().saves(), 4);
    }

    #[test]
    fn max_history_bounds_undo_depth() {
        let clock = ManualTimeSource::new(0.0);
        let options = HistoryOptions {
            max_history: 2,
            debounce_ms: 10,
        };
        let mut session = EditorSession::open(options, MemoryStore::new(), clock.clone());
        for name in ["1", "2", "3", "4"] {
            session.edit_with_history(renamed(name));
            session.flush().unwrap();
        }
        session.undo();
        session.undo();
        session.undo();
        assert_eq!(session.project().name, "2");
    }

    #[test]
    fn replace_drops_history() {
        let mut session = EditorSession::open(
            HistoryOptions::default(),
            MemoryStore::new(),
            ManualTimeSource::new(0.0),
        );
        session.edit_with_history(renamed("A"));
        session.flush().unwrap();
        assert!(session.can_undo());

        let imported = Project::new_default(Some("Imported"));
        session.replace(imported.clone());
        assert!(!session.can_undo());
        assert_eq!(session.project().id, imported.id);
        assert_eq!(session.store().load().map(|p| p.id), Some(imported.id));
    }

    #[test]
    fn config_session_writes_after_the_save_debounce() {
        let path = std::env::temp_dir().join(format!(
            "mockshot_editor_{}_{}.json",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        let mut cfg = EditorConfig::default();
        cfg.storage.path = path.clone();
        cfg.storage.save_debounce_ms = 500;

        let clock = ManualTimeSource::new(0.0);
        let mut session = EditorSession::from_config(&cfg, clock.clone());
        session.edit(renamed("Saved"));
        assert!(!path.exists());

        clock.advance_ms(499.0);
        assert!(!session.poll().unwrap());
        clock.advance_ms(1.0);
        assert!(session.poll().unwrap());
        assert_eq!(session.store().load().map(|p| p.name), Some("Saved".to_owned()));

        std::fs::remove_file(&path).ok();
    }
}

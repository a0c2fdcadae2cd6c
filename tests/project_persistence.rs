use mockshot::{
    History, HistoryOptions, JsonFileStore, ManualTimeSource, Project, ProjectStore,
    export_project, import_project,
};

fn temp_file(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "mockshot_{name}_{}_{}.json",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

#[test]
fn edits_survive_store_and_share_round_trip() {
    let clock = ManualTimeSource::new(0.0);
    let mut history = History::new(
        Project::new_default(Some("Launch")),
        HistoryOptions::default(),
        clock.clone(),
    );

    // A burst of edits within the debounce window is one undo step.
    for name in ["Launch 1", "Launch 2", "Launch 3"] {
        history.update_with_history(|p| Project {
            name: name.to_owned(),
            ..p.clone()
        });
        clock.advance_ms(200.0);
    }
    clock.advance_ms(1000.0);
    assert!(history.poll());
    assert_eq!(history.past_len(), 1);

    let path = temp_file("persist");
    let mut store = JsonFileStore::new(&path, clock.clone(), 1000);
    store.save_now(history.present()).unwrap();
    let loaded = store.load().unwrap();
    assert_eq!(loaded.name, "Launch 3");

    let shared = export_project(&loaded).unwrap();
    let imported = import_project(&shared).unwrap();
    assert_eq!(imported.id, loaded.id);
    assert_eq!(imported.screens.len(), loaded.screens.len());

    history.undo();
    assert_eq!(history.present().name, "Launch");
    history.redo();
    assert_eq!(history.present().name, "Launch 3");

    store.clear().unwrap();
    assert!(!path.exists());
}

use bqcli::config::Config;
use bqcli::history::{load, record_entry};
use rustyline::history::{FileHistory, History};
use tempfile::TempDir;

fn entries(history: &FileHistory) -> Vec<String> {
    history.iter().cloned().collect()
}

#[test]
fn test_prepare_twice_succeeds() {
    let home = TempDir::new().unwrap();
    let config = Config::with_home(home.path(), "bqcli");

    config.prepare().unwrap();
    config.prepare().unwrap();
    assert!(config.dir_path().is_dir());
    assert!(!config.history_path().exists());
}

#[test]
fn test_history_accumulates_across_sessions() {
    let home = TempDir::new().unwrap();
    let config = Config::with_home(home.path(), "bqcli");
    config.prepare().unwrap();
    let path = config.history_path();

    // first session
    {
        let mut history = FileHistory::new();
        load(&mut history, &path).unwrap();
        record_entry(&mut history, &path, "SELECT 1;").unwrap();
        record_entry(&mut history, &path, "\\d").unwrap();
    }

    // second session sees the first and adds to it
    {
        let mut history = FileHistory::new();
        load(&mut history, &path).unwrap();
        assert_eq!(entries(&history), vec!["SELECT 1;", "\\d"]);
        record_entry(&mut history, &path, "SELECT *\nFROM t;").unwrap();
    }

    let mut history = FileHistory::new();
    load(&mut history, &path).unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(
        entries(&history),
        vec!["SELECT 1;", "\\d", "SELECT *\nFROM t;"]
    );
}

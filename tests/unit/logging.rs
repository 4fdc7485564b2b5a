use super::*;

// The global subscriber can be installed once per process, so both cases share a test.
#[test]
fn init_installs_once_and_creates_the_log_dir() {
    let dir = tempfile::tempdir().unwrap();
    let log_dir = dir.path().join("logs");

    let guard = init(&log_dir, "plugin_channel=debug").expect("first init installs");
    assert_eq!(guard.log_dir(), log_dir.as_path());
    assert!(log_dir.is_dir());

    assert!(init(&log_dir, "plugin_channel=debug").is_none());
}

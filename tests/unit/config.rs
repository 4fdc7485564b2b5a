use super::*;

#[test]
fn empty_object_uses_defaults() {
    let config = BridgeConfig::from_json_str("{}").unwrap();
    assert_eq!(config, BridgeConfig::default());
    assert_eq!(config.request_timeout(), Duration::from_secs(5));
    assert_eq!(config.max_frame_bytes, 4 * 1024 * 1024);
    assert_eq!(config.log_filter, "plugin_channel=info");
}

#[test]
fn partial_file_overrides_only_given_fields() {
    let config = BridgeConfig::from_json_str(r#"{ "request_timeout_ms": 250 }"#).unwrap();
    assert_eq!(config.request_timeout(), Duration::from_millis(250));
    assert_eq!(config.max_frame_bytes, DEFAULT_MAX_FRAME_BYTES);
}

#[test]
fn load_reads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE);
    std::fs::write(
        &path,
        r#"{ "max_frame_bytes": 1024, "log_filter": "plugin_channel=debug" }"#,
    )
    .unwrap();

    let config = BridgeConfig::load(&path).unwrap();
    assert_eq!(config.max_frame_bytes, 1024);
    assert_eq!(config.log_filter, "plugin_channel=debug");
}

#[test]
fn missing_file_is_io_error_unless_defaulted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE);

    assert!(matches!(BridgeConfig::load(&path), Err(ConfigError::Io(_))));
    assert_eq!(
        BridgeConfig::load_or_default(&path).unwrap(),
        BridgeConfig::default()
    );
}

#[test]
fn malformed_file_is_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE);
    std::fs::write(&path, "{ not json").unwrap();

    assert!(matches!(
        BridgeConfig::load_or_default(&path),
        Err(ConfigError::Parse(_))
    ));
}

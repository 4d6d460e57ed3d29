use caretta_config::{CharacterSet, FieldConfig};

#[test]
fn test_load_creates_default_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("caretta.json");
    assert!(!path.exists());

    let config = FieldConfig::load_or_create(&path);
    assert!(path.exists());
    assert_eq!(config, FieldConfig::default());

    // File should contain valid JSON
    let contents = std::fs::read_to_string(&path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert!(parsed.is_object());
}

#[test]
fn test_load_creates_missing_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("caretta.json");

    FieldConfig::load_or_create(&path);
    assert!(path.exists());
}

#[test]
fn test_load_existing_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("caretta.json");
    let json = r#"{
        "initial_value": "01",
        "area": false,
        "character_set": { "include": ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"] },
        "max_length": 8,
        "coalesce_window_ms": 300,
        "ignore": ["separator"]
    }"#;
    std::fs::write(&path, json).unwrap();

    let config = FieldConfig::load_or_create(&path);
    assert_eq!(config.initial_value, "01");
    assert_eq!(config.max_length, Some(8));
    assert_eq!(config.coalesce_window_ms, 300);
    assert_eq!(config.ignore, vec!["separator".to_string()]);
    assert_eq!(
        config.character_set,
        Some(CharacterSet::including("0123456789"))
    );
}

#[test]
fn test_broken_json_returns_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("caretta.json");
    std::fs::write(&path, "{ this is not valid json }}}").unwrap();

    let config = FieldConfig::load_or_create(&path);
    assert_eq!(config, FieldConfig::default());

    // The broken file is left alone
    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains("not valid json"));
}

#[test]
fn test_strict_load_reports_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("caretta.json");
    std::fs::write(&path, "[1, 2").unwrap();

    let err = FieldConfig::load(&path).unwrap_err();
    assert!(format!("{err:#}").contains("Failed to parse config"));

    let missing = FieldConfig::load(&dir.path().join("missing.json")).unwrap_err();
    assert!(format!("{missing:#}").contains("Failed to read config"));
}

#[test]
fn test_load_sanitizes_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("caretta.json");
    std::fs::write(
        &path,
        r#"{"initial_value": "abcdef", "max_length": 3, "coalesce_window_ms": 0}"#,
    )
    .unwrap();

    let config = FieldConfig::load_or_create(&path);
    assert_eq!(config.initial_value, "abc");
    assert_eq!(config.coalesce_window_ms, 1);
}

#[test]
fn test_save_and_reload_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("caretta.json");

    let mut config = FieldConfig::default();
    config.area = true;
    config.character_set = Some(CharacterSet::excluding("<>"));
    config.save(&path).unwrap();

    let loaded = FieldConfig::load_or_create(&path);
    assert_eq!(loaded, config);
}

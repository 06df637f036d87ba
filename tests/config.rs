use serde_json::json;

use chat_queue::config::{QueueConfig, DEFAULT_MAX_PAYLOAD_LEN};
use chat_queue::error::ChatQueueError;
use chat_queue::Limits;

#[test]
fn config_from_file_with_overrides() {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(
        tmp.path(),
        json!({
            "capacity": 5,
            "max_payload_len": 1024,
            "store": {"box_dir": "/var/lib/boxes", "sqlite_path": null}
        })
        .to_string(),
    )
    .unwrap();

    let config = QueueConfig::from_file(tmp.path()).unwrap();
    let limits = config.limits().unwrap();
    assert_eq!(limits.capacity, 5);
    assert_eq!(limits.max_payload_len, 1024);
    assert_eq!(config.box_dir(), Some("/var/lib/boxes"));
    assert_eq!(config.sqlite_path(), None);
}

#[test]
fn missing_fields_fall_back_to_defaults() {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(tmp.path(), "{}").unwrap();

    let config = QueueConfig::from_file(tmp.path()).unwrap();
    let limits = config.limits().unwrap();
    assert_eq!(limits, Limits::default());
    assert_eq!(limits.capacity, 20);
    assert_eq!(limits.max_payload_len, DEFAULT_MAX_PAYLOAD_LEN);
    assert!(config.box_dir().is_none());
}

#[test]
fn zero_capacity_and_bad_json_are_config_errors() {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(tmp.path(), json!({"capacity": 0}).to_string()).unwrap();
    let err = QueueConfig::from_file(tmp.path()).unwrap_err();
    assert!(matches!(err, ChatQueueError::Config(_)));

    std::fs::write(tmp.path(), "not json").unwrap();
    let err = QueueConfig::from_file(tmp.path()).unwrap_err();
    assert!(matches!(err, ChatQueueError::Config(_)));

    let err = QueueConfig::from_file("/definitely/not/here.json").unwrap_err();
    assert!(matches!(err, ChatQueueError::Config(_)));
}

use restbind::{HttpTransport, HttpTransportConfig};

#[test]
fn test_config_from_env() {
    // SAFETY: this is the only test touching these variables.
    unsafe {
        std::env::set_var("RESTBIND_BASE_URL", "http://localhost:9999");
        std::env::set_var("RESTBIND_TIMEOUT_MS", "not-a-number");
    }
    let config = HttpTransportConfig::from_env();
    assert_eq!(config.base_url.as_deref(), Some("http://localhost:9999"));
    assert_eq!(config.timeout_ms, None);

    unsafe {
        std::env::set_var("RESTBIND_TIMEOUT_MS", "250");
    }
    let config = HttpTransportConfig::from_env();
    assert_eq!(config.timeout_ms, Some(250));

    let transport = HttpTransport::from_config(config).unwrap();
    assert_eq!(
        transport.resolve("/people").unwrap().as_str(),
        "http://localhost:9999/people"
    );

    unsafe {
        std::env::remove_var("RESTBIND_BASE_URL");
        std::env::remove_var("RESTBIND_TIMEOUT_MS");
    }
}

#[test]
fn test_config_from_json() {
    let config: HttpTransportConfig = serde_json::from_str(
        r#"{"base_url": "http://api.local", "timeout_ms": 1000, "headers": {"authorization": "Bearer t"}}"#,
    )
    .unwrap();
    assert_eq!(config.timeout_ms, Some(1000));
    assert_eq!(config.headers.get("authorization").map(String::as_str), Some("Bearer t"));
    assert!(HttpTransport::from_config(config).is_ok());
}

use pqpass_cloud::{CloudConfig, CloudError};
use pretty_assertions::assert_eq;

#[test]
fn default_config_values() {
    let config = CloudConfig::default();
    assert_eq!(config.api_base_url, "https://api.pqpass.io/");
    assert_eq!(config.request_timeout_secs, 30);
    assert_eq!(config.max_parallel_decrypts, 8);
    assert!(config.user_agent.starts_with("pqpass/"));
    config.validate().unwrap();
}

#[test]
fn from_json_fills_missing_fields() {
    let config =
        CloudConfig::from_json(r#"{"api_base_url": "http://localhost:8000/", "max_parallel_decrypts": 2}"#)
            .unwrap();
    assert_eq!(config.api_base_url, "http://localhost:8000/");
    assert_eq!(config.max_parallel_decrypts, 2);
    assert_eq!(config.request_timeout_secs, 30);
}

#[test]
fn json_roundtrip() {
    let config = CloudConfig {
        api_base_url: "http://127.0.0.1:9999".into(),
        request_timeout_secs: 5,
        max_parallel_decrypts: 3,
        user_agent: "test-agent".into(),
    };
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(CloudConfig::from_json(&json).unwrap(), config);
}

#[test]
fn rejects_non_http_url() {
    let err = CloudConfig::from_json(r#"{"api_base_url": "ftp://example.com"}"#).unwrap_err();
    assert!(matches!(err, CloudError::Config(_)));
}

#[test]
fn rejects_zero_limits() {
    let config = CloudConfig {
        request_timeout_secs: 0,
        ..CloudConfig::default()
    };
    assert!(matches!(config.validate(), Err(CloudError::Config(_))));

    let config = CloudConfig {
        max_parallel_decrypts: 0,
        ..CloudConfig::default()
    };
    assert!(matches!(config.validate(), Err(CloudError::Config(_))));
}

#[test]
fn rejects_malformed_json() {
    assert!(matches!(
        CloudConfig::from_json("{not json"),
        Err(CloudError::Serialization(_))
    ));
}

#[test]
fn client_construction_validates_config() {
    let config = CloudConfig {
        api_base_url: "not a url".into(),
        ..CloudConfig::default()
    };
    assert!(pqpass_cloud::api_client::CloudApiClient::new(config).is_err());
}

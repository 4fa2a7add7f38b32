use std::io::Write;

use dalkak_core::config::AppConfig;

#[test]
fn test_load_full_config_from_file() {
    let toml_content = r#"
[gateway]
bind = "0.0.0.0:9999"
token = "test-token"

[[gateway.api_keys]]
name = "ci"
key = "dk_ci_key"

[gateway.session]
url = "https://abc.supabase.co"
anon_key = "anon-key"

[flow]
max_nodes = 20
max_edges = 40
reject_cycles = true
http_timeout_secs = 5

[email]
resend_api_key = "re_test"
from = "Ops <ops@example.com>"

[providers]
openai_api_key = "sk-test"
anthropic_api_key = "sk-ant-test"
"#;

    let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
    tmp.write_all(toml_content.as_bytes()).expect("write toml");

    let config = AppConfig::load(tmp.path()).expect("load config");

    assert_eq!(config.gateway.bind, "0.0.0.0:9999");
    assert_eq!(config.gateway.token.as_deref(), Some("test-token"));
    assert_eq!(config.gateway.api_keys.len(), 1);
    assert_eq!(config.gateway.api_keys[0].name, "ci");
    let session = config.gateway.session.as_ref().expect("session present");
    assert_eq!(session.url, "https://abc.supabase.co");
    assert!(!config.gateway.is_open());

    assert_eq!(config.flow.max_nodes, 20);
    assert_eq!(config.flow.max_edges, 40);
    assert!(config.flow.reject_cycles);
    assert_eq!(config.flow.http_timeout_secs, 5);

    assert_eq!(config.email.api_key(), Some("re_test"));
    assert_eq!(config.email.from, "Ops <ops@example.com>");
    assert_eq!(config.providers.openai_api_key.as_deref(), Some("sk-test"));
    assert!(config.providers.gemini_api_key.is_none());
}

#[test]
fn test_env_var_expansion_in_config() {
    std::env::set_var("DALKAK_TEST_RESEND_KEY", "expanded-key-value");

    let toml_content = r#"
[email]
resend_api_key = "${DALKAK_TEST_RESEND_KEY}"

[providers]
openai_api_key = "${DALKAK_TEST_UNSET_KEY}"
"#;

    let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
    tmp.write_all(toml_content.as_bytes()).expect("write toml");

    let config = AppConfig::load(tmp.path()).expect("load config");
    assert_eq!(config.email.api_key(), Some("expanded-key-value"));
    // Unset variables stay verbatim and count as unconfigured.
    assert_eq!(
        config.providers.openai_api_key.as_deref(),
        Some("${DALKAK_TEST_UNSET_KEY}")
    );
    assert!(dalkak_core::config::configured(&config.providers.openai_api_key).is_none());

    std::env::remove_var("DALKAK_TEST_RESEND_KEY");
}

#[test]
fn test_empty_config_uses_defaults() {
    let tmp = tempfile::NamedTempFile::new().expect("create temp file");

    let config = AppConfig::load(tmp.path()).expect("load config");

    assert_eq!(config.gateway.bind, "127.0.0.1:3100");
    assert!(config.gateway.is_open());
    assert_eq!(config.flow.max_nodes, 50);
    assert_eq!(config.flow.max_edges, 200);
    assert!(!config.flow.reject_cycles);
    assert_eq!(config.flow.http_timeout_secs, 30);
    assert!(config.email.api_key().is_none());
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("absent.toml");

    assert!(AppConfig::load(&path).is_err());
    let config = AppConfig::load_or_default(&path).expect("defaults");
    assert_eq!(config.flow.max_nodes, 50);
}

#[test]
fn test_invalid_toml_is_a_config_error() {
    let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
    tmp.write_all(b"[flow\nmax_nodes = ").expect("write toml");

    let err = AppConfig::load_or_default(tmp.path()).unwrap_err();
    assert!(err.to_string().starts_with("Config error"));
}

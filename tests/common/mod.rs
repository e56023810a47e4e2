use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use chatgate::config::{ChatKitConfig, IdentityConfig};
use chatgate::gate::HttpIdentityResolver;

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("chatgate.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// ChatKit settings pointing at a mock upstream, with both workflows set
#[allow(dead_code)]
pub fn chatkit_config(api_base: &str) -> ChatKitConfig {
    let mut config = ChatKitConfig {
        api_base: api_base.to_string(),
        api_key: Some("sk-test".to_string()),
        ..Default::default()
    };
    config
        .workflows
        .insert("WORKFLOW_ID".to_string(), "wf_default".to_string());
    config
        .workflows
        .insert("WORKFLOW_ID_BANANHOT".to_string(), "wf_bananhot".to_string());
    config
}

#[allow(dead_code)]
pub fn identity_resolver(url: &str) -> Arc<HttpIdentityResolver> {
    let config = IdentityConfig {
        url: url.to_string(),
        request_timeout_seconds: Some(5),
    };
    Arc::new(HttpIdentityResolver::new(&config).expect("failed to build resolver"))
}

//! Settings file and overlay tests

use std::io::Write;

use vco_deploy::app::options::DeployOptions;
use vco_deploy::app::run::load_options;
use vco_deploy::errors::DeployError;
use vco_deploy::models::bundle::BundleFormat;

fn settings_file(json: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_cli_overrides_settings_file() {
    let file = settings_file(
        r#"{
            "server": "vro-file.example.com",
            "plugin_file": "o11nplugin-demo-1.0",
            "plugin_type": "VMOAPP",
            "restart": true
        }"#,
    );
    let cli = DeployOptions {
        server: Some("vro-cli.example.com".into()),
        ..Default::default()
    };

    let options = load_options(Some(file.path()), cli).await.unwrap();

    assert_eq!(options.server.as_deref(), Some("vro-cli.example.com"));
    assert_eq!(options.plugin_file.as_deref(), Some("o11nplugin-demo-1.0"));
    assert_eq!(options.plugin_type, Some(BundleFormat::Vmoapp));
    assert_eq!(options.restart, Some(true));
}

#[tokio::test]
async fn test_lowercase_bundle_format_is_rejected() {
    let file = settings_file(r#"{ "plugin_type": "dar" }"#);

    let result = load_options(Some(file.path()), DeployOptions::default()).await;
    assert!(matches!(result, Err(DeployError::ConfigError(_))));
}

#[tokio::test]
async fn test_no_settings_file() {
    let cli = DeployOptions {
        plugin_file: Some("o11nplugin-demo-1.0".into()),
        ..Default::default()
    };

    let options = load_options(None, cli).await.unwrap();
    assert_eq!(options.plugin_file.as_deref(), Some("o11nplugin-demo-1.0"));
    assert!(options.server.is_none());
}

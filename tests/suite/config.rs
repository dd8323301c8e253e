//! Config file to running app.

use cakewalk_engine::{App, CakewalkConfig, ConfigError};

use crate::common::{TEST_KEY, mount_gemini_wish, settle, start_gemini_mock};

#[tokio::test]
async fn config_file_points_app_at_endpoint() {
    let server = start_gemini_mock().await;
    mount_gemini_wish(&server, "Configured cheer").await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        format!(
            r#"
[app]
ascii_only = true
reduced_motion = true

[api_keys]
google = "{TEST_KEY}"

[google]
base_url = "{}"
"#,
            server.uri()
        ),
    )
    .unwrap();

    let config = CakewalkConfig::load_from(&path).unwrap().unwrap();
    let mut app = App::new(Some(&config));
    assert!(app.ui_options().ascii_only);
    assert!(app.ui_options().reduced_motion);
    assert!(app.status_message().is_none());

    app.begin();
    settle(&mut app).await;
    assert_eq!(app.wish_text(), "Configured cheer");
}

#[tokio::test]
async fn prefetch_can_be_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "[app]\nprefetch_wish = false\n\n[api_keys]\ngoogle = \"k\"\n",
    )
    .unwrap();

    let config = CakewalkConfig::load_from(&path).unwrap().unwrap();
    let mut app = App::new(Some(&config));
    app.begin();
    assert!(!app.wish_loading());
}

#[test]
fn broken_config_reports_its_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[google\nmodel = 1").unwrap();

    let err = CakewalkConfig::load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert_eq!(err.path(), &path);
}

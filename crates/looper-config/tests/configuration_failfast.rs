//! Malformed configuration must abort loading instead of silently
//! falling back to defaults.

use std::ffi::OsString;
use std::fs;

use ortho_config::OrthoConfig;
use tempfile::TempDir;
use looper_config::Config;

#[test]
fn malformed_config_file_is_rejected() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let path = temp_dir.path().join("looper.toml");
    fs::write(&path, "loop_count = \"forever\"\n").expect("write malformed config");

    let args = vec![
        OsString::from("looper"),
        OsString::from("--config-path"),
        path.into_os_string(),
    ];

    let error = Config::load_from_iter(args).expect_err("loading must fail");
    assert!(
        !error.to_string().is_empty(),
        "error should describe the failure"
    );
}

#[test]
fn unparsable_log_format_flag_is_rejected() {
    let args = vec![
        OsString::from("looper"),
        OsString::from("--log-format"),
        OsString::from("pretty"),
    ];

    let result = Config::load_from_iter(args);
    assert!(result.is_err(), "unknown log format should fail to load");
}

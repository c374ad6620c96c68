//! Integration tests for configuration files

use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;
use vmm_client::config::{validate_config, Config, ConfigError, ConfigLoader};
use vmm_client::memory::ReadFlags;

#[test]
fn test_full_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
        [provider]
        library_path = "C:\\tools\\vmm.dll"
        device = "fpga"
        verbosity = 1
        extra_args = ["-pagefile0", "pagefile.sys"]

        [scatter]
        no_cache = false
        zero_pad_on_fail = true
        pages_per_read = 16

        [retry]
        max_attempts = 3

        [target]
        process = "lsass.exe"
        module = "lsasrv.dll"
        iterations = 50

        [logging]
        level = "debug"
        "#,
    )
    .unwrap();

    let config = ConfigLoader::new(&path).load().unwrap();
    validate_config(&config).unwrap();

    assert_eq!(config.provider.library_path, "C:\\tools\\vmm.dll");
    assert_eq!(
        config.provider.to_args(),
        vec!["", "-waitinitialize", "-v", "-device", "fpga", "-pagefile0", "pagefile.sys"]
    );
    assert_eq!(
        ReadFlags::from_config(&config.scatter),
        ReadFlags::ZEROPAD_ON_FAIL
    );
    assert_eq!(config.retry.max_attempts, 3);
    assert_eq!(config.retry.max_backoff_ms, 1000);
    assert_eq!(config.target.module, "lsasrv.dll");
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_empty_file_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("empty.toml");
    fs::write(&path, "").unwrap();

    let config = ConfigLoader::new(&path).load().unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_invalid_values_fail_validation() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("bad.toml");
    fs::write(&path, "[scatter]\npages_per_read = 0\n").unwrap();

    let config = ConfigLoader::new(&path).load().unwrap();
    assert!(matches!(
        validate_config(&config),
        Err(ConfigError::Invalid(_))
    ));
}

#[test]
fn test_wrong_type_is_a_parse_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("typed.toml");
    fs::write(&path, "[target]\niterations = \"many\"\n").unwrap();

    let result = ConfigLoader::new(&path).load_or_default();
    assert!(matches!(result, Err(ConfigError::TomlParse(_))));
}

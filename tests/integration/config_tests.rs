use apod_desktop::config::Config;
use figment::providers::Serialized;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_config_load_defaults() {
    // Use figment directly without Env to avoid interference from other tests
    let figment = figment::Figment::from(Serialized::defaults(Config::default()));
    let config: Config = figment.extract().unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let toml_content = r#"
cache_dir = "/srv/apod/images"
api_key = "from-file"
timeout_secs = 10
set_background = false
"#;
    fs::write(&config_path, toml_content).unwrap();

    let config = Config::load_from(Some(&config_path)).unwrap();
    assert_eq!(config.cache_dir, Some(PathBuf::from("/srv/apod/images")));
    assert_eq!(config.api_key, "from-file");
    assert_eq!(config.timeout_secs, 10);
    assert!(!config.set_background);
    // Untouched keys keep their defaults
    assert_eq!(config.db_file, "apod.db");

    let settings = config.cache_settings().unwrap();
    assert_eq!(settings.db_path, PathBuf::from("/srv/apod/images/apod.db"));
}

#[test]
fn test_config_env_overrides_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "api_url = \"https://file.example/apod\"\n").unwrap();

    std::env::set_var("APOD_API_URL", "https://env.example/apod");
    let config = Config::load_from(Some(&config_path));
    std::env::remove_var("APOD_API_URL");

    assert_eq!(config.unwrap().api_url, "https://env.example/apod");
}

#[test]
fn test_config_invalid_type_is_error() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "timeout_secs = \"soon\"\n").unwrap();

    assert!(Config::load_from(Some(&config_path)).is_err());
}

#[test]
fn test_config_missing_file_uses_defaults() {
    let temp_dir = tempdir().unwrap();
    let config = Config::load_from(Some(&temp_dir.path().join("absent.toml"))).unwrap();
    assert_eq!(config.timeout_secs, 30);
}

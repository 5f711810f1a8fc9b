use anyhow::Result;
use std::fs;
use tempfile::TempDir;
use utxo_matcher::config::{self, MatcherConfig};
use utxo_matcher::logging::LogLevel;

// Helper function to create a temporary directory and config file for testing
fn setup_test_config() -> (TempDir, String) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("matcher.toml");
    let config_path_str = config_path.to_string_lossy().to_string();

    let config_content = r#"
        [selection]
        page_size = 500
        match_timeout_ms = 2500
        fast_settlement_confirmations = 3
        rng_seed = 11

        [network]
        network = "testnet"

        [logging]
        level = "debug"
        json_format = true
    "#;

    fs::write(&config_path, config_content).expect("Failed to write test config");
    assert!(config_path.exists(), "Failed to create config file");

    (temp_dir, config_path_str)
}

#[test]
fn test_load_config() -> Result<()> {
    let (_temp_dir, path) = setup_test_config();

    let config = MatcherConfig::load(&path)?;
    assert_eq!(config.selection.page_size, 500);
    assert_eq!(config.selection.match_timeout_ms, 2500);
    assert_eq!(config.selection.fast_settlement_confirmations, 3);
    assert_eq!(config.selection.rng_seed, Some(11));
    assert_eq!(config.network.network()?, bitcoin::Network::Testnet);
    assert_eq!(config.logging.level, LogLevel::Debug);
    assert!(config.logging.json_format);
    assert!(config.logging.include_timestamps);
    config.validate()?;

    Ok(())
}

#[test]
fn test_save_and_reload() -> Result<()> {
    let (_temp_dir, path) = setup_test_config();

    let mut config = MatcherConfig::load(&path)?;
    config.selection.page_size = 42;
    config.selection.rng_seed = None;
    config.save(&path)?;

    let reloaded = MatcherConfig::load(&path)?;
    assert_eq!(reloaded, config);
    assert_eq!(reloaded.selection.rng_seed, None);

    Ok(())
}

#[test]
fn test_ensure_config_exists_creates_default() -> Result<()> {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nested").join("matcher.toml");

    config::ensure_config_exists(&config_path)?;
    assert!(config_path.exists(), "Config file was not created");

    let loaded = MatcherConfig::load(&config_path.to_string_lossy())?;
    assert_eq!(loaded, MatcherConfig::default());

    Ok(())
}

#[test]
fn test_ensure_config_exists_keeps_existing() -> Result<()> {
    let (_temp_dir, path) = setup_test_config();

    config::ensure_config_exists(std::path::Path::new(&path))?;
    assert_eq!(MatcherConfig::load(&path)?.selection.page_size, 500);

    Ok(())
}

#[test]
fn test_invalid_files() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");

    let missing = temp_dir.path().join("missing.toml");
    assert!(MatcherConfig::load(&missing.to_string_lossy()).is_err());

    let broken = temp_dir.path().join("broken.toml");
    fs::write(&broken, "[selection\npage_size = ").expect("Failed to write test config");
    assert!(MatcherConfig::load(&broken.to_string_lossy()).is_err());

    let bad_network = temp_dir.path().join("bad_network.toml");
    fs::write(&bad_network, "[network]\nnetwork = \"moonnet\"\n").expect("Failed to write test config");
    let config = MatcherConfig::load(&bad_network.to_string_lossy()).expect("parses");
    assert!(config.validate().is_err());
}

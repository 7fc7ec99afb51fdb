//! Configuration loading tests

use serial_test::serial;
use std::io::Write;
use tempfile::NamedTempFile;

use gardenwatch::config::Config;

const VARS: &[&str] = &[
    "GARDENWATCH_STOCK_URL",
    "GARDENWATCH_WEATHER_URL",
    "GARDENWATCH_FAST_POLL_SECS",
    "GARDENWATCH_INVITE_URL",
    "GARDENWATCH_METRICS_ADDR",
    "DISCORD_BOT_TOKEN",
];

fn clear_env() {
    for var in VARS {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_from_env() {
    clear_env();
    std::env::set_var("GARDENWATCH_STOCK_URL", "http://localhost:8080/stock");
    std::env::set_var("GARDENWATCH_WEATHER_URL", "http://localhost:8080/weather");
    std::env::set_var("GARDENWATCH_FAST_POLL_SECS", "15");
    std::env::set_var("GARDENWATCH_INVITE_URL", "https://discord.com/oauth2/authorize?client_id=1");
    std::env::set_var("GARDENWATCH_METRICS_ADDR", "127.0.0.1:9464");
    std::env::set_var("DISCORD_BOT_TOKEN", "token-from-env");

    let config = Config::from_env().unwrap();
    assert_eq!(config.api.stock_url, "http://localhost:8080/stock");
    assert_eq!(config.schedule.fast_poll_secs, 15);
    assert_eq!(config.schedule.full_sweep_secs, 300);
    assert_eq!(config.discord.token, "token-from-env");
    assert!(config.relay.invite_url.is_some());
    assert_eq!(config.metrics.listen_addr, Some("127.0.0.1:9464".parse().unwrap()));
    assert!(config.validate().is_ok());

    clear_env();
}

#[test]
#[serial]
fn test_invalid_env_values_ignored() {
    clear_env();
    std::env::set_var("GARDENWATCH_FAST_POLL_SECS", "soon");

    let config = Config::from_env().unwrap();
    assert_eq!(config.schedule.fast_poll_secs, 20);
    assert!(config.validate().is_err());

    clear_env();
}

#[test]
#[serial]
fn test_from_file_takes_token_from_env() {
    clear_env();
    std::env::set_var("DISCORD_BOT_TOKEN", "env-token");

    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[api]
stock_url = "http://localhost/stock"
weather_url = "http://localhost/weather"

[storage]
channels_path = "/var/lib/gardenwatch/channels.json"

[relay]
dry_run = true
"#
    )
    .unwrap();

    let config = Config::load(Some(file.path())).unwrap();
    assert_eq!(config.discord.token, "env-token");
    assert!(config.relay.dry_run);
    assert_eq!(
        config.storage.channels_path,
        std::path::PathBuf::from("/var/lib/gardenwatch/channels.json")
    );

    clear_env();
}

#[test]
fn test_bad_toml_is_an_error() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[api\nstock_url = ").unwrap();
    assert!(Config::from_file(file.path()).is_err());
}

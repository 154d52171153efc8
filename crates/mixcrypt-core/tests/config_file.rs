//! Loading a policy file from disk and wiring its `[log]` section.

use mixcrypt_core::config::MixConfig;
use mixcrypt_core::logging;

#[test]
fn load_config_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mixcrypt.toml");
    std::fs::write(
        &path,
        r#"
[kdf]
time_cost = 2

[log]
level = "trace"
"#,
    )
    .unwrap();

    let config = MixConfig::load(&path).unwrap();
    assert_eq!(config.kdf.time_cost, 2);
    assert_eq!(config.kdf.mem_cost_kib, 65536);
    assert_eq!(config.log.level, "trace");

    logging::init_from_config(&config.log);
    tracing::info!("subscriber installed from config");
}

#[test]
fn load_config_rejects_bad_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "[kdf\ntime_cost = ").unwrap();

    let err = MixConfig::load(&path).unwrap_err();
    assert!(format!("{err:#}").contains("parsing config"));
}

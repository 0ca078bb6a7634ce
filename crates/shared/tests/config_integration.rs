//! 配置加载集成测试
//!
//! 环境变量是进程级状态，所有断言放在同一个测试中顺序执行

use std::fs;

use voucher_shared::config::AppConfig;

#[test]
fn test_load_layers_files_and_env() {
    let dir = std::env::temp_dir().join(format!("voucher-config-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("default.toml"),
        r#"
[server]
port = 8100

[database]
max_connections = 7
"#,
    )
    .unwrap();
    fs::write(
        dir.join("staging.toml"),
        r#"
[observability]
json_logs = true
"#,
    )
    .unwrap();
    fs::write(
        dir.join("config-layering.toml"),
        r#"
[server]
host = "127.0.0.1"
"#,
    )
    .unwrap();

    // SAFETY: 本测试二进制中只有这一个测试修改环境变量
    unsafe {
        std::env::set_var("CONFIG_DIR", &dir);
        std::env::set_var("VOUCHER_ENV", "staging");
        std::env::set_var("VOUCHER_DATABASE__MAX_CONNECTIONS", "3");
    }

    let config = AppConfig::load("config-layering").unwrap();
    assert_eq!(config.service_name, "config-layering");
    assert_eq!(config.environment, "staging");
    assert_eq!(config.server.port, 8100);
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.database.max_connections, 3);
    assert!(config.observability.json_logs);
    assert!(!config.is_production());

    unsafe {
        std::env::set_var("CONFIG_LAYERING_PORT", "9100");
    }
    let config = AppConfig::load("config-layering").unwrap();
    assert_eq!(config.server_addr(), "127.0.0.1:9100");

    unsafe {
        std::env::remove_var("CONFIG_DIR");
        std::env::remove_var("VOUCHER_ENV");
        std::env::remove_var("VOUCHER_DATABASE__MAX_CONNECTIONS");
        std::env::remove_var("CONFIG_LAYERING_PORT");
    }
    let _ = fs::remove_dir_all(&dir);
}

//! 基础设施错误类型
//!
//! 覆盖启动阶段的数据库连接、迁移与配置加载失败，业务错误由各服务自行定义。

use thiserror::Error;

/// 基础设施错误
#[derive(Debug, Error)]
pub enum InfraError {
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("数据库迁移失败: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("配置错误: {0}")]
    Config(#[from] config::ConfigError),
}

/// 错误结果类型别名
pub type Result<T> = std::result::Result<T, InfraError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_converts() {
        let err = InfraError::from(config::ConfigError::NotFound("database.url".into()));
        assert!(matches!(err, InfraError::Config(_)));
        assert!(err.to_string().starts_with("配置错误"));
    }

    #[test]
    fn test_database_error_message() {
        let err = InfraError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, InfraError::Database(_)));
        assert!(err.to_string().starts_with("数据库错误"));
    }
}

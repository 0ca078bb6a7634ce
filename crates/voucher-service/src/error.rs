//! 折扣券服务错误类型定义

use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// 字段级校验错误：字段名 -> 错误信息列表
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// 折扣券服务错误类型
#[derive(Debug, thiserror::Error)]
pub enum VoucherError {
    #[error("{message}")]
    Validation { message: String, fields: FieldErrors },

    #[error("Voucher with code '{0}' not found")]
    VoucherNotFound(String),

    #[error("券码冲突: {0}")]
    CodeConflict(String),

    #[error("数据库错误: {0}")]
    Database(sqlx::Error),
}

impl VoucherError {
    /// 不带字段明细的校验错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            fields: FieldErrors::new(),
        }
    }

    /// 单个字段的校验错误
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut fields = FieldErrors::new();
        fields.insert(field.to_string(), vec![message.clone()]);
        Self::Validation { message, fields }
    }

    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::VoucherNotFound(_) => StatusCode::NOT_FOUND,
            Self::CodeConflict(_) | Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::VoucherNotFound(_) => "VOUCHER_NOT_FOUND",
            Self::CodeConflict(_) => "CODE_CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// 指标中使用的结果标签
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "invalid",
            Self::VoucherNotFound(_) => "not_found",
            Self::CodeConflict(_) => "conflict",
            Self::Database(_) => "error",
        }
    }
}

impl IntoResponse for VoucherError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 系统级错误只返回通用提示，详细信息仅记录日志
        let detail = match &self {
            Self::Database(e) => {
                tracing::error!(error = %e, "database operation failed");
                "Internal server error".to_string()
            }
            Self::CodeConflict(code) => {
                tracing::error!(code = %code, "voucher code conflict persisted after retries");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = match &self {
            Self::Validation { fields, .. } if !fields.is_empty() => json!({
                "code": self.error_code(),
                "detail": detail,
                "errors": fields,
            }),
            _ => json!({
                "code": self.error_code(),
                "detail": detail,
            }),
        };

        (status, axum::Json(body)).into_response()
    }
}

/// 唯一约束冲突转换为券码冲突，其余归为数据库错误
impl From<sqlx::Error> for VoucherError {
    fn from(err: sqlx::Error) -> Self {
        let conflict = err
            .as_database_error()
            .filter(|db_err| db_err.is_unique_violation())
            .map(|db_err| db_err.constraint().unwrap_or("unknown").to_string());

        match conflict {
            Some(constraint) => Self::CodeConflict(constraint),
            None => Self::Database(err),
        }
    }
}

/// 从 validator 错误转换，保留字段级明细
impl From<validator::ValidationErrors> for VoucherError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();
        for (field, errs) in errors.field_errors() {
            let messages = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid ({})", field, e.code))
                })
                .collect();
            fields.insert(field.to_string(), messages);
        }

        let message = fields
            .values()
            .flatten()
            .cloned()
            .collect::<Vec<_>>()
            .join("; ");

        Self::Validation { message, fields }
    }
}

/// 服务层 Result 类型别名
pub type Result<T> = std::result::Result<T, VoucherError>;

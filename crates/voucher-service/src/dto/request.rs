//! 请求 DTO

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use validator::Validate;

use crate::error::{FieldErrors, Result, VoucherError};
use crate::models::VoucherPatch;
use crate::service::DEFAULT_LIMIT;

/// 创建折扣券请求
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateVoucherRequest {
    #[validate(range(
        min = 1,
        max = 100,
        message = "discount_percent must be between 1 and 100"
    ))]
    pub discount_percent: i32,
    /// RFC 3339 时间戳，需带时区
    pub expires_at: DateTime<Utc>,
}

/// 部分更新请求
///
/// 外层 `None` 表示字段缺省，`Some(None)` 表示显式传入 null
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateVoucherRequest {
    #[serde(default, deserialize_with = "deserialize_present")]
    pub discount_percent: Option<Option<i32>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub expires_at: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub is_active: Option<Option<bool>>,
}

/// 字段出现即为 Some，值本身可能为 null
fn deserialize_present<'de, T, D>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl UpdateVoucherRequest {
    /// 转换为领域补丁，显式 null 的字段报校验错误
    pub fn into_patch(self) -> Result<VoucherPatch> {
        let mut fields = FieldErrors::new();

        let discount_percent = reject_null("discount_percent", self.discount_percent, &mut fields);
        let expires_at = reject_null("expires_at", self.expires_at, &mut fields);
        let is_active = reject_null("is_active", self.is_active, &mut fields);

        if !fields.is_empty() {
            let message = fields.values().flatten().cloned().collect::<Vec<_>>().join("; ");
            return Err(VoucherError::Validation { message, fields });
        }

        Ok(VoucherPatch {
            discount_percent,
            expires_at,
            is_active,
        })
    }
}

fn reject_null<T>(field: &str, value: Option<Option<T>>, fields: &mut FieldErrors) -> Option<T> {
    match value {
        Some(None) => {
            fields
                .entry(field.to_string())
                .or_default()
                .push(format!("{} may not be null", field));
            None
        }
        Some(Some(v)) => Some(v),
        None => None,
    }
}

/// 列表分页参数
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ListVouchersQuery {
    #[serde(default)]
    #[validate(range(min = 0, message = "skip must be greater than or equal to 0"))]
    pub skip: i64,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub limit: i64,
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

impl Default for ListVouchersQuery {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: default_limit(),
        }
    }
}

//! 响应 DTO

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Voucher;
use crate::service::VoucherPage;

/// 折扣券响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoucherResponse {
    pub id: i64,
    pub code: String,
    pub discount_percent: i32,
    pub expires_at: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Voucher> for VoucherResponse {
    fn from(voucher: Voucher) -> Self {
        Self {
            id: voucher.id,
            code: voucher.code,
            discount_percent: voucher.discount_percent,
            expires_at: voucher.expires_at,
            is_active: voucher.status.is_active(),
            created_at: voucher.created_at,
            updated_at: voucher.updated_at,
        }
    }
}

/// 分页列表响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoucherListResponse {
    pub items: Vec<VoucherResponse>,
    pub total: i64,
    pub skip: i64,
    pub limit: i64,
}

impl From<VoucherPage> for VoucherListResponse {
    fn from(page: VoucherPage) -> Self {
        Self {
            items: page.items.into_iter().map(VoucherResponse::from).collect(),
            total: page.total,
            skip: page.skip,
            limit: page.limit,
        }
    }
}

/// 存活探针响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// 就绪探针响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub checks: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VoucherStatus;
    use chrono::TimeZone;

    #[test]
    fn test_voucher_response_shape() {
        let ts = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let response = VoucherResponse::from(Voucher {
            id: 42,
            code: "ABCD1234".to_string(),
            discount_percent: 15,
            expires_at: ts,
            status: VoucherStatus::Deactivated,
            created_at: ts,
            updated_at: ts,
        });

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["id"], 42);
        assert_eq!(json["code"], "ABCD1234");
        assert_eq!(json["discount_percent"], 15);
        assert_eq!(json["is_active"], false);
        assert_eq!(json["expires_at"], "2030-01-01T00:00:00Z");
        assert_eq!(json.as_object().unwrap().len(), 7);
    }
}

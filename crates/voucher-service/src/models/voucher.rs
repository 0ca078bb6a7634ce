//! 折扣券实体定义

use chrono::{DateTime, Utc};
use validator::Validate;

/// 折扣券生命周期状态
///
/// 对应存储层的 `is_active` 布尔列，停用即软删除
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoucherStatus {
    Active,
    Deactivated,
}

impl VoucherStatus {
    pub fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

impl From<bool> for VoucherStatus {
    fn from(is_active: bool) -> Self {
        if is_active {
            Self::Active
        } else {
            Self::Deactivated
        }
    }
}

/// 折扣券
#[derive(Debug, Clone, PartialEq)]
pub struct Voucher {
    pub id: i64,
    /// 券码（创建后不可变）
    pub code: String,
    /// 折扣百分比，取值 1-100
    pub discount_percent: i32,
    pub expires_at: DateTime<Utc>,
    pub status: VoucherStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Voucher {
    /// 到期时间不晚于 now 即视为过期
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// 对外可见：启用且未过期
    pub fn is_visible(&self, now: DateTime<Utc>) -> bool {
        self.status.is_active() && !self.is_expired(now)
    }

    /// 在已加锁的行上应用部分更新
    ///
    /// 只覆盖补丁中出现的字段，`updated_at` 总是刷新
    pub fn apply_patch(&mut self, patch: &VoucherPatch, now: DateTime<Utc>) {
        if let Some(discount_percent) = patch.discount_percent {
            self.discount_percent = discount_percent;
        }
        if let Some(expires_at) = patch.expires_at {
            self.expires_at = expires_at;
        }
        if let Some(is_active) = patch.is_active {
            self.status = VoucherStatus::from(is_active);
        }
        self.updated_at = now;
    }

    /// 软删除，重复调用结果相同
    pub fn deactivate(&mut self, now: DateTime<Utc>) {
        self.status = VoucherStatus::Deactivated;
        self.updated_at = now;
    }
}

/// 待插入的折扣券
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct NewVoucher {
    pub code: String,
    #[validate(range(
        min = 1,
        max = 100,
        message = "discount_percent must be between 1 and 100"
    ))]
    pub discount_percent: i32,
    pub expires_at: DateTime<Utc>,
    /// 创建时间，同时作为初始的 updated_at
    pub created_at: DateTime<Utc>,
}

/// 部分更新内容
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct VoucherPatch {
    #[validate(range(
        min = 1,
        max = 100,
        message = "discount_percent must be between 1 and 100"
    ))]
    pub discount_percent: Option<i32>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

impl VoucherPatch {
    pub fn is_empty(&self) -> bool {
        self.discount_percent.is_none() && self.expires_at.is_none() && self.is_active.is_none()
    }
}

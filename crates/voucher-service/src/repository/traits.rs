//! 仓储 Trait 定义
//!
//! 服务层依赖抽象而非具体实现，便于 mock 测试

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{NewVoucher, Voucher, VoucherPatch};

/// 折扣券仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VoucherRepositoryTrait: Send + Sync {
    /// 插入新券，券码唯一冲突时返回 `CodeConflict`
    async fn insert(&self, voucher: &NewVoucher) -> Result<Voucher>;

    /// 按券码查询启用且未过期的券
    async fn find_active_by_code(&self, code: &str, now: DateTime<Utc>)
    -> Result<Option<Voucher>>;

    /// 按券码查询，不过滤状态与到期时间
    async fn find_by_code(&self, code: &str) -> Result<Option<Voucher>>;

    /// 分页查询启用且未过期的券，返回 (当前页, 总数)
    async fn list_active(
        &self,
        now: DateTime<Utc>,
        skip: i64,
        limit: i64,
    ) -> Result<(Vec<Voucher>, i64)>;

    /// 加行锁后应用部分更新，券不存在时返回 None
    ///
    /// `updated_at` 取持锁之后的时间
    async fn update_locked(&self, code: &str, patch: &VoucherPatch) -> Result<Option<Voucher>>;

    /// 加行锁后停用，券不存在时返回 None
    async fn deactivate_locked(&self, code: &str) -> Result<Option<Voucher>>;

    /// 存储可用性探测
    async fn ping(&self) -> Result<()>;
}

//! 折扣券服务
//!
//! 查询类操作在调用开始时取一次 `now`，保证同一请求内的过滤条件一致；
//! 变更操作的 `updated_at` 由仓储在持有行锁后取得。

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};
use validator::Validate;
use voucher_shared::observability::metrics::record_voucher_operation;

use crate::error::{Result, VoucherError};
use crate::models::{NewVoucher, Voucher, VoucherPatch, generate_voucher_code};
use crate::repository::VoucherRepositoryTrait;

/// 券码冲突时的最大尝试次数（含首次）
pub const MAX_CODE_ATTEMPTS: usize = 3;

/// 默认分页大小
pub const DEFAULT_LIMIT: i64 = 20;

/// 最大分页大小
pub const MAX_LIMIT: i64 = 100;

/// 分页结果
#[derive(Debug, Clone, PartialEq)]
pub struct VoucherPage {
    pub items: Vec<Voucher>,
    /// 满足过滤条件的总数，不受 skip/limit 影响
    pub total: i64,
    pub skip: i64,
    pub limit: i64,
}

/// 折扣券服务
///
/// 仓储以 trait 对象或具体类型注入，HTTP 层使用 `VoucherService<dyn VoucherRepositoryTrait>`
pub struct VoucherService<R>
where
    R: VoucherRepositoryTrait + ?Sized,
{
    repo: Arc<R>,
}

impl<R> VoucherService<R>
where
    R: VoucherRepositoryTrait + ?Sized,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// 创建折扣券
    ///
    /// 券码由服务端生成，唯一约束冲突时重新生成，最多尝试 `MAX_CODE_ATTEMPTS` 次。
    /// 过去的到期时间同样被接受。
    #[instrument(skip(self))]
    pub async fn create_voucher(
        &self,
        discount_percent: i32,
        expires_at: DateTime<Utc>,
    ) -> Result<Voucher> {
        let result = self.try_create(discount_percent, expires_at).await;
        record("create", &result);
        result
    }

    async fn try_create(&self, discount_percent: i32, expires_at: DateTime<Utc>) -> Result<Voucher> {
        let now = Utc::now();
        let mut new_voucher = NewVoucher {
            code: generate_voucher_code(),
            discount_percent,
            expires_at,
            created_at: now,
        };
        new_voucher.validate()?;

        let mut attempt = 1;
        loop {
            match self.repo.insert(&new_voucher).await {
                Ok(voucher) => {
                    info!(code = %voucher.code, id = voucher.id, "voucher created");
                    return Ok(voucher);
                }
                Err(VoucherError::CodeConflict(code)) if attempt < MAX_CODE_ATTEMPTS => {
                    warn!(code = %code, attempt, "voucher code collision, regenerating");
                    new_voucher.code = generate_voucher_code();
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// 分页列出启用且未过期的券，按创建时间倒序
    #[instrument(skip(self))]
    pub async fn list_vouchers(&self, skip: i64, limit: i64) -> Result<VoucherPage> {
        let result = self.try_list(skip, limit).await;
        record("list", &result);
        result
    }

    async fn try_list(&self, skip: i64, limit: i64) -> Result<VoucherPage> {
        if skip < 0 {
            return Err(VoucherError::invalid_field(
                "skip",
                "skip must be greater than or equal to 0",
            ));
        }
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(VoucherError::invalid_field(
                "limit",
                format!("limit must be between 1 and {}", MAX_LIMIT),
            ));
        }

        let now = Utc::now();
        let (items, total) = self.repo.list_active(now, skip, limit).await?;

        Ok(VoucherPage {
            items,
            total,
            skip,
            limit,
        })
    }

    /// 查询单张可见的券
    ///
    /// 不存在、已停用、已过期统一返回 `VoucherNotFound`
    #[instrument(skip(self))]
    pub async fn get_voucher(&self, code: &str) -> Result<Voucher> {
        let now = Utc::now();
        let result = self
            .repo
            .find_active_by_code(code, now)
            .await
            .and_then(|found| found.ok_or_else(|| VoucherError::VoucherNotFound(code.to_string())));
        record("get", &result);
        result
    }

    /// 直接按券码查询，不过滤状态与到期时间
    pub async fn lookup_voucher(&self, code: &str) -> Result<Option<Voucher>> {
        self.repo.find_by_code(code).await
    }

    /// 部分更新，不区分状态与是否过期
    #[instrument(skip(self))]
    pub async fn update_voucher(&self, code: &str, patch: VoucherPatch) -> Result<Voucher> {
        let result = self.try_update(code, &patch).await;
        record("update", &result);
        result
    }

    async fn try_update(&self, code: &str, patch: &VoucherPatch) -> Result<Voucher> {
        patch.validate()?;

        let voucher = self
            .repo
            .update_locked(code, patch)
            .await?
            .ok_or_else(|| VoucherError::VoucherNotFound(code.to_string()))?;

        info!(code = %voucher.code, "voucher updated");
        Ok(voucher)
    }

    /// 软删除，重复调用返回相同结果
    #[instrument(skip(self))]
    pub async fn deactivate_voucher(&self, code: &str) -> Result<()> {
        let result = self
            .repo
            .deactivate_locked(code)
            .await
            .and_then(|found| {
                found
                    .map(|voucher| info!(code = %voucher.code, "voucher deactivated"))
                    .ok_or_else(|| VoucherError::VoucherNotFound(code.to_string()))
            });
        record("deactivate", &result);
        result
    }

    /// 存储可用性探测
    pub async fn ping(&self) -> Result<()> {
        self.repo.ping().await
    }
}

fn record<T>(operation: &'static str, result: &Result<T>) {
    let outcome = match result {
        Ok(_) => "success",
        Err(e) => e.outcome(),
    };
    record_voucher_operation(operation, outcome);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VoucherStatus;
    use crate::repository::MockVoucherRepositoryTrait;
    use chrono::Duration;
    use mockall::Sequence;

    fn voucher_from(new: &NewVoucher, id: i64) -> Voucher {
        Voucher {
            id,
            code: new.code.clone(),
            discount_percent: new.discount_percent,
            expires_at: new.expires_at,
            status: VoucherStatus::Active,
            created_at: new.created_at,
            updated_at: new.created_at,
        }
    }

    fn sample(code: &str) -> Voucher {
        let now = Utc::now();
        Voucher {
            id: 7,
            code: code.to_string(),
            discount_percent: 20,
            expires_at: now + Duration::days(30),
            status: VoucherStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    fn service(repo: MockVoucherRepositoryTrait) -> VoucherService<MockVoucherRepositoryTrait> {
        VoucherService::new(Arc::new(repo))
    }

    #[tokio::test]
    async fn test_create_voucher() {
        let mut repo = MockVoucherRepositoryTrait::new();
        repo.expect_insert()
            .times(1)
            .returning(|new| Ok(voucher_from(new, 1)));

        let expires_at = Utc::now() + Duration::days(30);
        let voucher = service(repo).create_voucher(20, expires_at).await.unwrap();

        assert_eq!(voucher.code.len(), 8);
        assert_eq!(voucher.discount_percent, 20);
        assert_eq!(voucher.expires_at, expires_at);
        assert_eq!(voucher.status, VoucherStatus::Active);
        assert_eq!(voucher.created_at, voucher.updated_at);
    }

    #[tokio::test]
    async fn test_create_accepts_past_expiry() {
        let mut repo = MockVoucherRepositoryTrait::new();
        repo.expect_insert()
            .returning(|new| Ok(voucher_from(new, 1)));

        let expires_at = Utc::now() - Duration::days(1);
        let voucher = service(repo).create_voucher(50, expires_at).await.unwrap();
        assert!(voucher.is_expired(Utc::now()));
    }

    #[tokio::test]
    async fn test_create_rejects_out_of_range_discount() {
        for discount in [0, -5, 101, 1000] {
            let mut repo = MockVoucherRepositoryTrait::new();
            repo.expect_insert().never();

            let err = service(repo)
                .create_voucher(discount, Utc::now())
                .await
                .unwrap_err();
            assert!(
                matches!(err, VoucherError::Validation { .. }),
                "discount {} should fail validation",
                discount
            );
        }
    }

    #[tokio::test]
    async fn test_create_retries_on_code_conflict() {
        let mut repo = MockVoucherRepositoryTrait::new();
        let mut seq = Sequence::new();
        repo.expect_insert()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|new| Err(VoucherError::CodeConflict(new.code.clone())));
        repo.expect_insert()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|new| Ok(voucher_from(new, 3)));

        let voucher = service(repo).create_voucher(10, Utc::now()).await.unwrap();
        assert_eq!(voucher.id, 3);
    }

    #[tokio::test]
    async fn test_create_gives_up_after_max_attempts() {
        let mut repo = MockVoucherRepositoryTrait::new();
        repo.expect_insert()
            .times(MAX_CODE_ATTEMPTS)
            .returning(|new| Err(VoucherError::CodeConflict(new.code.clone())));

        let err = service(repo).create_voucher(10, Utc::now()).await.unwrap_err();
        assert_eq!(err.error_code(), "CODE_CONFLICT");
    }

    #[tokio::test]
    async fn test_list_vouchers_passes_paging() {
        let mut repo = MockVoucherRepositoryTrait::new();
        repo.expect_list_active()
            .withf(|_, skip, limit| *skip == 2 && *limit == 2)
            .times(1)
            .returning(|_, _, _| Ok((vec![sample("AAAA0001"), sample("AAAA0002")], 5)));

        let page = service(repo).list_vouchers(2, 2).await.unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 5);
        assert_eq!(page.skip, 2);
        assert_eq!(page.limit, 2);
    }

    #[tokio::test]
    async fn test_list_vouchers_rejects_bad_paging() {
        for (skip, limit) in [(-1, 20), (0, 0), (0, 101), (0, -3)] {
            let mut repo = MockVoucherRepositoryTrait::new();
            repo.expect_list_active().never();

            let err = service(repo).list_vouchers(skip, limit).await.unwrap_err();
            assert_eq!(err.error_code(), "VALIDATION_ERROR", "skip={skip} limit={limit}");
        }
    }

    #[tokio::test]
    async fn test_list_vouchers_accepts_limit_bounds() {
        for limit in [1, MAX_LIMIT] {
            let mut repo = MockVoucherRepositoryTrait::new();
            repo.expect_list_active()
                .returning(|_, _, _| Ok((vec![], 0)));

            let page = service(repo).list_vouchers(0, limit).await.unwrap();
            assert!(page.items.is_empty());
            assert_eq!(page.limit, limit);
        }
    }

    #[tokio::test]
    async fn test_get_voucher_not_found() {
        let mut repo = MockVoucherRepositoryTrait::new();
        repo.expect_find_active_by_code().returning(|_, _| Ok(None));

        let err = service(repo).get_voucher("MISSING1").await.unwrap_err();
        assert_eq!(err.to_string(), "Voucher with code 'MISSING1' not found");
    }

    #[tokio::test]
    async fn test_get_voucher_found() {
        let mut repo = MockVoucherRepositoryTrait::new();
        repo.expect_find_active_by_code()
            .withf(|code, _| code == "ABCD1234")
            .returning(|code, _| Ok(Some(sample(code))));

        let voucher = service(repo).get_voucher("ABCD1234").await.unwrap();
        assert_eq!(voucher.code, "ABCD1234");
    }

    #[tokio::test]
    async fn test_update_voucher_applies_patch() {
        let mut repo = MockVoucherRepositoryTrait::new();
        repo.expect_update_locked()
            .times(1)
            .returning(|code, patch| {
                let mut voucher = sample(code);
                voucher.apply_patch(patch, Utc::now());
                Ok(Some(voucher))
            });

        let patch = VoucherPatch {
            discount_percent: Some(55),
            ..Default::default()
        };
        let voucher = service(repo).update_voucher("ABCD1234", patch).await.unwrap();
        assert_eq!(voucher.discount_percent, 55);
        assert_eq!(voucher.status, VoucherStatus::Active);
    }

    #[tokio::test]
    async fn test_update_voucher_rejects_invalid_discount() {
        let mut repo = MockVoucherRepositoryTrait::new();
        repo.expect_update_locked().never();

        let patch = VoucherPatch {
            discount_percent: Some(0),
            ..Default::default()
        };
        let err = service(repo).update_voucher("ABCD1234", patch).await.unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_update_voucher_not_found() {
        let mut repo = MockVoucherRepositoryTrait::new();
        repo.expect_update_locked().returning(|_, _| Ok(None));

        let err = service(repo)
            .update_voucher("MISSING1", VoucherPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, VoucherError::VoucherNotFound(code) if code == "MISSING1"));
    }

    #[tokio::test]
    async fn test_deactivate_voucher() {
        let mut repo = MockVoucherRepositoryTrait::new();
        repo.expect_deactivate_locked()
            .times(2)
            .returning(|code| {
                let mut voucher = sample(code);
                voucher.deactivate(Utc::now());
                Ok(Some(voucher))
            });

        let svc = service(repo);
        svc.deactivate_voucher("ABCD1234").await.unwrap();
        svc.deactivate_voucher("ABCD1234").await.unwrap();
    }

    #[tokio::test]
    async fn test_deactivate_voucher_not_found() {
        let mut repo = MockVoucherRepositoryTrait::new();
        repo.expect_deactivate_locked().returning(|_| Ok(None));

        let err = service(repo).deactivate_voucher("MISSING1").await.unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_database_errors_propagate() {
        let mut repo = MockVoucherRepositoryTrait::new();
        repo.expect_find_active_by_code()
            .returning(|_, _| Err(VoucherError::Database(sqlx::Error::PoolTimedOut)));

        let err = service(repo).get_voucher("ABCD1234").await.unwrap_err();
        assert_eq!(err.error_code(), "DATABASE_ERROR");
    }
}

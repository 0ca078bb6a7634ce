//! 折扣券仓储
//!
//! 变更操作在单个事务中先 `SELECT ... FOR UPDATE` 锁定目标行，
//! 再写回整行，确保同一券码上的并发修改串行执行

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use tracing::{debug, instrument};

use super::traits::VoucherRepositoryTrait;
use crate::error::{Result, VoucherError};
use crate::models::{NewVoucher, Voucher, VoucherPatch, VoucherStatus};

const VOUCHER_COLUMNS: &str =
    "id, code, discount_percent, expires_at, is_active, created_at, updated_at";

/// 数据库行映射
#[derive(Debug, sqlx::FromRow)]
struct VoucherRow {
    id: i64,
    code: String,
    discount_percent: i32,
    expires_at: DateTime<Utc>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<VoucherRow> for Voucher {
    fn from(row: VoucherRow) -> Self {
        Self {
            id: row.id,
            code: row.code,
            discount_percent: row.discount_percent,
            expires_at: row.expires_at,
            status: VoucherStatus::from(row.is_active),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// 折扣券仓储
#[derive(Clone)]
pub struct VoucherRepository {
    pool: PgPool,
}

impl VoucherRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 在调用方事务中按券码加锁读取，不过滤状态
    pub async fn find_any_by_code_for_update(
        tx: &mut PgConnection,
        code: &str,
    ) -> Result<Option<Voucher>> {
        let row = sqlx::query_as::<_, VoucherRow>(&format!(
            "SELECT {VOUCHER_COLUMNS} FROM vouchers WHERE code = $1 FOR UPDATE"
        ))
        .bind(code)
        .fetch_optional(tx)
        .await?;

        Ok(row.map(Voucher::from))
    }

    /// 在调用方事务中整行写回
    async fn write_back(tx: &mut PgConnection, voucher: &Voucher) -> Result<Voucher> {
        let row = sqlx::query_as::<_, VoucherRow>(&format!(
            r#"
            UPDATE vouchers
            SET discount_percent = $2, expires_at = $3, is_active = $4, updated_at = $5
            WHERE id = $1
            RETURNING {VOUCHER_COLUMNS}
            "#
        ))
        .bind(voucher.id)
        .bind(voucher.discount_percent)
        .bind(voucher.expires_at)
        .bind(voucher.status.is_active())
        .bind(voucher.updated_at)
        .fetch_one(tx)
        .await?;

        Ok(row.into())
    }

    /// 锁定、读取、修改、写回、提交
    ///
    /// 修改时间在拿到行锁之后读取，等锁期间不计入。
    /// 任一步出错时事务随 drop 回滚
    async fn mutate_locked<F>(&self, code: &str, mutate: F) -> Result<Option<Voucher>>
    where
        F: FnOnce(&mut Voucher, DateTime<Utc>) + Send,
    {
        let mut tx = self.pool.begin().await?;

        let Some(mut voucher) = Self::find_any_by_code_for_update(&mut tx, code).await? else {
            return Ok(None);
        };

        mutate(&mut voucher, Utc::now());
        let updated = Self::write_back(&mut tx, &voucher).await?;

        tx.commit().await?;
        Ok(Some(updated))
    }
}

#[async_trait]
impl VoucherRepositoryTrait for VoucherRepository {
    #[instrument(skip(self, voucher), fields(code = %voucher.code))]
    async fn insert(&self, voucher: &NewVoucher) -> Result<Voucher> {
        let row = sqlx::query_as::<_, VoucherRow>(&format!(
            r#"
            INSERT INTO vouchers (code, discount_percent, expires_at, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, TRUE, $4, $4)
            RETURNING {VOUCHER_COLUMNS}
            "#
        ))
        .bind(&voucher.code)
        .bind(voucher.discount_percent)
        .bind(voucher.expires_at)
        .bind(voucher.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match VoucherError::from(e) {
            VoucherError::CodeConflict(_) => VoucherError::CodeConflict(voucher.code.clone()),
            other => other,
        })?;

        debug!(id = row.id, "voucher inserted");
        Ok(row.into())
    }

    async fn find_active_by_code(
        &self,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Voucher>> {
        let row = sqlx::query_as::<_, VoucherRow>(&format!(
            r#"
            SELECT {VOUCHER_COLUMNS} FROM vouchers
            WHERE code = $1 AND is_active = TRUE AND expires_at > $2
            "#
        ))
        .bind(code)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Voucher::from))
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Voucher>> {
        let row = sqlx::query_as::<_, VoucherRow>(&format!(
            "SELECT {VOUCHER_COLUMNS} FROM vouchers WHERE code = $1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Voucher::from))
    }

    #[instrument(skip(self))]
    async fn list_active(
        &self,
        now: DateTime<Utc>,
        skip: i64,
        limit: i64,
    ) -> Result<(Vec<Voucher>, i64)> {
        let rows = sqlx::query_as::<_, VoucherRow>(&format!(
            r#"
            SELECT {VOUCHER_COLUMNS} FROM vouchers
            WHERE is_active = TRUE AND expires_at > $1
            ORDER BY created_at DESC, id DESC
            OFFSET $2 LIMIT $3
            "#
        ))
        .bind(now)
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM vouchers WHERE is_active = TRUE AND expires_at > $1",
        )
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok((rows.into_iter().map(Voucher::from).collect(), total))
    }

    #[instrument(skip(self, patch))]
    async fn update_locked(&self, code: &str, patch: &VoucherPatch) -> Result<Option<Voucher>> {
        self.mutate_locked(code, |voucher, now| voucher.apply_patch(patch, now))
            .await
    }

    #[instrument(skip(self))]
    async fn deactivate_locked(&self, code: &str) -> Result<Option<Voucher>> {
        self.mutate_locked(code, |voucher, now| voucher.deactivate(now))
            .await
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

//! 集成测试公共设施
//!
//! 每个测试在独立的 schema 中执行迁移，互不干扰

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use voucher_service::{AppState, VoucherRepository, VoucherService, routes};
use voucher_shared::{database::Database, observability, test_utils};

/// 独立 schema 的测试数据库
///
/// 测试结束时调用 [`TestDb::cleanup`] 删除 schema；断言失败的测试会留下
/// `voucher_test_*` schema，需手动 `DROP SCHEMA ... CASCADE`
pub struct TestDb {
    pub pool: PgPool,
    url: String,
    schema: String,
}

impl TestDb {
    /// 关闭连接池并删除 schema
    pub async fn cleanup(self) {
        self.pool.close().await;

        let admin = PgPool::connect(&self.url)
            .await
            .expect("无法连接数据库");
        sqlx::query(&format!("DROP SCHEMA IF EXISTS {} CASCADE", self.schema))
            .execute(&admin)
            .await
            .expect("删除测试 schema 失败");
        admin.close().await;
    }
}

/// 创建带独立 schema 的连接池并执行迁移
pub async fn isolated_db() -> TestDb {
    observability::tracing::init_for_tests();

    let url = test_utils::test_database_url();
    let schema = format!("voucher_test_{}", test_utils::unique_suffix());

    let admin = PgPool::connect(&url)
        .await
        .expect("无法连接数据库，请设置 TEST_DATABASE_URL");
    sqlx::query(&format!("CREATE SCHEMA {}", schema))
        .execute(&admin)
        .await
        .expect("创建测试 schema 失败");
    admin.close().await;

    let options: PgConnectOptions = url.parse().expect("无效的数据库地址");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect_with(options.options([("search_path", schema.as_str())]))
        .await
        .expect("连接测试 schema 失败");

    Database::from_pool(pool.clone())
        .run_migrations()
        .await
        .expect("执行迁移失败");

    TestDb { pool, url, schema }
}

pub fn repository(pool: &PgPool) -> Arc<VoucherRepository> {
    Arc::new(VoucherRepository::new(pool.clone()))
}

pub fn service(pool: &PgPool) -> VoucherService<VoucherRepository> {
    VoucherService::new(repository(pool))
}

pub fn app(pool: &PgPool) -> Router {
    routes::app(AppState::from_pool(pool.clone()))
}

//! 应用状态定义

use std::sync::Arc;

use sqlx::PgPool;

use crate::repository::{VoucherRepository, VoucherRepositoryTrait};
use crate::service::VoucherService;

/// HTTP 层使用的服务类型，仓储以 trait 对象注入
pub type DynVoucherService = VoucherService<dyn VoucherRepositoryTrait>;

/// Axum 应用共享状态
#[derive(Clone)]
pub struct AppState {
    pub voucher_service: Arc<DynVoucherService>,
}

impl AppState {
    /// 以任意仓储实现构造状态（测试中注入 mock）
    pub fn new(repo: Arc<dyn VoucherRepositoryTrait>) -> Self {
        Self {
            voucher_service: Arc::new(VoucherService::new(repo)),
        }
    }

    /// 以 PostgreSQL 连接池构造状态
    pub fn from_pool(pool: PgPool) -> Self {
        Self::new(Arc::new(VoucherRepository::new(pool)))
    }
}

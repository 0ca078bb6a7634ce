//! 服务层
//!
//! 实现折扣券业务逻辑：校验、券码生成、可见性过滤与分页。

pub mod voucher_service;

pub use voucher_service::{
    DEFAULT_LIMIT, MAX_CODE_ATTEMPTS, MAX_LIMIT, VoucherPage, VoucherService,
};

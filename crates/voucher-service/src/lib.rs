//! 折扣券服务
//!
//! 提供折扣券的创建、分页查询、部分更新与软删除 REST API。
//!
//! ## 模块结构
//!
//! - `models`: 领域实体与券码生成
//! - `repository`: PostgreSQL 数据访问，变更操作使用行锁
//! - `service`: 业务逻辑
//! - `dto` / `extract`: 请求响应对象与校验提取器
//! - `handlers` / `routes` / `state`: HTTP 层
//! - `error`: 错误类型定义

pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod routes;
pub mod service;
pub mod state;

pub use error::{Result, VoucherError};
pub use models::{Voucher, VoucherPatch, VoucherStatus};
pub use repository::{VoucherRepository, VoucherRepositoryTrait};
pub use service::VoucherService;
pub use state::AppState;

//! 请求与响应的数据传输对象

pub mod request;
pub mod response;

pub use request::{CreateVoucherRequest, ListVouchersQuery, UpdateVoucherRequest};
pub use response::{HealthResponse, ReadinessResponse, VoucherListResponse, VoucherResponse};

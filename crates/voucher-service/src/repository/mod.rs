//! 数据访问层

mod traits;
mod voucher_repo;

pub use traits::VoucherRepositoryTrait;
#[cfg(test)]
pub use traits::MockVoucherRepositoryTrait;
pub use voucher_repo::VoucherRepository;

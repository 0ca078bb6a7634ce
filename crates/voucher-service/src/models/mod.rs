//! 折扣券领域模型

mod code;
mod voucher;

pub use code::{CODE_ALPHABET, CODE_LENGTH, generate_voucher_code};
pub use voucher::{NewVoucher, Voucher, VoucherPatch, VoucherStatus};

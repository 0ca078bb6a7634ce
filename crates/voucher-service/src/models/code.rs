//! 券码生成

use rand::Rng;

/// 券码字符集：大写字母与数字
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// 生成的券码长度
pub const CODE_LENGTH: usize = 8;

/// 生成随机券码
///
/// 使用线程本地的 CSPRNG（`rand::rng()`），从 36 个字符中均匀抽取
pub fn generate_voucher_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

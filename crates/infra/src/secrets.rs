//! Random tokens for password recovery and temporary passwords.

use rand::Rng;

const URL_SAFE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// 32 random bytes, hex encoded (64 chars).
pub fn recovery_token() -> String {
    let bytes: [u8; 32] = rand::thread_rng().r#gen();
    hex::encode(bytes)
}

/// 16 url-safe characters.
pub fn temporary_password() -> String {
    let mut rng = rand::thread_rng();
    (0..16)
        .map(|_| URL_SAFE[rng.gen_range(0..URL_SAFE.len())] as char)
        .collect()
}

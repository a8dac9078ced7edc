//! Tracing/logging setup shared by the roster binaries.

/// Initialize process-wide logging with JSON output.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(tracing::LogFormat::Json);
}

/// Tracing configuration (filters, layers).
pub mod tracing;

pub use tracing::LogFormat;

#[cfg(test)]
mod tests {
    #[test]
    fn init_twice_is_a_no_op() {
        super::init();
        super::init();
    }
}

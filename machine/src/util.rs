#[inline]
pub fn is_4bit(value: u8) -> bool {
    value <= 0x0F
}

/// Debug-only sanity check, enabled with the `strict_assert` feature.
macro_rules! strict_assert {
    ($($arg:tt)*) => {
        if cfg!(feature = "strict_assert") {
            debug_assert!($($arg)*);
        }
    };
}

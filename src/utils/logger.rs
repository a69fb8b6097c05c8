//! Logging helpers.
//!
//! `secret!` guards values that must never reach production logs: blinding
//! randomness, master secrets and signature components. Debug builds pass
//! the value through for protocol debugging; release builds redact it.

#[cfg(debug_assertions)]
#[macro_export]
macro_rules! secret {
    ($val:expr) => {{
        $val
    }};
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! secret {
    ($val:expr) => {{
        "_"
    }};
}

//! Logging macros for the driver.
//!
//! `debug!` and `error!` forward to `defmt` when the `defmt` feature is on,
//! otherwise to `log` when the `log` feature is on, and expand to nothing
//! when neither is enabled.

#![allow(unused_macros)]

cfg_if::cfg_if! {
    if #[cfg(feature = "defmt")] {
        macro_rules! debug {
            ($($arg:tt)*) => { ::defmt::debug!($($arg)*) };
        }
        macro_rules! error {
            ($($arg:tt)*) => { ::defmt::error!($($arg)*) };
        }
    } else if #[cfg(feature = "log")] {
        macro_rules! debug {
            ($($arg:tt)*) => { ::log::debug!($($arg)*) };
        }
        macro_rules! error {
            ($($arg:tt)*) => { ::log::error!($($arg)*) };
        }
    } else {
        macro_rules! debug {
            ($($arg:tt)*) => {{ let _ = format_args!($($arg)*); }};
        }
        macro_rules! error {
            ($($arg:tt)*) => {{ let _ = format_args!($($arg)*); }};
        }
    }
}

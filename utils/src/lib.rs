/*!

`e2e-utils` is a collection of functions shared by the hybrid nodes end-to-end tooling.
`aws` contains the functions used to set up an aws environment.

!*/

use constants::DEFAULT_LEVEL_FILTER;
use env_logger::Builder;
pub use error::Error;
use log::LevelFilter;
use std::env;

pub mod aws;
pub mod constants;
mod error;

/// Extract the value of `RUST_LOG` if it exists, otherwise log this application at `log_level`
/// (or `DEFAULT_LEVEL_FILTER`).
pub fn init_logger(bin_crate: &str, log_level: Option<LevelFilter>) {
    match env::var(env_logger::DEFAULT_FILTER_ENV).ok() {
        Some(_) => {
            // RUST_LOG exists; env_logger will use it.
            Builder::from_default_env().init();
        }
        None => {
            // RUST_LOG does not exist; use default log level except AWS SDK.
            let log_level = log_level.unwrap_or(DEFAULT_LEVEL_FILTER);
            Builder::new()
                // Set log level to Error for crates other than our own.
                .filter_level(LevelFilter::Error)
                // Set all of our crates to the desired level.
                .filter(Some(bin_crate), log_level)
                .filter(Some("e2e_cleanup"), log_level)
                .filter(Some("e2e_utils"), log_level)
                .init();
        }
    }
}

/// Implement `Display` using `serde_json` `to_string_pretty` for types that implement Serialize.
/// The calling crate must depend on `serde_json`.
#[macro_export]
macro_rules! impl_display_as_json {
    ($i:ident) => {
        impl std::fmt::Display for $i {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let s = serde_json::to_string_pretty(self)
                    .unwrap_or_else(|e| format!("Serialization failed: {}", e));
                std::fmt::Display::fmt(&s, f)
            }
        }
    };
}

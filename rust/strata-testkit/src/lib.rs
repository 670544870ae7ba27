//! Test utilities for the Strata crates.
//!
//! This crate provides:
//! - Reference encoders producing run-length encoded stream bytes ([`rle`])
//! - A builder assembling the encodings and streams of a synthetic stripe ([`stripe`])
//! - Logger setup for tests ([`init_logging`])
//!
//! It is intended for use as a dev-dependency only.

pub mod rle;
pub mod stripe;

/// Installs an `env_logger` for the running test binary.
///
/// Safe to call from every test; only the first call installs the logger.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

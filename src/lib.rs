//! pos-rs library
//!
//! Back-office API for a retail shop whose members, ledger, products,
//! stock takes and admin profile are kept in Vika datasheets.

use shadow_rs::shadow;
shadow!(build);

pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod envelope;
pub mod error;
pub mod external;
pub mod governor;
pub mod logger;
pub mod models;
pub mod repositories;
pub mod server;
pub mod services;
pub mod state;
pub mod utils;

pub use envelope::{Envelope, ErrorCode};
pub use state::AppState;

pub fn pkg_version() -> &'static str {
    build::PKG_VERSION
}

pub fn clap_long_version() -> &'static str {
    build::CLAP_LONG_VERSION
}

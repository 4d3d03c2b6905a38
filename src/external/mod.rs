pub mod client;
pub mod vika;

pub use client::build_http_client;

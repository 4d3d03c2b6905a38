//! Client for the Vika datasheet records API.
//!
//! [`DatasheetTransport`] is the seam between the data layer and the network;
//! [`VikaClient`] is the production implementation.

mod client;
mod error;
#[cfg(test)]
pub mod fake;
mod formula;
mod transport;
mod types;

pub use client::VikaClient;
pub use error::TransportError;
pub use formula::{Formula, quote};
pub use transport::{DatasheetTransport, MAX_RECORDS_PER_WRITE};
pub use types::{Fields, Record, RecordPage, RecordQuery, RecordUpdate, SortOrder, SortSpec};

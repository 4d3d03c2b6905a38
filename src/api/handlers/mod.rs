//! HTTP request handlers for API endpoints.
//!
//! This module contains all request handlers organized by resource type.
//! Every handler answers with a result envelope.

pub mod health;
pub mod inventory;
pub mod ledger;
pub mod members;
pub mod products;
pub mod profile;
pub mod stats;

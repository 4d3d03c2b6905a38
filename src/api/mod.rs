//! HTTP surface of the back office.
//!
//! Every endpoint lives under `/api` and answers with an [`Envelope`](crate::envelope::Envelope);
//! the OpenAPI document is served next to it at `/openapi.json`.

mod doc;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;

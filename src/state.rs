//! Application state for Axum web framework.
//!
//! Contains shared services and resources that are accessible
//! across all request handlers.

use crate::config::DatasheetsConfig;
use crate::repositories::{Repositories, SheetGateway};
use crate::services::Services;

/// Application state containing all shared services and resources.
///
/// This struct is designed to be used with Axum's State extractor.
/// Cloning is cheap; every clone shares one governor and one cache.
#[derive(Clone)]
pub struct AppState {
    /// All business logic services
    pub services: Services,
    /// Shared outbound path, exposed for health reporting
    pub gateway: SheetGateway,
}

impl AppState {
    /// Creates a new AppState on top of a configured gateway.
    ///
    /// # Arguments
    /// * `gateway` - Transport, governor and cache shared by every sheet
    /// * `sheets` - Datasheet ids and views
    pub fn new(gateway: SheetGateway, sheets: &DatasheetsConfig) -> Self {
        let repos = Repositories::new(&gateway, sheets);
        let services = Services::new(repos);
        Self { services, gateway }
    }
}

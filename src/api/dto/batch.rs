//! Request bodies acting on several records at once.

use serde::Deserialize;
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::models::{NewLedgerEntry, StockUpdate};

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BatchDeleteRequest {
    #[validate(length(min = 1, message = "At least one record id is required"))]
    pub record_ids: Vec<String>,
}

/// Stock levels for several products, sent as a bare JSON array.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct BatchStockRequest(pub Vec<StockUpdate>);

impl Validate for BatchStockRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        self.0.iter().try_for_each(Validate::validate)
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct BatchLedgerRequest(pub Vec<NewLedgerEntry>);

impl Validate for BatchLedgerRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        self.0.iter().try_for_each(Validate::validate)
    }
}

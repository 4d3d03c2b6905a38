//! Query-string parameters.

use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::models::LedgerScope;

/// Filters for a one-page member query.
#[derive(Debug, Default, Deserialize, IntoParams, Validate)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct MemberQueryParams {
    /// View to read; defaults to the configured view
    pub view_id: Option<String>,

    /// Formula passed through as `filterByFormula`
    pub filter_by_formula: Option<String>,

    #[validate(range(min = 1, max = 1000, message = "maxRecords must be between 1 and 1000"))]
    #[param(minimum = 1, maximum = 1000)]
    pub max_records: Option<u32>,
}

#[derive(Debug, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct AnalysisParams {
    /// Window length in days, 7 or 30
    #[serde(default = "default_days")]
    #[param(example = 7)]
    pub days: u32,
}

fn default_days() -> u32 {
    7
}

#[derive(Debug, Default, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct LedgerParams {
    /// `all`, `recharge` or `consume`
    #[serde(default, rename = "type")]
    pub scope: LedgerScope,

    /// Member phone number
    pub phone: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct RecentParams {
    /// Entries to return, 10 by default
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    #[param(minimum = 1, maximum = 100, example = 10)]
    pub limit: Option<u32>,
}

/// Free-text search.
#[derive(Debug, Default, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    pub q: Option<String>,
}

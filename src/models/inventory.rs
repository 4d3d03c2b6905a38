use jiff::Zoned;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::fields::{self, non_blank};
use super::product::Product;
use crate::external::vika::{Fields, Record};

pub mod field {
    pub const PRODUCT_NAME: &str = "product_name";
    pub const PRODUCT_CODE: &str = "product_id";
    pub const EXPECTED: &str = "expected_quantity";
    pub const ACTUAL: &str = "actual_quantity";
    pub const OPERATION: &str = "operation";
    pub const OPERATION_QUANTITY: &str = "operation_quantity";
    pub const REASON: &str = "reason";
    pub const DATE: &str = "date";
    pub const TIME: &str = "time";
    pub const OPERATOR: &str = "operator";
    pub const NOTE: &str = "note";
}

/// Direction of a stock-take correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum StockOperation {
    #[serde(rename = "增加")]
    Increase,
    #[serde(rename = "减少")]
    Decrease,
    #[serde(rename = "无变化")]
    Unchanged,
}

impl StockOperation {
    /// `difference` is actual minus expected.
    pub fn from_difference(difference: i64) -> Self {
        match difference {
            d if d > 0 => StockOperation::Increase,
            d if d < 0 => StockOperation::Decrease,
            _ => StockOperation::Unchanged,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StockOperation::Increase => "增加",
            StockOperation::Decrease => "减少",
            StockOperation::Unchanged => "无变化",
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        [
            StockOperation::Increase,
            StockOperation::Decrease,
            StockOperation::Unchanged,
        ]
        .into_iter()
        .find(|op| op.label() == label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    pub record_id: String,
    pub product_name: String,
    pub product_code: String,
    pub expected_quantity: i64,
    pub actual_quantity: i64,
    pub operation: Option<StockOperation>,
    pub operation_quantity: i64,
    pub reason: String,
    pub date: String,
    pub time: String,
    pub operator: Option<String>,
    pub note: Option<String>,
}

impl InventoryRecord {
    pub fn from_record(record: &Record) -> Self {
        let f = &record.fields;
        Self {
            record_id: record.record_id.clone(),
            product_name: fields::text_or_default(f, field::PRODUCT_NAME),
            product_code: fields::text_or_default(f, field::PRODUCT_CODE),
            expected_quantity: fields::quantity(f, field::EXPECTED),
            actual_quantity: fields::quantity(f, field::ACTUAL),
            operation: fields::text(f, field::OPERATION).and_then(|o| StockOperation::from_label(&o)),
            operation_quantity: fields::quantity(f, field::OPERATION_QUANTITY),
            reason: fields::text_or_default(f, field::REASON),
            date: fields::text_or_default(f, field::DATE),
            time: fields::text_or_default(f, field::TIME),
            operator: fields::text(f, field::OPERATOR),
            note: fields::text(f, field::NOTE),
        }
    }
}

/// Stock-take of one product.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InventoryAdjustment {
    #[validate(custom(function = "non_blank", message = "Product record id is required"))]
    pub product_record_id: String,
    #[validate(range(min = 0, message = "Actual quantity cannot be negative"))]
    pub actual_quantity: i64,
    #[validate(custom(function = "non_blank", message = "Reason is required"))]
    pub reason: String,
    pub operator: Option<String>,
    pub note: Option<String>,
}

impl InventoryAdjustment {
    /// Stock-take row recording the move from the product's current stock.
    pub fn record_fields(&self, product: &Product, now: &Zoned) -> Fields {
        let expected = product.remaining_quantity;
        let difference = self.actual_quantity - expected;

        // Quantities are text columns in the stock-take sheet
        let mut f = Fields::new();
        fields::put(&mut f, field::PRODUCT_NAME, product.name.as_str());
        fields::put(&mut f, field::PRODUCT_CODE, product.code.as_str());
        fields::put(&mut f, field::EXPECTED, expected.to_string());
        fields::put(&mut f, field::ACTUAL, self.actual_quantity.to_string());
        fields::put(&mut f, field::OPERATION, StockOperation::from_difference(difference).label());
        fields::put(&mut f, field::OPERATION_QUANTITY, difference.abs().to_string());
        fields::put(&mut f, field::REASON, self.reason.trim());
        fields::put(&mut f, field::DATE, now.strftime("%Y-%m-%d").to_string());
        fields::put(&mut f, field::TIME, now.strftime("%H:%M:%S").to_string());
        fields::put_opt(&mut f, field::OPERATOR, non_empty(&self.operator));
        fields::put_opt(&mut f, field::NOTE, non_empty(&self.note));
        f
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

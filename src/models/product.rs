use jiff::Timestamp;
use rand::Rng;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::fields::{self, non_blank};
use crate::external::vika::{Fields, Record};

/// Stock below this is reported as low.
pub const LOW_STOCK_THRESHOLD: i64 = 10;

const PRODUCT_CODE_LEN: usize = 12;

pub mod field {
    pub const NAME: &str = "name";
    pub const CODE: &str = "id";
    pub const KIND: &str = "kind";
    pub const QUANTITY: &str = "remaining_quantity";
    pub const UNIT: &str = "unit";
    pub const SPECIFICATIONS: &str = "specifications";
    pub const PRICE: &str = "price";
    pub const STATUS: &str = "status";
    pub const NOTE: &str = "note";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ProductKind {
    #[serde(rename = "服务项目")]
    Service,
    #[serde(rename = "普通商品")]
    Goods,
}

impl ProductKind {
    pub fn label(&self) -> &'static str {
        match self {
            ProductKind::Service => "服务项目",
            ProductKind::Goods => "普通商品",
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        match label {
            "服务项目" => Some(ProductKind::Service),
            "普通商品" => Some(ProductKind::Goods),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ProductStatus {
    #[serde(rename = "上架")]
    Active,
    #[serde(rename = "下架")]
    Inactive,
}

impl ProductStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ProductStatus::Active => "上架",
            ProductStatus::Inactive => "下架",
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        match label {
            "上架" => Some(ProductStatus::Active),
            "下架" => Some(ProductStatus::Inactive),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub record_id: String,
    pub name: String,
    /// 12-digit product code
    pub code: String,
    pub kind: Option<ProductKind>,
    pub remaining_quantity: i64,
    pub unit: String,
    pub specifications: String,
    pub price: f64,
    pub status: Option<ProductStatus>,
    pub note: String,
}

impl Product {
    pub fn from_record(record: &Record) -> Self {
        let f = &record.fields;
        Self {
            record_id: record.record_id.clone(),
            name: fields::text_or_default(f, field::NAME),
            code: fields::text_or_default(f, field::CODE),
            kind: fields::text(f, field::KIND).and_then(|k| ProductKind::from_label(&k)),
            remaining_quantity: fields::quantity(f, field::QUANTITY),
            unit: fields::text_or_default(f, field::UNIT),
            specifications: fields::text_or_default(f, field::SPECIFICATIONS),
            price: fields::number(f, field::PRICE).unwrap_or(0.0),
            status: fields::text(f, field::STATUS).and_then(|s| ProductStatus::from_label(&s)),
            note: fields::text_or_default(f, field::NOTE),
        }
    }

    pub fn is_low_stock(&self) -> bool {
        self.remaining_quantity < LOW_STOCK_THRESHOLD
    }
}

/// Code from the current millisecond clock plus three random digits, keeping
/// the last twelve digits.
pub fn generate_product_code(now: Timestamp, rng: &mut impl Rng) -> String {
    let suffix: u16 = rng.random_range(0..1000);
    let digits = format!("{}{suffix:03}", now.as_millisecond());
    let start = digits.len().saturating_sub(PRODUCT_CODE_LEN);
    digits[start..].to_string()
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    #[validate(custom(function = "non_blank", message = "Product name is required"))]
    pub name: String,
    /// Generated when absent
    pub code: Option<String>,
    pub kind: Option<ProductKind>,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub remaining_quantity: Option<i64>,
    pub unit: Option<String>,
    pub specifications: Option<String>,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: f64,
    pub status: Option<ProductStatus>,
    pub note: Option<String>,
}

impl NewProduct {
    pub fn to_fields(&self, code: &str) -> Fields {
        let mut f = Fields::new();
        fields::put(&mut f, field::NAME, self.name.trim());
        fields::put(&mut f, field::CODE, code);
        fields::put_opt(&mut f, field::KIND, self.kind.map(|k| k.label()));
        fields::put(&mut f, field::QUANTITY, self.remaining_quantity.unwrap_or(0));
        fields::put(&mut f, field::UNIT, self.unit.as_deref().unwrap_or_default());
        fields::put_opt(&mut f, field::SPECIFICATIONS, self.specifications.as_deref());
        fields::put(&mut f, field::PRICE, self.price);
        fields::put_opt(&mut f, field::STATUS, self.status.map(|s| s.label()));
        fields::put(&mut f, field::NOTE, self.note.as_deref().unwrap_or_default());
        f
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    #[validate(custom(function = "non_blank", message = "Product name cannot be empty"))]
    pub name: Option<String>,
    pub code: Option<String>,
    pub kind: Option<ProductKind>,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub remaining_quantity: Option<i64>,
    pub unit: Option<String>,
    pub specifications: Option<String>,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: Option<f64>,
    pub status: Option<ProductStatus>,
    pub note: Option<String>,
}

impl ProductPatch {
    pub fn to_fields(&self) -> Fields {
        let mut f = Fields::new();
        fields::put_opt(&mut f, field::NAME, self.name.as_deref().map(str::trim));
        fields::put_opt(&mut f, field::CODE, self.code.as_deref());
        fields::put_opt(&mut f, field::KIND, self.kind.map(|k| k.label()));
        fields::put_opt(&mut f, field::QUANTITY, self.remaining_quantity);
        fields::put_opt(&mut f, field::UNIT, self.unit.as_deref());
        fields::put_opt(&mut f, field::SPECIFICATIONS, self.specifications.as_deref());
        fields::put_opt(&mut f, field::PRICE, self.price);
        fields::put_opt(&mut f, field::STATUS, self.status.map(|s| s.label()));
        fields::put_opt(&mut f, field::NOTE, self.note.as_deref());
        f
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StockLevel {
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: i64,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct StatusChange {
    pub status: ProductStatus,
}

/// One row of a batch stock update.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StockUpdate {
    #[validate(custom(function = "non_blank", message = "Record id is required"))]
    pub record_id: String,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductStats {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub low_stock: usize,
    pub services: usize,
    pub goods: usize,
}

impl ProductStats {
    pub fn tally(products: &[Product]) -> Self {
        products.iter().fold(Self::default(), |mut stats, p| {
            stats.total += 1;
            match p.status {
                Some(ProductStatus::Active) => stats.active += 1,
                Some(ProductStatus::Inactive) => stats.inactive += 1,
                None => {}
            }
            match p.kind {
                Some(ProductKind::Service) => stats.services += 1,
                Some(ProductKind::Goods) => stats.goods += 1,
                None => {}
            }
            if p.is_low_stock() {
                stats.low_stock += 1;
            }
            stats
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use serde_json::json;

    fn product(fields: serde_json::Value) -> Product {
        Product::from_record(&Record {
            record_id: "recP".into(),
            created_at: None,
            updated_at: None,
            fields: fields.as_object().cloned().unwrap(),
        })
    }

    #[test]
    fn codes_are_twelve_digits() {
        let mut rng = StdRng::seed_from_u64(7);
        let now = Timestamp::from_millisecond(1_760_000_000_123).unwrap();
        let code = generate_product_code(now, &mut rng);
        assert_eq!(code.len(), 12);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
        assert!(code.starts_with("000000123"));
    }

    #[test]
    fn reads_labels_and_lenient_numbers() {
        let p = product(json!({
            "name": "Latte",
            "id": "123456789012",
            "kind": "普通商品",
            "remaining_quantity": "4",
            "price": 18,
            "status": "上架"
        }));
        assert_eq!(p.kind, Some(ProductKind::Goods));
        assert_eq!(p.status, Some(ProductStatus::Active));
        assert_eq!(p.remaining_quantity, 4);
        assert!(p.is_low_stock());
    }

    #[test]
    fn labels_serialize_as_sheet_values() {
        assert_eq!(serde_json::to_value(ProductKind::Service).unwrap(), json!("服务项目"));
        assert_eq!(serde_json::to_value(ProductStatus::Inactive).unwrap(), json!("下架"));
    }

    #[test]
    fn tallies_stats() {
        let products = vec![
            product(json!({ "kind": "服务项目", "status": "上架", "remaining_quantity": 50 })),
            product(json!({ "kind": "普通商品", "status": "下架", "remaining_quantity": 3 })),
            product(json!({ "kind": "普通商品", "status": "上架", "remaining_quantity": 10 })),
        ];
        assert_eq!(
            ProductStats::tally(&products),
            ProductStats {
                total: 3,
                active: 2,
                inactive: 1,
                low_stock: 1,
                services: 1,
                goods: 2,
            }
        );
    }

    #[test]
    fn negative_price_is_rejected() {
        let input = NewProduct {
            name: "Tea".into(),
            code: None,
            kind: None,
            remaining_quantity: None,
            unit: None,
            specifications: None,
            price: -1.0,
            status: None,
            note: None,
        };
        assert!(input.validate().unwrap_err().field_errors().contains_key("price"));
    }
}

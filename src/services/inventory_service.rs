use jiff::Zoned;
use validator::Validate;

use super::{require_id, require_ids};
use crate::envelope::Envelope;
use crate::error::{AppError, AppResult};
use crate::external::vika::{Fields, Formula};
use crate::models::fields;
use crate::models::inventory::field;
use crate::models::{InventoryAdjustment, InventoryRecord, product};
use crate::repositories::{InventoryRepository, ProductRepository};

/// Stock-takes: adjusts product stock and keeps a record of each change.
#[derive(Clone)]
pub struct InventoryService {
    products: ProductRepository,
    records: InventoryRepository,
}

impl InventoryService {
    pub fn new(products: ProductRepository, records: InventoryRepository) -> Self {
        Self { products, records }
    }

    /// Lists stock-take records, optionally matching `term` against the
    /// product code (exact) or product name (partial).
    pub async fn list_records(&self, term: Option<String>) -> Envelope<Vec<InventoryRecord>> {
        let filter = term
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| {
                Formula::any([
                    Formula::equals(field::PRODUCT_CODE, t),
                    Formula::contains(field::PRODUCT_NAME, t),
                ])
            });
        Envelope::from_result(self.records.list(filter).await, "Inventory records retrieved")
    }

    /// Sets a product's stock to the counted quantity and records the change.
    ///
    /// The stock update and the record insert are separate writes; if the
    /// insert fails the new stock level stays.
    pub async fn adjust_inventory(
        &self,
        adjustment: InventoryAdjustment,
    ) -> Envelope<InventoryRecord> {
        Envelope::from_result(self.try_adjust(adjustment).await, "Inventory adjusted")
    }

    pub async fn delete_record(&self, record_id: &str) -> Envelope<()> {
        let result = match require_id(record_id) {
            Ok(id) => self.records.delete(vec![id.to_string()]).await,
            Err(e) => Err(e),
        };
        Envelope::from_result(result, "Inventory record deleted")
    }

    pub async fn delete_records(&self, record_ids: Vec<String>) -> Envelope<usize> {
        let result = match require_ids(record_ids) {
            Ok(ids) => {
                let count = ids.len();
                self.records.delete(ids).await.map(|()| count)
            }
            Err(e) => Err(e),
        };
        Envelope::from_result(result, "Inventory records deleted")
    }

    async fn try_adjust(&self, adjustment: InventoryAdjustment) -> AppResult<InventoryRecord> {
        adjustment.validate()?;
        let product_id = require_id(&adjustment.product_record_id)?;
        let product = self
            .products
            .find_by_id(product_id)
            .await?
            .ok_or_else(|| AppError::not_found("product", "recordId", product_id))?;

        let record = adjustment.record_fields(&product, &Zoned::now());

        let mut stock = Fields::new();
        fields::put(&mut stock, product::field::QUANTITY, adjustment.actual_quantity);
        self.products.update(product_id, stock).await?;
        tracing::info!(
            record_id = %product_id,
            from = product.remaining_quantity,
            to = adjustment.actual_quantity,
            "Product stock adjusted"
        );

        self.records.create(record).await
    }
}

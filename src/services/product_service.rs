//! Product catalogue and stock levels.

use jiff::Timestamp;
use validator::Validate;

use super::require_id;
use crate::envelope::Envelope;
use crate::error::{AppError, AppResult};
use crate::external::vika::{Fields, Formula, RecordUpdate};
use crate::models::fields;
use crate::models::product::{field, generate_product_code};
use crate::models::{
    NewProduct, Product, ProductPatch, ProductStats, StatusChange, StockLevel, StockUpdate,
};
use crate::repositories::ProductRepository;

#[derive(Clone)]
pub struct ProductService {
    products: ProductRepository,
}

impl ProductService {
    pub fn new(products: ProductRepository) -> Self {
        Self { products }
    }

    /// Lists products, optionally matching `term` against name and code.
    ///
    /// A term matches an exact name, an exact code or part of a name.
    pub async fn list_products(&self, term: Option<String>) -> Envelope<Vec<Product>> {
        let filter = term
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| {
                Formula::any([
                    Formula::equals(field::NAME, t),
                    Formula::equals(field::CODE, t),
                    Formula::contains(field::NAME, t),
                ])
            });
        Envelope::from_result(self.products.list(filter).await, "Products retrieved")
    }

    pub async fn get_product(&self, record_id: &str) -> Envelope<Product> {
        Envelope::from_result(self.find_product(record_id).await, "Product retrieved")
    }

    /// Creates a product, generating a 12-digit code when none is given.
    pub async fn create_product(&self, new_product: NewProduct) -> Envelope<Product> {
        Envelope::from_result(self.try_create(new_product).await, "Product created")
    }

    pub async fn update_product(&self, record_id: &str, patch: ProductPatch) -> Envelope<Product> {
        let result: AppResult<_> = async {
            let id = require_id(record_id)?;
            patch.validate()?;
            let fields = patch.to_fields();
            if fields.is_empty() {
                return Err(AppError::validation("body", "No fields to update"));
            }
            self.products.update(id, fields).await
        }
        .await;
        Envelope::from_result(result, "Product updated")
    }

    pub async fn delete_product(&self, record_id: &str) -> Envelope<()> {
        let result = match require_id(record_id) {
            Ok(id) => self.products.delete(id).await,
            Err(e) => Err(e),
        };
        Envelope::from_result(result, "Product deleted")
    }

    /// Sets the remaining quantity of one product.
    pub async fn update_inventory(&self, record_id: &str, level: StockLevel) -> Envelope<Product> {
        let result: AppResult<_> = async {
            let id = require_id(record_id)?;
            level.validate()?;
            let mut f = Fields::new();
            fields::put(&mut f, field::QUANTITY, level.quantity);
            self.products.update(id, f).await
        }
        .await;
        Envelope::from_result(result, "Inventory updated")
    }

    /// Puts a product on or off the shelf.
    pub async fn update_status(&self, record_id: &str, change: StatusChange) -> Envelope<Product> {
        let result: AppResult<_> = async {
            let id = require_id(record_id)?;
            let mut f = Fields::new();
            fields::put(&mut f, field::STATUS, change.status.label());
            self.products.update(id, f).await
        }
        .await;
        Envelope::from_result(result, "Status updated")
    }

    /// Sets remaining quantities of several products, ten per request.
    ///
    /// Every row is validated before the first write; a failed batch leaves
    /// earlier batches applied.
    pub async fn batch_update_stock(&self, updates: Vec<StockUpdate>) -> Envelope<Vec<Product>> {
        let result: AppResult<_> = async {
            if updates.is_empty() {
                return Err(AppError::validation("updates", "At least one update is required"));
            }
            let mut rows = Vec::with_capacity(updates.len());
            for update in &updates {
                update.validate()?;
                let mut f = Fields::new();
                fields::put(&mut f, field::QUANTITY, update.quantity);
                rows.push(RecordUpdate::new(update.record_id.trim(), f));
            }
            self.products.update_many(rows).await
        }
        .await;
        Envelope::from_result(result, "Stock updated")
    }

    /// Counts by status and kind, plus products under the low-stock threshold.
    pub async fn product_stats(&self) -> Envelope<ProductStats> {
        let result = self
            .products
            .list(None)
            .await
            .map(|products| ProductStats::tally(&products));
        Envelope::from_result(result, "Product statistics retrieved")
    }

    async fn find_product(&self, record_id: &str) -> AppResult<Product> {
        let id = require_id(record_id)?;
        self.products
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("product", "recordId", id))
    }

    async fn try_create(&self, new_product: NewProduct) -> AppResult<Product> {
        new_product.validate()?;
        let code = match new_product.code.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => code.to_string(),
            _ => generate_product_code(Timestamp::now(), &mut rand::rng()),
        };
        let product = self.products.create(new_product.to_fields(&code)).await?;
        tracing::info!(record_id = %product.record_id, code = %product.code, "Product created");
        Ok(product)
    }
}

//! Governed, cached access to datasheets.
//!
//! This is the only code that touches the call governor and the cache. Reads
//! are looked up by [`Signature`] first and only successful results are
//! stored. Writes always go upstream and, once they succeed, drop every
//! listing of the sheet plus the detail entries of the records they touched.

use std::future::Future;
use std::sync::Arc;

use serde_json::json;

use crate::cache::{CacheManager, Signature};
use crate::config::DatasheetConfig;
use crate::error::AppResult;
use crate::external::vika::{
    DatasheetTransport, Fields, MAX_RECORDS_PER_WRITE, Record, RecordPage, RecordQuery,
    RecordUpdate, TransportError,
};
use crate::governor::CallGovernor;

const OP_QUERY: &str = "query";
const OP_ALL: &str = "all";
const OP_DETAIL: &str = "detail";

/// Shared plumbing behind every repository. Cheap to clone.
#[derive(Clone)]
pub struct SheetGateway {
    transport: Arc<dyn DatasheetTransport>,
    governor: CallGovernor,
    cache: CacheManager,
    page_size: u32,
}

impl SheetGateway {
    pub fn new(
        transport: Arc<dyn DatasheetTransport>,
        governor: CallGovernor,
        cache: CacheManager,
        page_size: u32,
    ) -> Self {
        Self {
            transport,
            governor,
            cache,
            page_size: page_size.max(1),
        }
    }

    /// Handle on one datasheet; `namespace` prefixes its cache signatures.
    pub fn sheet(&self, namespace: &'static str, config: DatasheetConfig) -> Sheet {
        Sheet {
            gateway: self.clone(),
            namespace,
            config: Arc::new(config),
        }
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    pub fn governor(&self) -> &CallGovernor {
        &self.governor
    }
}

#[derive(Clone)]
pub struct Sheet {
    gateway: SheetGateway,
    namespace: &'static str,
    config: Arc<DatasheetConfig>,
}

impl Sheet {
    pub fn namespace(&self) -> &'static str {
        self.namespace
    }

    /// Configured view, if any.
    pub fn view_id(&self) -> Option<String> {
        self.config.view_id.clone()
    }

    /// One page of records.
    pub async fn query(&self, query: RecordQuery) -> AppResult<RecordPage> {
        let signature = Signature::new(self.namespace, OP_QUERY, &query)?;
        if let Some(page) = self.cached(&signature) {
            return Ok(page);
        }

        let page = self
            .call(move |transport, sheet| async move { transport.query(&sheet, &query).await })
            .await?;
        self.store(&signature, &page);
        Ok(page)
    }

    /// Every record matching `query`, one governed call per page.
    pub async fn query_all(&self, query: RecordQuery) -> AppResult<Vec<Record>> {
        let signature = Signature::new(self.namespace, OP_ALL, &query)?;
        if let Some(records) = self.cached(&signature) {
            return Ok(records);
        }

        let page_size = self.gateway.page_size;
        let mut records: Vec<Record> = Vec::new();
        let mut page_num = 1;
        loop {
            let page_query = query.clone().page(page_num, page_size);
            let page = self
                .call(move |transport, sheet| async move {
                    transport.query(&sheet, &page_query).await
                })
                .await?;

            let fetched = page.records.len();
            records.extend(page.records);
            if fetched < page_size as usize || records.len() as u64 >= page.total {
                break;
            }
            page_num += 1;
        }

        tracing::debug!(
            namespace = self.namespace,
            records = records.len(),
            pages = page_num,
            "Fetched all pages"
        );
        self.store(&signature, &records);
        Ok(records)
    }

    /// A single record by id; `None` when the sheet has no such record.
    pub async fn get(&self, record_id: &str) -> AppResult<Option<Record>> {
        let signature = self.detail_signature(record_id)?;
        if let Some(record) = self.cached::<Record>(&signature) {
            return Ok(Some(record));
        }

        self.fetch(record_id).await
    }

    /// Reads a record straight from the sheet, skipping any cached copy.
    ///
    /// The fresh record replaces the cached detail.
    pub async fn fetch(&self, record_id: &str) -> AppResult<Option<Record>> {
        let signature = self.detail_signature(record_id)?;
        let query = RecordQuery::new().record_ids([record_id]);
        let page = self
            .call(move |transport, sheet| async move { transport.query(&sheet, &query).await })
            .await?;
        let record = page
            .records
            .into_iter()
            .find(|r| r.record_id == record_id);
        if let Some(record) = &record {
            self.store(&signature, record);
        }
        Ok(record)
    }

    pub async fn create(&self, records: Vec<Fields>) -> AppResult<Vec<Record>> {
        let mut created = Vec::with_capacity(records.len());
        for chunk in records.chunks(MAX_RECORDS_PER_WRITE) {
            let chunk = chunk.to_vec();
            let result = self
                .call(move |transport, sheet| async move { transport.create(&sheet, chunk).await })
                .await;
            match result {
                Ok(records) => created.extend(records),
                Err(error) => {
                    self.invalidate_written(created.iter().map(|r| r.record_id.as_str()));
                    return Err(error);
                }
            }
        }
        self.invalidate_written(created.iter().map(|r| r.record_id.as_str()));
        Ok(created)
    }

    pub async fn update(&self, updates: Vec<RecordUpdate>) -> AppResult<Vec<Record>> {
        let mut updated = Vec::with_capacity(updates.len());
        for chunk in updates.chunks(MAX_RECORDS_PER_WRITE) {
            let chunk = chunk.to_vec();
            let ids: Vec<String> = chunk.iter().map(|u| u.record_id.clone()).collect();
            let result = self
                .call(move |transport, sheet| async move { transport.update(&sheet, chunk).await })
                .await;
            match result {
                Ok(records) => {
                    self.invalidate_written(ids.iter().map(String::as_str));
                    updated.extend(records);
                }
                Err(error) => return Err(error),
            }
        }
        Ok(updated)
    }

    pub async fn delete(&self, record_ids: Vec<String>) -> AppResult<()> {
        for chunk in record_ids.chunks(MAX_RECORDS_PER_WRITE) {
            let chunk = chunk.to_vec();
            let ids = chunk.clone();
            self.call(move |transport, sheet| async move { transport.delete(&sheet, &chunk).await })
                .await?;
            self.invalidate_written(ids.iter().map(String::as_str));
        }
        Ok(())
    }

    /// Runs one transport call through the governor.
    async fn call<F, Fut, T>(&self, operation: F) -> AppResult<T>
    where
        F: FnOnce(Arc<dyn DatasheetTransport>, Arc<DatasheetConfig>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, TransportError>> + Send + 'static,
        T: Send + 'static,
    {
        let transport = Arc::clone(&self.gateway.transport);
        let sheet = Arc::clone(&self.config);
        let outcome = self
            .gateway
            .governor
            .enqueue(move || operation(transport, sheet))
            .await?;
        Ok(outcome?)
    }

    fn detail_signature(&self, record_id: &str) -> AppResult<Signature> {
        Ok(Signature::new(
            self.namespace,
            OP_DETAIL,
            &json!({ "recordId": record_id }),
        )?)
    }

    fn cached<T: serde::de::DeserializeOwned>(&self, signature: &Signature) -> Option<T> {
        let hit = self.gateway.cache.get_json(signature);
        tracing::trace!(key = %signature, hit = hit.is_some(), "Cache lookup");
        hit
    }

    fn store<T: serde::Serialize + ?Sized>(&self, signature: &Signature, value: &T) {
        if let Err(error) = self.gateway.cache.set_json(signature, value) {
            tracing::warn!(key = %signature, error = %error, "Failed to cache read result");
        }
    }

    fn invalidate_written<'a>(&self, record_ids: impl Iterator<Item = &'a str>) {
        let cache = &self.gateway.cache;
        cache.invalidate_prefix(&Signature::prefix(self.namespace, OP_QUERY));
        cache.invalidate_prefix(&Signature::prefix(self.namespace, OP_ALL));
        for id in record_ids {
            if let Ok(signature) = self.detail_signature(id) {
                cache.invalidate(&signature);
            }
        }
    }
}

//! In-memory [`DatasheetTransport`] for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use jiff::Timestamp;
use serde_json::Value;

use super::error::TransportError;
use super::transport::DatasheetTransport;
use super::types::{Fields, Record, RecordPage, RecordQuery, RecordUpdate, SortOrder};
use crate::config::DatasheetConfig;

/// Page size the real service uses when none is requested.
const DEFAULT_PAGE_SIZE: u32 = 100;

#[derive(Default)]
pub struct FakeTransport {
    sheets: Mutex<HashMap<String, Vec<Record>>>,
    failures: Mutex<VecDeque<TransportError>>,
    calls: AtomicUsize,
    writes: AtomicUsize,
    next_id: AtomicUsize,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record to `sheet_id` and returns its id.
    pub fn seed(&self, sheet_id: &str, fields: Value) -> String {
        self.seed_at(sheet_id, fields, Timestamp::now())
    }

    pub fn seed_at(&self, sheet_id: &str, fields: Value, created: Timestamp) -> String {
        let record = self.new_record(into_fields(fields), created);
        let id = record.record_id.clone();
        self.sheets
            .lock()
            .unwrap()
            .entry(sheet_id.to_string())
            .or_default()
            .push(record);
        id
    }

    pub fn records(&self, sheet_id: &str) -> Vec<Record> {
        self.sheets
            .lock()
            .unwrap()
            .get(sheet_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn record(&self, sheet_id: &str, record_id: &str) -> Option<Record> {
        self.records(sheet_id)
            .into_iter()
            .find(|r| r.record_id == record_id)
    }

    /// Makes the next call fail with `error`; queued failures are used in order.
    pub fn fail_next(&self, error: TransportError) {
        self.failures.lock().unwrap().push_back(error);
    }

    pub fn fail_with_status(&self, status: u16) {
        self.fail_next(TransportError::Status {
            status,
            code: Some(status as i64),
            message: format!("injected {status}"),
        });
    }

    /// Every call made, failed ones included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn begin(&self, write: bool) -> Result<(), TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if write {
            self.writes.fetch_add(1, Ordering::SeqCst);
        }
        match self.failures.lock().unwrap().pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn new_record(&self, fields: Fields, created: Timestamp) -> Record {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let ms = created.as_millisecond();
        Record {
            record_id: format!("rec{n:04}"),
            created_at: Some(ms),
            updated_at: Some(ms),
            fields,
        }
    }
}

fn into_fields(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        other => panic!("seed fields must be an object, got {other}"),
    }
}

fn sort_key(record: &Record, field: &str) -> String {
    match record.fields.get(field) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

#[async_trait]
impl DatasheetTransport for FakeTransport {
    async fn query(
        &self,
        sheet: &DatasheetConfig,
        query: &RecordQuery,
    ) -> Result<RecordPage, TransportError> {
        self.begin(false)?;
        let mut records: Vec<Record> = self
            .records(&sheet.id)
            .into_iter()
            .filter(|r| query.record_ids.is_empty() || query.record_ids.contains(&r.record_id))
            .filter(|r| query.filter.as_ref().is_none_or(|f| f.matches(&r.fields)))
            .collect();

        for spec in query.sort.iter().rev() {
            records.sort_by(|a, b| {
                let ordering = sort_key(a, &spec.field).cmp(&sort_key(b, &spec.field));
                match spec.order {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                }
            });
        }
        if let Some(max) = query.max_records {
            records.truncate(max as usize);
        }

        let total = records.len() as u64;
        let page_size = query.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        let page_num = query.page_num.unwrap_or(1).max(1);
        let skip = ((page_num - 1) * page_size) as usize;
        let records = records
            .into_iter()
            .skip(skip)
            .take(page_size as usize)
            .collect();

        Ok(RecordPage {
            total,
            page_num,
            page_size,
            records,
        })
    }

    async fn create(
        &self,
        sheet: &DatasheetConfig,
        records: Vec<Fields>,
    ) -> Result<Vec<Record>, TransportError> {
        self.begin(true)?;
        let created: Vec<Record> = records
            .into_iter()
            .map(|fields| self.new_record(fields, Timestamp::now()))
            .collect();
        self.sheets
            .lock()
            .unwrap()
            .entry(sheet.id.clone())
            .or_default()
            .extend(created.iter().cloned());
        Ok(created)
    }

    async fn update(
        &self,
        sheet: &DatasheetConfig,
        records: Vec<RecordUpdate>,
    ) -> Result<Vec<Record>, TransportError> {
        self.begin(true)?;
        let mut sheets = self.sheets.lock().unwrap();
        let rows = sheets.entry(sheet.id.clone()).or_default();
        let mut updated = Vec::with_capacity(records.len());
        for change in records {
            let Some(row) = rows.iter_mut().find(|r| r.record_id == change.record_id) else {
                return Err(TransportError::Status {
                    status: 404,
                    code: Some(404),
                    message: format!("record {} not found", change.record_id),
                });
            };
            row.fields.extend(change.fields);
            row.updated_at = Some(Timestamp::now().as_millisecond());
            updated.push(row.clone());
        }
        Ok(updated)
    }

    async fn delete(
        &self,
        sheet: &DatasheetConfig,
        record_ids: &[String],
    ) -> Result<(), TransportError> {
        self.begin(true)?;
        if let Some(rows) = self.sheets.lock().unwrap().get_mut(&sheet.id) {
            rows.retain(|r| !record_ids.contains(&r.record_id));
        }
        Ok(())
    }
}

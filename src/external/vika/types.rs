use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::formula::Formula;

/// Field values keyed by field name (`fieldKey=name`).
pub type Fields = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub record_id: String,
    /// Milliseconds since the Unix epoch
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub updated_at: Option<i64>,
    #[serde(default)]
    pub fields: Fields,
}

impl Record {
    pub fn created(&self) -> Option<Timestamp> {
        self.created_at
            .and_then(|ms| Timestamp::from_millisecond(ms).ok())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPage {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page_num: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub records: Vec<Record>,
}

impl RecordPage {
    /// Whether pages after this one hold more records.
    pub fn has_more(&self, fetched_so_far: usize) -> bool {
        !self.records.is_empty() && (fetched_so_far as u64) < self.total
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordUpdate {
    pub record_id: String,
    pub fields: Fields,
}

impl RecordUpdate {
    pub fn new(record_id: impl Into<String>, fields: Fields) -> Self {
        Self {
            record_id: record_id.into(),
            fields,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub order: SortOrder,
}

/// Parameters of a record listing.
///
/// Serializes to the cache signature parameters; [`RecordQuery::to_params`]
/// renders the wire query string.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_num: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_records: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub record_ids: Vec<String>,
    #[serde(rename = "filterByFormula", skip_serializing_if = "Option::is_none")]
    pub filter: Option<Formula>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<SortSpec>,
}

impl RecordQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(mut self, view_id: Option<String>) -> Self {
        self.view_id = view_id.filter(|v| !v.trim().is_empty());
        self
    }

    pub fn page(mut self, page_num: u32, page_size: u32) -> Self {
        self.page_num = Some(page_num);
        self.page_size = Some(page_size);
        self
    }

    pub fn max_records(mut self, max_records: Option<u32>) -> Self {
        self.max_records = max_records;
        self
    }

    pub fn record_ids(mut self, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.record_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn filter(mut self, formula: Formula) -> Self {
        self.filter = Some(formula);
        self
    }

    pub fn sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort.push(SortSpec {
            field: field.into(),
            order,
        });
        self
    }

    /// Query-string pairs in the form the records endpoint expects.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(view_id) = &self.view_id {
            params.push(("viewId".to_string(), view_id.clone()));
        }
        if let Some(size) = self.page_size {
            params.push(("pageSize".to_string(), size.to_string()));
        }
        if let Some(num) = self.page_num {
            params.push(("pageNum".to_string(), num.to_string()));
        }
        if let Some(max) = self.max_records {
            params.push(("maxRecords".to_string(), max.to_string()));
        }
        if !self.record_ids.is_empty() {
            params.push(("recordIds".to_string(), self.record_ids.join(",")));
        }
        if let Some(formula) = &self.filter {
            params.push(("filterByFormula".to_string(), formula.to_string()));
        }
        for (i, spec) in self.sort.iter().enumerate() {
            params.push((format!("sort[{i}][field]"), spec.field.clone()));
            params.push((format!("sort[{i}][order]"), spec.order.as_str().to_string()));
        }
        params
    }
}

/// Body shared by every records endpoint response.
#[derive(Debug, Deserialize)]
pub(crate) struct VikaResponse<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecordsData {
    #[serde(default)]
    pub records: Vec<Record>,
}

#[derive(Debug, Serialize)]
pub(crate) struct NewRecord {
    pub fields: Fields,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WriteBody<R> {
    pub records: Vec<R>,
    pub field_key: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_query_params_in_wire_form() {
        let query = RecordQuery::new()
            .view(Some("viwLedger".into()))
            .page(2, 100)
            .filter(Formula::contains("record", "充值"))
            .sort("date", SortOrder::Desc);

        let params = query.to_params();
        assert!(params.contains(&("viewId".into(), "viwLedger".into())));
        assert!(params.contains(&("pageNum".into(), "2".into())));
        assert!(params.contains(&("pageSize".into(), "100".into())));
        assert!(params.contains(&("filterByFormula".into(), r#"FIND("充值", {record}) > 0"#.into())));
        assert!(params.contains(&("sort[0][field]".into(), "date".into())));
        assert!(params.contains(&("sort[0][order]".into(), "desc".into())));
    }

    #[test]
    fn blank_view_is_dropped() {
        let query = RecordQuery::new().view(Some("  ".into()));
        assert!(query.view_id.is_none());
        assert!(query.to_params().is_empty());
    }

    #[test]
    fn record_ids_are_comma_joined() {
        let params = RecordQuery::new().record_ids(["rec1", "rec2"]).to_params();
        assert_eq!(params, vec![("recordIds".to_string(), "rec1,rec2".to_string())]);
    }

    #[test]
    fn decodes_a_records_page() {
        let body = json!({
            "success": true,
            "code": 200,
            "message": "SUCCESS",
            "data": {
                "total": 1,
                "pageNum": 1,
                "pageSize": 100,
                "records": [{
                    "recordId": "recA",
                    "createdAt": 1_700_000_000_000_i64,
                    "updatedAt": 1_700_000_000_000_i64,
                    "fields": { "member_name": "Ann" }
                }]
            }
        });
        let response: VikaResponse<RecordPage> = serde_json::from_value(body).unwrap();
        assert!(response.success);
        let page = response.data.unwrap();
        assert_eq!(page.records[0].record_id, "recA");
        assert_eq!(
            page.records[0].created().unwrap(),
            Timestamp::from_second(1_700_000_000).unwrap()
        );
    }

    #[test]
    fn paging_stops_on_empty_pages() {
        let page = RecordPage {
            total: 5,
            page_num: 2,
            page_size: 2,
            records: vec![],
        };
        assert!(!page.has_more(2));
    }
}

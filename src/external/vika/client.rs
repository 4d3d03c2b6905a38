use std::time::Instant;

use async_trait::async_trait;
use reqwest::{Method, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::error::TransportError;
use super::transport::DatasheetTransport;
use super::types::{
    Fields, NewRecord, Record, RecordPage, RecordQuery, RecordUpdate, RecordsData, VikaResponse,
    WriteBody,
};
use crate::config::{DatasheetConfig, VikaConfig};

const FIELD_KEY: &str = "name";

/// Longest upstream body excerpt kept in an error message.
const MAX_ERROR_BODY: usize = 256;

/// [`DatasheetTransport`] over the Vika fusion REST API.
pub struct VikaClient {
    http: reqwest::Client,
    config: VikaConfig,
}

impl VikaClient {
    pub fn new(http: reqwest::Client, config: VikaConfig) -> Self {
        Self { http, config }
    }

    fn records_url(
        &self,
        sheet: &DatasheetConfig,
        params: &[(String, String)],
    ) -> Result<Url, TransportError> {
        let base = self.config.base_url.trim_end_matches('/');
        let mut url = Url::parse(&format!("{base}/datasheets/{}/records", sheet.id))
            .map_err(|e| TransportError::Network(format!("invalid datasheet URL: {e}")))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("fieldKey", FIELD_KEY);
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn send<B, T>(
        &self,
        method: Method,
        sheet: &DatasheetConfig,
        url: Url,
        body: Option<&B>,
    ) -> Result<Option<T>, TransportError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let started = Instant::now();
        let mut request = self
            .http
            .request(method.clone(), url)
            .bearer_auth(self.config.token_for(sheet));
        if let Some(body) = body {
            request = request.json(body);
        }

        let result = async {
            let response = request.send().await.map_err(TransportError::from_reqwest)?;
            let status = response.status();
            let bytes = response.bytes().await.map_err(TransportError::from_reqwest)?;
            decode_body::<T>(status, &bytes)
        }
        .await;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => tracing::debug!(%method, datasheet = %sheet.id, elapsed_ms, "Datasheet call completed"),
            Err(error) => tracing::warn!(
                %method,
                datasheet = %sheet.id,
                elapsed_ms,
                error = %error,
                "Datasheet call failed"
            ),
        }
        result
    }
}

fn decode_body<T: DeserializeOwned>(
    status: StatusCode,
    bytes: &[u8],
) -> Result<Option<T>, TransportError> {
    match serde_json::from_slice::<VikaResponse<T>>(bytes) {
        Ok(body) if status.is_success() && body.success => Ok(body.data),
        Ok(body) => Err(TransportError::Status {
            status: effective_status(status, body.code),
            code: Some(body.code),
            message: body.message,
        }),
        Err(_) if !status.is_success() => Err(TransportError::Status {
            status: status.as_u16(),
            code: None,
            message: excerpt(bytes),
        }),
        Err(error) => Err(TransportError::Decode(error.to_string())),
    }
}

/// The service sometimes reports failures as HTTP 200 with the real status in
/// the body's `code`.
fn effective_status(status: StatusCode, code: i64) -> u16 {
    if !status.is_success() {
        status.as_u16()
    } else if (400..600).contains(&code) {
        code as u16
    } else {
        StatusCode::BAD_REQUEST.as_u16()
    }
}

fn excerpt(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    text.chars().take(MAX_ERROR_BODY).collect()
}

fn require<T>(data: Option<T>) -> Result<T, TransportError> {
    data.ok_or_else(|| TransportError::Decode("response carried no data".to_string()))
}

#[async_trait]
impl DatasheetTransport for VikaClient {
    async fn query(
        &self,
        sheet: &DatasheetConfig,
        query: &RecordQuery,
    ) -> Result<RecordPage, TransportError> {
        let url = self.records_url(sheet, &query.to_params())?;
        let page = self.send::<(), RecordPage>(Method::GET, sheet, url, None).await?;
        require(page)
    }

    async fn create(
        &self,
        sheet: &DatasheetConfig,
        records: Vec<Fields>,
    ) -> Result<Vec<Record>, TransportError> {
        let url = self.records_url(sheet, &[])?;
        let body = WriteBody {
            records: records.into_iter().map(|fields| NewRecord { fields }).collect(),
            field_key: FIELD_KEY,
        };
        let data = self.send::<_, RecordsData>(Method::POST, sheet, url, Some(&body)).await?;
        Ok(require(data)?.records)
    }

    async fn update(
        &self,
        sheet: &DatasheetConfig,
        records: Vec<RecordUpdate>,
    ) -> Result<Vec<Record>, TransportError> {
        let url = self.records_url(sheet, &[])?;
        let body = WriteBody {
            records,
            field_key: FIELD_KEY,
        };
        let data = self.send::<_, RecordsData>(Method::PATCH, sheet, url, Some(&body)).await?;
        Ok(require(data)?.records)
    }

    async fn delete(
        &self,
        sheet: &DatasheetConfig,
        record_ids: &[String],
    ) -> Result<(), TransportError> {
        let params = [("recordIds".to_string(), record_ids.join(","))];
        let url = self.records_url(sheet, &params)?;
        self.send::<(), serde_json::Value>(Method::DELETE, sheet, url, None)
            .await
            .map(|_| ())
    }
}

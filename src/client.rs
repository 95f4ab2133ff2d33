//! Backend contract for the `/upload` and `/search` endpoints.

use crate::error::{DashError, Result};
use crate::filter::FilterSpec;
use reqwest::blocking::{multipart, Client};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

pub const STATUS_SUCCESS: &str = "success";

/// A file picked or dropped by the user, read fully into memory.
#[derive(Clone, Debug, PartialEq)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_owned());
        Ok(Self { name, bytes })
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct UploadResponse {
    pub status: String,
    pub message: String,
    pub columns: Vec<String>,
    #[serde(rename = "numericMax")]
    pub numeric_max: HashMap<String, f64>,
}

impl UploadResponse {
    /// Turns a non-success payload into an application error.
    pub fn into_success(self) -> Result<Self> {
        if self.status == STATUS_SUCCESS {
            Ok(self)
        } else {
            Err(DashError::Application(self.message))
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SearchRequest {
    /// Keyed in filter-selection order.
    pub filters: Map<String, Value>,
    #[serde(rename = "selectedColumns")]
    pub selected_columns: Vec<String>,
}

impl SearchRequest {
    pub fn new(specs: Vec<(String, FilterSpec)>, selected_columns: Vec<String>) -> Result<Self> {
        let mut filters = Map::new();
        for (column, spec) in specs {
            filters.insert(column, serde_json::to_value(spec)?);
        }
        Ok(Self {
            filters,
            selected_columns,
        })
    }
}

/// One result row, key order as sent by the server.
pub type Record = Map<String, Value>;

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchResponse {
    pub status: String,
    pub message: String,
    pub results: Vec<Record>,
}

impl SearchResponse {
    pub fn into_success(self) -> Result<Self> {
        if self.status == STATUS_SUCCESS {
            Ok(self)
        } else {
            Err(DashError::Application(self.message))
        }
    }
}

/// The two calls the dashboard makes. Both are blocking and are run off the
/// UI thread by the task runner.
pub trait Backend: Send + Sync {
    fn upload(&self, file: &UploadFile) -> Result<UploadResponse>;
    fn search(&self, request: &SearchRequest) -> Result<SearchResponse>;
}

pub struct HttpBackend {
    base_url: String,
    client: Client,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Non-2xx is a transport failure regardless of body; otherwise the body
/// must decode as `T`.
fn decode<T: for<'de> Deserialize<'de>>(response: reqwest::blocking::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(DashError::HttpStatus(status.as_u16()));
    }
    let body = response.text()?;
    Ok(serde_json::from_str(&body)?)
}

impl Backend for HttpBackend {
    fn upload(&self, file: &UploadFile) -> Result<UploadResponse> {
        let part = multipart::Part::bytes(file.bytes.clone()).file_name(file.name.clone());
        let form = multipart::Form::new().part("file", part);
        log::info!("POST /upload {} ({} bytes)", file.name, file.size());
        let response = self.client.post(self.url("/upload")).multipart(form).send()?;
        decode(response)
    }

    fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let body = serde_json::to_string(request)?;
        log::info!("POST /search {}", body);
        let response = self
            .client
            .post(self.url("/search"))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()?;
        decode(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::RangeBound;
    use serde_json::json;

    #[test]
    fn upload_response_defaults_numeric_max() {
        let resp: UploadResponse = serde_json::from_value(json!({
            "status": "success",
            "message": "ok",
            "columns": ["name", "age"]
        }))
        .unwrap();
        assert_eq!(resp.columns, vec!["name", "age"]);
        assert!(resp.numeric_max.is_empty());
    }

    #[test]
    fn search_request_matches_wire_contract() {
        let req = SearchRequest::new(
            vec![
                ("name".into(), FilterSpec::Text("al".into())),
                (
                    "age".into(),
                    FilterSpec::Range([RangeBound(10.0), RangeBound(40.0)]),
                ),
            ],
            vec!["name".into(), "age".into()],
        )
        .unwrap();
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "filters": {"name": {"text": "al"}, "age": {"range": [10, 40]}},
                "selectedColumns": ["name", "age"]
            })
        );
    }

    #[test]
    fn search_response_keeps_key_order() {
        let resp: SearchResponse = serde_json::from_str(
            r#"{"status":"success","results":[{"zeta":1,"alpha":"x"}],"record_count":1}"#,
        )
        .unwrap();
        let keys: Vec<&String> = resp.results[0].keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let backend = HttpBackend::new("http://localhost:5000/", Duration::from_secs(1)).unwrap();
        assert_eq!(backend.url("/search"), "http://localhost:5000/search");
    }
}

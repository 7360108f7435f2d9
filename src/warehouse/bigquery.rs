//! Minimal BigQuery REST client: submit a query, wait for it, read every row

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use super::{auth, QueryResult, Row, Warehouse};
use crate::error::{PipelineError, Result};

const API_BASE: &str = "https://bigquery.googleapis.com/bigquery/v2";

/// Server-side long-poll window for each request
const POLL_TIMEOUT_MS: u64 = 10_000;

/// Handle bound to one project, created once and shared by every query of a run
pub struct BigQueryClient {
    http: Client,
    token: String,
    project_id: String,
    location: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    query: &'a str,
    use_legacy_sql: bool,
    timeout_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResponse {
    #[serde(default)]
    job_complete: bool,
    job_reference: Option<JobReference>,
    schema: Option<TableSchema>,
    #[serde(default)]
    rows: Vec<TableRow>,
    page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobReference {
    job_id: String,
    location: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct TableSchema {
    #[serde(default)]
    fields: Vec<FieldSchema>,
}

#[derive(Debug, Clone, Deserialize)]
struct FieldSchema {
    name: String,
    #[serde(rename = "type")]
    field_type: String,
    mode: Option<String>,
    #[serde(default)]
    fields: Vec<FieldSchema>,
}

#[derive(Debug, Deserialize)]
struct TableRow {
    #[serde(default)]
    f: Vec<TableCell>,
}

#[derive(Debug, Deserialize)]
struct TableCell {
    #[serde(default)]
    v: Value,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    errors: Vec<ErrorProto>,
}

#[derive(Debug, Deserialize)]
struct ErrorProto {
    reason: Option<String>,
}

impl BigQueryClient {
    /// Build a client for `project_id`, resolving credentials up front
    pub fn connect(project_id: &str, location: Option<&str>) -> Result<Self> {
        let token = auth::access_token()?;
        Self::with_token(project_id, location, token)
    }

    pub fn with_token(project_id: &str, location: Option<&str>, token: String) -> Result<Self> {
        // Jobs run as long as they run; only the service decides when they end.
        let http = Client::builder().timeout(None::<Duration>).build()?;
        Ok(Self {
            http,
            token,
            project_id: project_id.to_string(),
            location: location.map(str::to_string),
        })
    }

    fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.bearer_auth(&self.token).send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(error_from_body(status, &body));
        }
        Ok(response.json()?)
    }

    fn get_query_results(
        &self,
        job: &JobReference,
        page_token: Option<&str>,
    ) -> Result<QueryResponse> {
        let url = format!(
            "{}/projects/{}/queries/{}",
            API_BASE, self.project_id, job.job_id
        );
        let mut params = vec![("timeoutMs", POLL_TIMEOUT_MS.to_string())];
        if let Some(location) = job.location.as_deref().or(self.location.as_deref()) {
            params.push(("location", location.to_string()));
        }
        if let Some(token) = page_token {
            params.push(("pageToken", token.to_string()));
        }
        self.send(self.http.get(url).query(&params))
    }
}

impl Warehouse for BigQueryClient {
    fn query(&self, sql: &str) -> Result<QueryResult> {
        let url = format!("{}/projects/{}/queries", API_BASE, self.project_id);
        let request = QueryRequest {
            query: sql,
            use_legacy_sql: false,
            timeout_ms: POLL_TIMEOUT_MS,
            location: self.location.as_deref(),
        };

        tracing::debug!(bytes = sql.len(), "submitting query");
        let mut response: QueryResponse = self.send(self.http.post(url).json(&request))?;

        let job = response.job_reference.clone();
        if let Some(job) = &job {
            tracing::info!(job_id = %job.job_id, "query job submitted");
        }

        while !response.job_complete {
            let job = job.as_ref().ok_or_else(|| {
                PipelineError::Response("incomplete job without a job reference".to_string())
            })?;
            tracing::debug!(job_id = %job.job_id, "waiting for job to finish");
            response = self.get_query_results(job, None)?;
        }

        let schema = response.schema.take().unwrap_or_default();
        let mut rows = convert_rows(&schema, std::mem::take(&mut response.rows));

        while let Some(page_token) = response.page_token.take() {
            let job = job.as_ref().ok_or_else(|| {
                PipelineError::Response("paged result without a job reference".to_string())
            })?;
            response = self.get_query_results(job, Some(&page_token))?;
            rows.extend(convert_rows(&schema, std::mem::take(&mut response.rows)));
        }

        tracing::debug!(rows = rows.len(), "query results materialized");
        Ok(rows)
    }
}

fn error_from_body(status: StatusCode, body: &str) -> PipelineError {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(parsed) => {
            let reason = parsed
                .error
                .errors
                .into_iter()
                .find_map(|e| e.reason)
                .unwrap_or_else(|| status.to_string());
            PipelineError::query(parsed.error.message, reason)
        }
        Err(_) => PipelineError::query(body.trim(), status.to_string()),
    }
}

fn convert_rows(schema: &TableSchema, rows: Vec<TableRow>) -> Vec<Row> {
    rows.into_iter()
        .map(|row| {
            Row::new(
                schema
                    .fields
                    .iter()
                    .zip(row.f)
                    .map(|(field, cell)| (field.name.clone(), convert_cell(field, cell.v)))
                    .collect(),
            )
        })
        .collect()
}

fn convert_cell(field: &FieldSchema, value: Value) -> Value {
    if value.is_null() {
        return Value::Null;
    }
    if field.mode.as_deref() == Some("REPEATED") {
        return match value {
            Value::Array(items) => Value::Array(
                items
                    .into_iter()
                    .map(|item| match item {
                        Value::Object(mut wrapper) => {
                            convert_scalar(field, wrapper.remove("v").unwrap_or(Value::Null))
                        }
                        other => convert_scalar(field, other),
                    })
                    .collect(),
            ),
            other => other,
        };
    }
    convert_scalar(field, value)
}

// Scalars arrive as strings; records as {"f": [{"v": ...}, ...]}.
fn convert_scalar(field: &FieldSchema, value: Value) -> Value {
    let text = match value {
        Value::String(text) => text,
        Value::Object(mut record) if matches!(field.field_type.as_str(), "RECORD" | "STRUCT") => {
            let cells = match record.remove("f") {
                Some(Value::Array(cells)) => cells,
                _ => Vec::new(),
            };
            let mut object = Map::new();
            for (child, cell) in field.fields.iter().zip(cells) {
                let inner = match cell {
                    Value::Object(mut wrapper) => wrapper.remove("v").unwrap_or(Value::Null),
                    other => other,
                };
                object.insert(child.name.clone(), convert_cell(child, inner));
            }
            return Value::Object(object);
        }
        other => return other,
    };

    match field.field_type.as_str() {
        "INTEGER" | "INT64" => text
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or(Value::String(text)),
        "FLOAT" | "FLOAT64" => text
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::String(text)),
        "BOOLEAN" | "BOOL" => match text.as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::String(text),
        },
        _ => Value::String(text),
    }
}

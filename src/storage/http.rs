//! REST implementation of RecordSource
//!
//! Talks to a backend answering with an envelope of the form
//! `{ "code": "200", "status": "Ok", "message": "...", "result": ... }`.
//! Request bodies wrap the record in a `parameter` object.

use crate::core::field::FieldValue;
use crate::core::record::Record;
use crate::core::source::RecordSource;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Paths of the operations of one resource, relative to the base URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpEndpoints {
    pub list: String,
    pub create: String,
    pub update: String,
    pub delete: String,
    pub delete_where: String,
}

impl HttpEndpoints {
    /// Conventional routes under `/{resource}`
    pub fn for_resource(resource: &str) -> Self {
        let resource = resource.trim_matches('/');
        Self {
            list: format!("/{}/list", resource),
            create: format!("/{}/register", resource),
            update: format!("/{}/update", resource),
            delete: format!("/{}/remove", resource),
            delete_where: format!("/{}/school/delete", resource),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    message: Option<String>,

    #[serde(default)]
    result: Value,
}

/// Record source backed by a REST API
#[derive(Clone)]
pub struct HttpRecordSource {
    client: Client,
    base_url: String,
    endpoints: HttpEndpoints,
    id_field: String,
}

impl HttpRecordSource {
    pub fn new(base_url: &str, endpoints: HttpEndpoints, id_field: &str) -> Self {
        Self::with_client(Client::new(), base_url, endpoints, id_field)
    }

    pub fn with_client(
        client: Client,
        base_url: &str,
        endpoints: HttpEndpoints,
        id_field: &str,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            endpoints,
            id_field: id_field.to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> Result<ApiResponse> {
        let url = self.url(path);
        tracing::debug!(%method, %url, "Sending record source request");

        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;
        read_envelope(response).await
    }
}

async fn read_envelope(response: Response) -> Result<ApiResponse> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiResponse>(&body)
            .ok()
            .and_then(|r| r.message)
            .unwrap_or(body);
        bail!("Status {}: {}", status, message);
    }

    response
        .json::<ApiResponse>()
        .await
        .context("Malformed response envelope")
}

/// Merge an object returned by the backend onto what was sent
fn merge_result(mut sent: Record, result: Value, id_field: &str) -> Result<Record> {
    match result {
        Value::Object(mut map) => {
            // Creation answers may only carry the new identity as "uuid"
            if !map.contains_key(id_field)
                && let Some(uuid) = map.remove("uuid")
            {
                map.insert(id_field.to_string(), uuid);
            }
            sent.merge(&Record::from_json(Value::Object(map))?);
            Ok(sent)
        }
        Value::Null => Ok(sent),
        other => bail!("Expected an object under 'result', got {}", other),
    }
}

#[async_trait]
impl RecordSource for HttpRecordSource {
    async fn list(&self) -> Result<Vec<Value>> {
        let response = self.send(Method::GET, &self.endpoints.list, None).await?;
        match response.result {
            Value::Array(items) => Ok(items),
            Value::Null => Ok(Vec::new()),
            other => bail!("Expected a list under 'result', got {}", other),
        }
    }

    async fn create(&self, record: Record) -> Result<Record> {
        let body = json!({ "parameter": record });
        let response = self
            .send(Method::POST, &self.endpoints.create, Some(body))
            .await?;
        merge_result(record, response.result, &self.id_field)
    }

    async fn update(&self, id: &str, patch: Record) -> Result<Record> {
        let mut parameter = patch;
        parameter.set(self.id_field.clone(), FieldValue::from(id));
        let body = json!({ "parameter": parameter });
        let response = self
            .send(Method::PATCH, &self.endpoints.update, Some(body))
            .await?;
        merge_result(parameter, response.result, &self.id_field)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let body = json!({ "parameter": { self.id_field.as_str(): id } });
        self.send(Method::DELETE, &self.endpoints.delete, Some(body))
            .await?;
        Ok(())
    }

    async fn delete_where(&self, field: &str, value: &str) -> Result<usize> {
        let body = json!({ field: value });
        let response = self
            .send(Method::DELETE, &self.endpoints.delete_where, Some(body))
            .await?;
        Ok(response
            .result
            .as_u64()
            .or_else(|| response.result.as_array().map(|a| a.len() as u64))
            .unwrap_or(0) as usize)
    }
}

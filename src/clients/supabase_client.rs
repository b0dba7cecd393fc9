use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;

use crate::{
    clients::{Backend, Filter},
    config::SupabaseConfig,
    error::BackendError,
};

/// PostgREST access to a Supabase project's tables.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    client: Client,
    rest_url: String,
    api_key: String,
}

impl SupabaseClient {
    pub fn new(config: &SupabaseConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .build()
            .map_err(|e| {
                BackendError::Unavailable(format!("could not build http client: {}", e))
            })?;

        Ok(Self {
            client,
            rest_url: format!("{}/rest/v1", config.url.trim_end_matches('/')),
            api_key: config.key.clone(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.rest_url, table)
    }

    fn query_pairs(filters: &[Filter]) -> Vec<(String, String)> {
        filters
            .iter()
            .map(|filter| match filter {
                Filter::Eq(column, value) => (column.clone(), format!("eq.{}", value)),
                Filter::IsNull(column) => (column.clone(), "is.null".to_string()),
                Filter::NotNull(column) => (column.clone(), "not.is.null".to_string()),
                Filter::ILike(column, pattern) => (column.clone(), format!("ilike.*{}*", pattern)),
                Filter::Limit(limit) => ("limit".to_string(), limit.to_string()),
            })
            .collect()
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn rows(&self, table: &str, request: RequestBuilder) -> Result<Vec<Value>, BackendError> {
        let resp = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;

        let status = resp.status();
        if matches!(
            status,
            StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT
        ) {
            return Err(BackendError::Unavailable(format!(
                "received status {} for table {}",
                status, table
            )));
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                table: table.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        resp.json::<Vec<Value>>().await.map_err(|e| BackendError::Decode {
            table: table.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl Backend for SupabaseClient {
    async fn select(
        &self,
        table: &str,
        columns: &str,
        filters: &[Filter],
    ) -> Result<Vec<Value>, BackendError> {
        let mut query = vec![("select".to_string(), columns.to_string())];
        query.extend(Self::query_pairs(filters));

        let request = self.client.get(self.table_url(table)).query(&query);
        self.rows(table, request).await
    }

    async fn update(
        &self,
        table: &str,
        filters: &[Filter],
        fields: Value,
    ) -> Result<Vec<Value>, BackendError> {
        let request = self
            .client
            .patch(self.table_url(table))
            .query(&Self::query_pairs(filters))
            .header("Prefer", "return=representation")
            .json(&fields);
        self.rows(table, request).await
    }

    async fn insert(&self, table: &str, fields: Value) -> Result<Vec<Value>, BackendError> {
        let request = self
            .client
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(&fields);
        self.rows(table, request).await
    }
}

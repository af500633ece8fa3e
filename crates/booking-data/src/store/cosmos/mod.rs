//! Reqwest-backed Cosmos DB booking store.
//!
//! This adapter owns transport details only: master-key signing, request
//! headers, continuation paging, and HTTP status mapping. Retries and
//! throttling recovery are left to the caller.

mod auth;
mod dto;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::Serialize;
use tracing::{debug, info};

use self::auth::{MasterKey, http_date};
use self::dto::{
    CreateContainerDto, CreateDatabaseDto, PartitionKeyDefinitionDto, PatchDto, QueryDto,
    QueryPageDto,
};
use super::BookingStore;
use crate::booking::{BookingDocument, BookingStatus, CancellationPatch, DocumentKey};
use crate::error::StoreError;

const API_VERSION: &str = "2018-12-31";
const DEFAULT_DATABASE: &str = "AirBnB";
const DEFAULT_CONTAINER: &str = "bookings";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_PAGE_SIZE: usize = 1000;

const HEADER_DATE: &str = "x-ms-date";
const HEADER_VERSION: &str = "x-ms-version";
const HEADER_PARTITION_KEY: &str = "x-ms-documentdb-partitionkey";
const HEADER_IS_UPSERT: &str = "x-ms-documentdb-is-upsert";
const HEADER_IS_QUERY: &str = "x-ms-documentdb-isquery";
const HEADER_CROSS_PARTITION: &str = "x-ms-documentdb-query-enablecrosspartition";
const HEADER_MAX_ITEMS: &str = "x-ms-max-item-count";
const HEADER_CONTINUATION: &str = "x-ms-continuation";

/// Connection settings for a Cosmos DB account.
#[derive(Debug, Clone)]
pub struct CosmosSettings {
    /// Account endpoint, e.g. `https://<account>.documents.azure.com:443/`.
    pub endpoint: Url,
    /// Base64 account key.
    pub key: String,
    /// Database name, created if absent.
    pub database: String,
    /// Container name, created if absent and partitioned by `/booking_id`.
    pub container: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl CosmosSettings {
    /// Settings for the default `AirBnB` database and `bookings` container.
    pub fn new(endpoint: Url, key: impl Into<String>) -> Self {
        Self {
            endpoint,
            key: key.into(),
            database: DEFAULT_DATABASE.to_owned(),
            container: DEFAULT_CONTAINER.to_owned(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Booking store backed by the Cosmos DB SQL REST API.
pub struct CosmosBookingStore {
    client: Client,
    endpoint: Url,
    key: MasterKey,
    database: String,
    container: String,
    clock: Arc<dyn Clock>,
}

impl CosmosBookingStore {
    /// Build an adapter; no request is sent until [`Self::ensure_container`]
    /// or a store operation runs.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unauthorized`] for an undecodable key, or
    /// [`StoreError::Connection`] when the HTTP client cannot be built.
    pub fn new(settings: CosmosSettings, clock: Arc<dyn Clock>) -> Result<Self, StoreError> {
        let key = MasterKey::decode(&settings.key)?;
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(map_transport_error)?;
        Ok(Self {
            client,
            endpoint: settings.endpoint,
            key,
            database: settings.database,
            container: settings.container,
            clock,
        })
    }

    /// Create the database and container when they do not already exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] for any failure other than "already exists".
    pub async fn ensure_container(&self) -> Result<(), StoreError> {
        let created_db = self
            .create_if_absent(
                "dbs",
                "",
                "dbs",
                &CreateDatabaseDto { id: &self.database },
            )
            .await?;
        let database_link = format!("dbs/{}", self.database);
        let created_container = self
            .create_if_absent(
                "colls",
                &database_link,
                &format!("{database_link}/colls"),
                &CreateContainerDto {
                    id: &self.container,
                    partition_key: PartitionKeyDefinitionDto::default(),
                },
            )
            .await?;
        info!(
            database = %self.database,
            container = %self.container,
            created_db,
            created_container,
            "cosmos container ready"
        );
        Ok(())
    }

    async fn create_if_absent<B: Serialize + Sync>(
        &self,
        resource_type: &str,
        resource_link: &str,
        path: &str,
        body: &B,
    ) -> Result<bool, StoreError> {
        let response = self
            .request(Method::POST, resource_type, resource_link, path)?
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;
        match response.status() {
            StatusCode::CONFLICT => Ok(false),
            status if status.is_success() => Ok(true),
            _ => Err(error_from_response(response).await),
        }
    }

    fn collection_link(&self) -> String {
        format!("dbs/{}/colls/{}", self.database, self.container)
    }

    fn request(
        &self,
        method: Method,
        resource_type: &str,
        resource_link: &str,
        path: &str,
    ) -> Result<RequestBuilder, StoreError> {
        let url = self
            .endpoint
            .join(path)
            .map_err(|error| StoreError::invalid_request(format!("bad resource path '{path}': {error}")))?;
        let date = http_date(self.clock.utc());
        let authorization =
            self.key
                .authorization(method.as_str(), resource_type, resource_link, &date)?;

        let mut headers = HeaderMap::new();
        headers.insert(reqwest::header::AUTHORIZATION, header_value(&authorization)?);
        headers.insert(HEADER_DATE, header_value(&date)?);
        headers.insert(HEADER_VERSION, HeaderValue::from_static(API_VERSION));
        Ok(self.client.request(method, url).headers(headers))
    }
}

#[async_trait]
impl BookingStore for CosmosBookingStore {
    async fn upsert(&self, document: &BookingDocument) -> Result<(), StoreError> {
        let link = self.collection_link();
        let response = self
            .request(Method::POST, "docs", &link, &format!("{link}/docs"))?
            .header(HEADER_IS_UPSERT, "True")
            .header(HEADER_PARTITION_KEY, partition_key_header(&document.booking_id)?)
            .json(document)
            .send()
            .await
            .map_err(map_transport_error)?;
        ensure_success(response).await?;
        debug!(booking_id = %document.booking_id, "upserted booking");
        Ok(())
    }

    async fn query_by_status(
        &self,
        status: BookingStatus,
        limit: usize,
    ) -> Result<Vec<DocumentKey>, StoreError> {
        let link = self.collection_link();
        let body = serde_json::to_vec(&QueryDto::keys_with_status(status.as_str()))
            .map_err(|error| StoreError::internal(format!("encode query: {error}")))?;
        let page_size = limit.clamp(1, MAX_PAGE_SIZE).to_string();

        let mut keys = Vec::new();
        let mut continuation: Option<String> = None;
        while keys.len() < limit {
            let mut request = self
                .request(Method::POST, "docs", &link, &format!("{link}/docs"))?
                .header(CONTENT_TYPE, "application/query+json")
                .header(HEADER_IS_QUERY, "True")
                .header(HEADER_CROSS_PARTITION, "True")
                .header(HEADER_MAX_ITEMS, page_size.as_str())
                .body(body.clone());
            if let Some(token) = continuation.as_deref() {
                request = request.header(HEADER_CONTINUATION, header_value(token)?);
            }

            let sent = request.send().await.map_err(map_transport_error)?;
            let response = ensure_success(sent).await?;
            continuation = response
                .headers()
                .get(HEADER_CONTINUATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);
            let page: QueryPageDto = response
                .json()
                .await
                .map_err(|error| StoreError::decode(format!("invalid query page: {error}")))?;

            let remaining = limit - keys.len();
            keys.extend(
                page.documents
                    .into_iter()
                    .take(remaining)
                    .map(DocumentKey::from),
            );
            if continuation.is_none() {
                break;
            }
        }
        Ok(keys)
    }

    async fn patch(&self, key: &DocumentKey, patch: &CancellationPatch) -> Result<(), StoreError> {
        let link = format!("{}/docs/{}", self.collection_link(), key.id);
        let body = serde_json::to_vec(&PatchDto::from(patch))
            .map_err(|error| StoreError::internal(format!("encode patch: {error}")))?;
        let response = self
            .request(Method::PATCH, "docs", &link, &link)?
            .header(CONTENT_TYPE, "application/json_patch+json")
            .header(HEADER_PARTITION_KEY, partition_key_header(&key.partition_key)?)
            .body(body)
            .send()
            .await
            .map_err(map_transport_error)?;
        ensure_success(response).await?;
        debug!(booking_id = %key.partition_key, "patched booking");
        Ok(())
    }
}

fn partition_key_header(value: &str) -> Result<HeaderValue, StoreError> {
    let encoded = serde_json::to_string(&[value])
        .map_err(|error| StoreError::internal(format!("encode partition key: {error}")))?;
    header_value(&encoded)
}

fn header_value(value: &str) -> Result<HeaderValue, StoreError> {
    HeaderValue::from_str(value)
        .map_err(|error| StoreError::invalid_request(format!("invalid header value: {error}")))
}

async fn ensure_success(response: Response) -> Result<Response, StoreError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(error_from_response(response).await)
    }
}

async fn error_from_response(response: Response) -> StoreError {
    let status = response.status();
    let body = response.bytes().await.unwrap_or_default();
    map_status_error(status, body.as_ref())
}

fn map_transport_error(error: reqwest::Error) -> StoreError {
    StoreError::connection(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> StoreError {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), preview)
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::unauthorized(message),
        StatusCode::NOT_FOUND => StoreError::not_found(message),
        StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => StoreError::conflict(message),
        StatusCode::TOO_MANY_REQUESTS => StoreError::rate_limited(message),
        _ if status.is_client_error() => StoreError::invalid_request(message),
        _ => StoreError::connection(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network Cosmos helpers.

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::unauthorized(StatusCode::UNAUTHORIZED, "Unauthorized")]
    #[case::forbidden(StatusCode::FORBIDDEN, "Unauthorized")]
    #[case::not_found(StatusCode::NOT_FOUND, "NotFound")]
    #[case::conflict(StatusCode::CONFLICT, "Conflict")]
    #[case::throttled(StatusCode::TOO_MANY_REQUESTS, "RateLimited")]
    #[case::bad_request(StatusCode::BAD_REQUEST, "InvalidRequest")]
    #[case::server_error(StatusCode::SERVICE_UNAVAILABLE, "Connection")]
    fn maps_http_statuses_to_store_errors(#[case] status: StatusCode, #[case] expected: &str) {
        let error = map_status_error(status, br#"{"code": "Whatever", "message": "details"}"#);
        let matched = match expected {
            "Unauthorized" => matches!(error, StoreError::Unauthorized { .. }),
            "NotFound" => matches!(error, StoreError::NotFound { .. }),
            "Conflict" => matches!(error, StoreError::Conflict { .. }),
            "RateLimited" => matches!(error, StoreError::RateLimited { .. }),
            "InvalidRequest" => matches!(error, StoreError::InvalidRequest { .. }),
            "Connection" => matches!(error, StoreError::Connection { .. }),
            _ => panic!("unsupported test expectation: {expected}"),
        };
        assert!(matched, "{status} should map to {expected}, got {error:?}");
    }

    #[test]
    fn status_message_includes_compacted_body() {
        let error = map_status_error(StatusCode::TOO_MANY_REQUESTS, b"{\n  \"code\": \"429\"\n}");
        assert_eq!(
            error.to_string(),
            "store throttled the request: status 429: { \"code\": \"429\" }"
        );
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(500);
        let preview = body_preview(body.as_bytes());
        assert_eq!(preview.chars().count(), 163);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn partition_key_header_is_a_json_array() {
        let value = partition_key_header("abc-123").expect("header");
        assert_eq!(value.to_str().expect("ascii"), r#"["abc-123"]"#);
    }

    #[test]
    fn settings_default_to_bookings_container() {
        let endpoint = Url::parse("https://example.documents.azure.com:443/").expect("url");
        let settings = CosmosSettings::new(endpoint, "a2V5");
        assert_eq!(settings.database, "AirBnB");
        assert_eq!(settings.container, "bookings");
    }

    #[test]
    fn rejects_undecodable_key() {
        let endpoint = Url::parse("https://example.documents.azure.com:443/").expect("url");
        let result = CosmosBookingStore::new(
            CosmosSettings::new(endpoint, "%%%"),
            Arc::new(mockable::DefaultClock),
        );
        assert!(matches!(result, Err(StoreError::Unauthorized { .. })));
    }
}

//! Request and response bodies for the Cosmos DB REST API.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::booking::{CancellationPatch, DocumentKey};

/// Partition key path of the bookings container.
pub(super) const PARTITION_KEY_PATH: &str = "/booking_id";

pub(super) const KEYS_BY_STATUS_QUERY: &str =
    "SELECT c.id, c.booking_id FROM c WHERE c.status = @status";

#[derive(Debug, Serialize)]
pub(super) struct CreateDatabaseDto<'a> {
    pub(super) id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CreateContainerDto<'a> {
    pub(super) id: &'a str,
    pub(super) partition_key: PartitionKeyDefinitionDto,
}

#[derive(Debug, Serialize)]
pub(super) struct PartitionKeyDefinitionDto {
    pub(super) paths: [&'static str; 1],
    pub(super) kind: &'static str,
    pub(super) version: u8,
}

impl Default for PartitionKeyDefinitionDto {
    fn default() -> Self {
        Self {
            paths: [PARTITION_KEY_PATH],
            kind: "Hash",
            version: 2,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct QueryDto<'a> {
    pub(super) query: &'static str,
    pub(super) parameters: [QueryParameterDto<'a>; 1],
}

#[derive(Debug, Serialize)]
pub(super) struct QueryParameterDto<'a> {
    pub(super) name: &'static str,
    pub(super) value: &'a str,
}

impl<'a> QueryDto<'a> {
    pub(super) const fn keys_with_status(status: &'a str) -> Self {
        Self {
            query: KEYS_BY_STATUS_QUERY,
            parameters: [QueryParameterDto {
                name: "@status",
                value: status,
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct QueryPageDto {
    #[serde(rename = "Documents", default)]
    pub(super) documents: Vec<KeyProjectionDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct KeyProjectionDto {
    pub(super) id: String,
    pub(super) booking_id: String,
}

impl From<KeyProjectionDto> for DocumentKey {
    fn from(dto: KeyProjectionDto) -> Self {
        Self {
            id: dto.id,
            partition_key: dto.booking_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct PatchDto {
    pub(super) operations: Vec<PatchOperationDto>,
}

#[derive(Debug, Serialize)]
pub(super) struct PatchOperationDto {
    pub(super) op: &'static str,
    pub(super) path: &'static str,
    pub(super) value: serde_json::Value,
}

impl PatchOperationDto {
    fn add(path: &'static str, value: impl Into<serde_json::Value>) -> Self {
        Self {
            op: "add",
            path,
            value: value.into(),
        }
    }
}

impl From<&CancellationPatch> for PatchDto {
    fn from(patch: &CancellationPatch) -> Self {
        Self {
            operations: vec![
                PatchOperationDto::add("/status", patch.status.as_str()),
                PatchOperationDto::add("/cancellation_ts", timestamp(patch.cancellation_ts)),
                PatchOperationDto::add(
                    "/cancellation_reason",
                    patch.cancellation_reason.as_str(),
                ),
                PatchOperationDto::add("/updated_at", timestamp(patch.updated_at)),
            ],
        }
    }
}

/// Renders timestamps the way serde writes them on upserted documents.
fn timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

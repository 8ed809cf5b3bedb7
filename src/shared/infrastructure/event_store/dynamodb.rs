// DynamoDB implementation of the EventStore port.
//
// Table layout
// - "Entity ID" (S) partition key, "Version" (N) sort key.
// - "Event Type" (S) and "Data" (S) carry the payload untouched.

use crate::shared::infrastructure::event_store::{EventRecord, EventStore, EventStoreError};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::config::Region;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use std::collections::HashMap;

const ENTITY_ID: &str = "Entity ID";
const VERSION: &str = "Version";
const EVENT_TYPE: &str = "Event Type";
const DATA: &str = "Data";

pub struct DynamoDbEventStore {
    client: Client,
    table: String,
}

impl DynamoDbEventStore {
    pub fn new(client: Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    /// Build a client from the default credential chain (the `AWS_*` environment
    /// variables in practice) pinned to `region`.
    pub async fn connect(region: impl Into<String>, table: impl Into<String>) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.into()))
            .load()
            .await;
        tracing::info!("DynamoDB client configured");
        Self::new(Client::new(&config), table)
    }
}

fn parse_version(item: &HashMap<String, AttributeValue>) -> Result<i64, EventStoreError> {
    match item.get(VERSION) {
        Some(AttributeValue::N(raw)) if !raw.is_empty() => raw.parse::<i64>().map_err(|err| {
            EventStoreError::MalformedRecord(format!("unparsable version {raw:?}: {err}"))
        }),
        _ => Err(EventStoreError::MalformedRecord(
            "received an item without a version".into(),
        )),
    }
}

#[async_trait]
impl EventStore for DynamoDbEventStore {
    async fn latest_version(&self, stream_id: &str) -> Result<Option<i64>, EventStoreError> {
        tracing::debug!(stream_id, "querying DynamoDB");
        let output = self
            .client
            .query()
            .table_name(&self.table)
            .consistent_read(true)
            .expression_attribute_names("#entity", ENTITY_ID)
            .expression_attribute_names("#version", VERSION)
            .expression_attribute_values(":entity", AttributeValue::S(stream_id.to_owned()))
            .key_condition_expression("#entity = :entity")
            .projection_expression("#version")
            .scan_index_forward(false)
            .limit(1)
            .send()
            .await
            .map_err(|err| EventStoreError::Backend(DisplayErrorContext(err).to_string()))?;

        let mut latest = None;
        for item in output.items() {
            let version = parse_version(item)?;
            latest = latest.max(Some(version));
        }
        Ok(latest)
    }

    async fn put(&self, record: &EventRecord) -> Result<(), EventStoreError> {
        tracing::debug!(stream_id = %record.stream_id, version = record.version, "putting item to DynamoDB");
        self.client
            .put_item()
            .table_name(&self.table)
            .item(ENTITY_ID, AttributeValue::S(record.stream_id.clone()))
            .item(VERSION, AttributeValue::N(record.version.to_string()))
            .item(EVENT_TYPE, AttributeValue::S(record.event_type.clone()))
            .item(DATA, AttributeValue::S(record.data.clone()))
            .condition_expression("attribute_not_exists(#version)")
            .expression_attribute_names("#version", VERSION)
            .send()
            .await
            .map_err(|err| {
                let err = err.into_service_error();
                if err.is_conditional_check_failed_exception() {
                    EventStoreError::VersionExists {
                        stream_id: record.stream_id.clone(),
                        version: record.version,
                    }
                } else {
                    EventStoreError::Backend(DisplayErrorContext(err).to_string())
                }
            })?;
        Ok(())
    }
}

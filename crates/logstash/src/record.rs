// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Wire schema for records shipped to Logstash.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::message::Message;

const PARSE_ERROR_PREFIX: &str = "ERROR: Failed to parse json:";

/// A JSON object written to the ingestion endpoint, one per message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogstashRecord {
    #[serde(rename = "docker.name")]
    pub name: String,
    #[serde(rename = "docker.id")]
    pub id: String,
    #[serde(rename = "docker.image")]
    pub image: String,
    #[serde(rename = "docker.hostname")]
    pub hostname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Result of turning a raw payload into the record's `data` field.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Empty,
    Parsed(Value),
    /// The payload was not JSON; carries the diagnostic that replaces it.
    Degraded(String),
}

impl Payload {
    pub fn parse(raw: &str) -> Self {
        if raw.is_empty() {
            return Payload::Empty;
        }
        match serde_json::from_str::<Value>(raw) {
            // a literal `null` is dropped from the record, same as an empty payload
            Ok(Value::Null) => Payload::Empty,
            Ok(value) => Payload::Parsed(value),
            Err(e) => Payload::Degraded(format!("{PARSE_ERROR_PREFIX} {e}")),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Payload::Degraded(_))
    }

    fn into_value(self) -> Option<Value> {
        match self {
            Payload::Empty => None,
            Payload::Parsed(value) => Some(value),
            Payload::Degraded(diagnostic) => Some(Value::String(diagnostic)),
        }
    }
}

impl LogstashRecord {
    pub fn new(message: &Message, payload: Payload, token: Option<&str>) -> Self {
        let container = &message.container;
        LogstashRecord {
            name: container.name.clone(),
            id: container.id.clone(),
            image: container.image.clone(),
            hostname: container.hostname.clone(),
            data: payload.into_value(),
            token: token.filter(|t| !t.is_empty()).map(str::to_string),
        }
    }

    pub fn from_message(message: &Message, token: Option<&str>) -> Self {
        Self::new(message, Payload::parse(&message.data), token)
    }

    pub fn to_vec(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

/// Identity of the container a log line came from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    pub name: String,
    pub id: String,
    pub image: String,
    pub hostname: String,
}

/// One log line delivered by the host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Raw payload, usually JSON text
    #[serde(default)]
    pub data: String,
    pub container: Container,
}

impl Message {
    pub fn new(data: impl Into<String>, container: Container) -> Self {
        Self {
            data: data.into(),
            container,
        }
    }
}

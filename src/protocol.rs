//! Public HTTP DTOs (serde ready).

use serde::Serialize;

use crate::descriptor::FieldPartition;

/// Reply to `OPTIONS /get_question`.
#[derive(Debug, Serialize)]
pub struct DiscoveryOut {
    pub allowed_methods: Vec<&'static str>,
    pub parameters: DiscoveryParameters,
}

#[derive(Debug, Serialize)]
pub struct DiscoveryParameters {
    #[serde(rename = "GET")]
    pub get: FieldPartition,
    #[serde(rename = "POST")]
    pub post: FieldPartition,
}

impl DiscoveryOut {
    pub fn new(fields: FieldPartition) -> Self {
        Self {
            allowed_methods: vec!["GET", "POST"],
            parameters: DiscoveryParameters { get: fields.clone(), post: fields },
        }
    }
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

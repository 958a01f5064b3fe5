//! Treatment (service menu item) records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::resource::Resource;

/// A bookable service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Treatment {
    /// Treatment identifier.
    #[serde(rename = "ID", skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Length of the service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub treatment_duration: Option<i64>,

    /// List price as sent by the vendor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Value>,

    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for Treatment {
    const KIND: &'static str = "Treatment";
}

//! Sale (order) records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::resource::Resource;

/// A completed or in-progress sale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Sale {
    /// Sale identifier.
    #[serde(rename = "ID", skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Buying customer.
    #[serde(rename = "CustomerID", skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<i64>,

    /// Whether the sale was saved before completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_in_progress: Option<bool>,

    /// Completion date, in the vendor's date encoding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_completed: Option<String>,

    /// Payment date, in the vendor's date encoding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_paid: Option<String>,

    /// Status object as sent by the vendor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,

    /// Total before taxes, a vendor money object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_before_taxes: Option<Value>,

    /// Line items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<Value>>,

    /// Whether the sale is complete.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,

    /// Order number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,

    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for Sale {
    const KIND: &'static str = "Sale";
}

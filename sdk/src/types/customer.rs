//! Customer records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::resource::Resource;

/// A customer of a location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Customer {
    /// Customer identifier.
    #[serde(rename = "ID", skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Home location.
    #[serde(rename = "LocationID", skip_serializing_if = "Option::is_none")]
    pub location_id: Option<i64>,

    /// First name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    /// Last name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    /// Email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Primary phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_phone: Option<String>,

    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for Customer {
    const KIND: &'static str = "Customer";
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_customer_round_trips_vendor_keys() {
        let customer = Customer {
            id: Some(1),
            location_id: Some(123),
            first_name: Some("Jim".to_string()),
            ..Default::default()
        };

        let value = serde_json::to_value(&customer).expect("serialize");
        assert_eq!(
            value,
            json!({"ID": 1, "LocationID": 123, "FirstName": "Jim"})
        );
    }
}

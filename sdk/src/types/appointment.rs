//! Appointment records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::customer::Customer;
use super::resource::Resource;

/// A booked appointment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Appointment {
    /// Appointment identifier.
    #[serde(rename = "ID", skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Location the appointment is booked at.
    #[serde(rename = "LocationID", skip_serializing_if = "Option::is_none")]
    pub location_id: Option<i64>,

    /// Human-facing confirmation number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_number: Option<String>,

    /// Start time, in the vendor's date encoding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date_time: Option<String>,

    /// End time, in the vendor's date encoding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date_time: Option<String>,

    /// Status object as sent by the vendor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,

    /// The booked customer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<Customer>,

    /// Whether the appointment has been cancelled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_cancelled: Option<bool>,

    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for Appointment {
    const KIND: &'static str = "Appointment";
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::resource::map_record;

    #[test]
    fn test_appointment_from_vendor_json() {
        let appointment: Appointment = map_record(json!({
            "ID": 9001,
            "LocationID": 3749,
            "BookingNumber": "A-17",
            "Customer": {"ID": 5, "FirstName": "Jim"},
            "IsCancelled": false,
            "Room": "Blue"
        }))
        .expect("appointment");

        assert_eq!(appointment.id, Some(9001));
        assert_eq!(appointment.location_id, Some(3749));
        assert_eq!(appointment.booking_number.as_deref(), Some("A-17"));
        assert_eq!(
            appointment.customer.and_then(|c| c.first_name).as_deref(),
            Some("Jim")
        );
        assert_eq!(appointment.extra.get("Room"), Some(&json!("Blue")));
    }
}

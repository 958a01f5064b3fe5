//! Customer-facing endpoint helpers.

use serde_json::{json, Map, Value};

use super::http::BookerClient;
use super::request::to_json_body;
use crate::error::{BookerError, Result};
use crate::types::{Appointment, Customer, Mapped};

/// Path for booking a treatment appointment.
pub const CREATE_APPOINTMENT_PATH: &str = "/appointment/create";

/// Path for booking a class appointment.
pub const CREATE_CLASS_APPOINTMENT_PATH: &str = "/class_appointment/create";

/// Merges `overrides` into `defaults`. Keys in `overrides` win.
#[must_use]
pub fn build_params(mut defaults: Map<String, Value>, overrides: Map<String, Value>) -> Map<String, Value> {
    defaults.extend(overrides);
    defaults
}

fn single(mapped: Mapped<Appointment>) -> Result<Appointment> {
    match mapped {
        Mapped::One(appointment) => Ok(appointment),
        Mapped::Many(mut many) if many.len() == 1 => many
            .pop()
            .ok_or_else(|| BookerError::Deserialization("Appointment: empty result".to_string())),
        Mapped::Many(many) => Err(BookerError::Deserialization(format!(
            "Appointment: expected one record, got {}",
            many.len()
        ))),
        Mapped::Raw(raw) => Err(BookerError::Deserialization(format!(
            "Appointment: unexpected payload {}",
            raw
        ))),
    }
}

impl BookerClient {
    /// Books `available_time` (a time slot as returned by availability
    /// search) for `customer` at `location_id`.
    ///
    /// `params` are merged over the generated body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not a single
    /// appointment.
    pub async fn create_appointment(
        &self,
        location_id: i64,
        available_time: Value,
        customer: &Customer,
        params: Map<String, Value>,
    ) -> Result<Appointment> {
        let mut body = Map::new();
        body.insert("LocationID".to_string(), json!(location_id));
        body.insert(
            "ItineraryTimeSlotList".to_string(),
            json!([{ "TreatmentTimeSlots": [available_time] }]),
        );
        body.insert("Customer".to_string(), to_json_body(customer)?);

        let body = build_params(body, params);
        single(self.post(CREATE_APPOINTMENT_PATH, &body).await?)
    }

    /// Books `class_instance_id` for `customer` at `location_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not a single
    /// appointment.
    pub async fn create_class_appointment(
        &self,
        location_id: i64,
        class_instance_id: i64,
        customer: &Customer,
        params: Map<String, Value>,
    ) -> Result<Appointment> {
        let mut body = Map::new();
        body.insert("LocationID".to_string(), json!(location_id));
        body.insert("ClassInstanceID".to_string(), json!(class_instance_id));
        body.insert("Customer".to_string(), to_json_body(customer)?);

        let body = build_params(body, params);
        single(self.post(CREATE_CLASS_APPOINTMENT_PATH, &body).await?)
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::client::http::tests::test_client;

    fn customer() -> Customer {
        Customer {
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
            email: Some("ada@example.com".to_string()),
            ..Customer::default()
        }
    }

    #[test]
    fn test_build_params_overrides_win() {
        let mut defaults = Map::new();
        defaults.insert("LocationID".to_string(), json!(1));
        defaults.insert("Notes".to_string(), json!("default"));
        let mut overrides = Map::new();
        overrides.insert("Notes".to_string(), json!("custom"));
        overrides.insert("SendEmail".to_string(), json!(false));

        let merged = build_params(defaults, overrides);
        assert_eq!(merged.get("LocationID"), Some(&json!(1)));
        assert_eq!(merged.get("Notes"), Some(&json!("custom")));
        assert_eq!(merged.get("SendEmail"), Some(&json!(false)));
    }

    #[tokio::test]
    async fn test_create_appointment() {
        let mock_server = MockServer::start().await;
        let slot = json!({"StartDateTime": "2026-10-20T10:00:00", "TreatmentID": 3});

        Mock::given(method("POST"))
            .and(path("/appointment/create"))
            .and(body_partial_json(json!({
                "LocationID": 10257,
                "ItineraryTimeSlotList": [{"TreatmentTimeSlots": [slot]}],
                "Customer": {"FirstName": "Ada", "Email": "ada@example.com"},
                "Notes": "first visit",
                "access_token": "token"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Appointment": {"ID": 55, "BookingNumber": "B-55"}
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let (client, _) = test_client(mock_server.uri());
        let mut params = Map::new();
        params.insert("Notes".to_string(), json!("first visit"));

        let appointment = client
            .create_appointment(10257, slot, &customer(), params)
            .await
            .expect("appointment");

        assert_eq!(appointment.id, Some(55));
        assert_eq!(appointment.booking_number.as_deref(), Some("B-55"));
    }

    #[tokio::test]
    async fn test_create_class_appointment() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/class_appointment/create"))
            .and(body_partial_json(json!({
                "LocationID": 10257,
                "ClassInstanceID": 99,
                "Customer": {"LastName": "Lovelace"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Results": [{"ID": 56}]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let (client, _) = test_client(mock_server.uri());
        let appointment = client
            .create_class_appointment(10257, 99, &customer(), Map::new())
            .await
            .expect("appointment");

        assert_eq!(appointment.id, Some(56));
    }

    #[test]
    fn test_single_rejects_raw() {
        let err = single(Mapped::Raw(json!("ok"))).expect_err("raw");
        assert!(matches!(err, BookerError::Deserialization(_)));
    }
}

//! Wire types of the external booking API.
//!
//! Field names mirror the API's contract exactly; the external service is
//! the system of record and these values are never persisted locally.

use serde::{Deserialize, Serialize};

/// Payload for creating a booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub name: String,
    pub mobile: String,
    pub email: String,
    pub service_type: String,
    pub number_of_packages: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approximate_weight_kg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_type: Option<String>,
    pub pickup_address_line_1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_address_line_2: Option<String>,
    pub pickup_pincode: String,
    pub delivery_address_line_1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_address_line_2: Option<String>,
    pub delivery_pincode: String,
}

/// Server acknowledgement carrying the order id used for all subsequent
/// tracking and payment calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingResponse {
    pub success: bool,
    pub orderid: String,
}

/// One entry in a shipment's history. The sequence order is
/// server-defined and treated as already chronological.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackingStatusItem {
    pub status: String,
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Tracking lookup result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingResponse {
    pub orderid: String,
    pub name: String,
    pub mobile: String,
    pub track: Vec<TrackingStatusItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_request_omits_empty_optionals() {
        let request = BookingRequest {
            name: "Asha".into(),
            mobile: "9876543210".into(),
            email: "asha@example.com".into(),
            service_type: "parcel".into(),
            number_of_packages: 2,
            approximate_weight_kg: None,
            vehicle_type: None,
            pickup_address_line_1: "12 MG Road".into(),
            pickup_address_line_2: None,
            pickup_pincode: "400001".into(),
            delivery_address_line_1: "4 Park St".into(),
            delivery_address_line_2: None,
            delivery_pincode: "700016".into(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("vehicle_type").is_none());
        assert_eq!(json["number_of_packages"], 2);
    }

    #[test]
    fn test_tracking_response_tolerates_minimal_items() {
        let response: TrackingResponse = serde_json::from_str(
            r#"{
                "orderid": "ORD-1",
                "name": "Asha",
                "mobile": "919876543210",
                "track": [
                    {"status": "Booked", "time": "2025-01-04 10:00"},
                    {"status": "In transit", "time": "2025-01-05 08:30", "location": "Pune"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(response.track.len(), 2);
        assert_eq!(response.track[0].location, None);
        assert_eq!(response.track[1].location.as_deref(), Some("Pune"));
    }
}

//! Wire types for the `gatehouse.v1` package.
//!
//! Messages are plain prost structs that also derive serde, so the same type
//! travels over gRPC and through the HTTP/JSON gateway. Service stubs
//! (`greeter_server`, `greeter_client`, `health_server`, `health_client`) are
//! generated by `build.rs`.

use serde::{Deserialize, Serialize};

/// Request for `Greeter/Greet`.
#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct GreetRequest {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
}

/// Reply for `Greeter/Greet`.
#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct GreetReply {
    #[prost(string, tag = "1")]
    pub message: ::prost::alloc::string::String,
}

/// Request for `Health/Check` and `Health/Watch`.
#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthCheckRequest {
    #[prost(string, tag = "1")]
    pub service: ::prost::alloc::string::String,
}

/// Response for `Health/Check` and `Health/Watch`.
#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthCheckResponse {
    #[prost(enumeration = "ServingStatus", tag = "1")]
    #[serde(with = "serving_status_name")]
    pub status: i32,
}

/// Tri-state serving status (plus `SERVICE_UNKNOWN`), numbered as in
/// `grpc.health.v1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ServingStatus {
    Unknown = 0,
    Serving = 1,
    NotServing = 2,
    ServiceUnknown = 3,
}

impl ServingStatus {
    /// Proto enum value name, as rendered in JSON.
    pub fn as_str_name(&self) -> &'static str {
        match self {
            ServingStatus::Unknown => "UNKNOWN",
            ServingStatus::Serving => "SERVING",
            ServingStatus::NotServing => "NOT_SERVING",
            ServingStatus::ServiceUnknown => "SERVICE_UNKNOWN",
        }
    }

    /// Parse a proto enum value name.
    pub fn from_str_name(value: &str) -> Option<Self> {
        match value {
            "UNKNOWN" => Some(ServingStatus::Unknown),
            "SERVING" => Some(ServingStatus::Serving),
            "NOT_SERVING" => Some(ServingStatus::NotServing),
            "SERVICE_UNKNOWN" => Some(ServingStatus::ServiceUnknown),
            _ => None,
        }
    }
}

impl HealthCheckResponse {
    pub fn with_status(status: ServingStatus) -> Self {
        Self {
            status: status.into(),
        }
    }
}

/// JSON carries the enum by name; numbers are accepted on input.
mod serving_status_name {
    use serde::{Deserialize, Deserializer, Serializer, de};

    use super::ServingStatus;

    pub fn serialize<S: Serializer>(value: &i32, serializer: S) -> Result<S::Ok, S::Error> {
        match ServingStatus::try_from(*value) {
            Ok(status) => serializer.serialize_str(status.as_str_name()),
            Err(_) => serializer.serialize_i32(*value),
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Name(String),
        Number(i32),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Number(n) => Ok(n),
            Repr::Name(name) => ServingStatus::from_str_name(&name)
                .map(i32::from)
                .ok_or_else(|| de::Error::custom(format!("unknown serving status: {name}"))),
        }
    }
}

include!(concat!(env!("OUT_DIR"), "/gatehouse.v1.Greeter.rs"));
include!(concat!(env!("OUT_DIR"), "/gatehouse.v1.Health.rs"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_status_serializes_by_name() {
        let response = HealthCheckResponse::with_status(ServingStatus::Serving);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "SERVING" }));
    }

    #[test]
    fn health_status_accepts_name_or_number() {
        let by_name: HealthCheckResponse =
            serde_json::from_str(r#"{"status":"NOT_SERVING"}"#).unwrap();
        assert_eq!(by_name.status(), ServingStatus::NotServing);

        let by_number: HealthCheckResponse = serde_json::from_str(r#"{"status":1}"#).unwrap();
        assert_eq!(by_number.status(), ServingStatus::Serving);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let request: GreetRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.name, "");
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let request: GreetRequest =
            serde_json::from_str(r#"{"name":"World","extra":true}"#).unwrap();
        assert_eq!(request.name, "World");
    }
}

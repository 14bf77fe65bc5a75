//! The gateway route table, the wire types and the published API description
//! must all agree with `proto/gatehouse/v1/service.proto`.

use std::collections::BTreeSet;

use gatehouse::gateway::{ServeMux, services};
use gatehouse::proto::{
    GreetReply, GreetRequest, HealthCheckRequest, HealthCheckResponse, ServingStatus,
};
use serde::Serialize;
use serde_json::Value;
use tonic::transport::Endpoint;

const PROTO: &str = include_str!("../proto/gatehouse/v1/service.proto");
const SWAGGER: &str = include_str!("../gen/openapiv2/service.swagger.json");

/// `(method, template)` pairs from the `google.api.http` options, in order.
fn proto_bindings() -> Vec<(String, String)> {
    PROTO
        .lines()
        .map(str::trim)
        .filter_map(|line| {
            let (verb, rest) = line.split_once(':')?;
            if !matches!(verb, "get" | "post" | "put" | "patch" | "delete") {
                return None;
            }
            Some((verb.to_uppercase(), rest.trim().trim_matches('"').to_string()))
        })
        .collect()
}

/// Field names declared in `message <name> { ... }`.
fn proto_fields(message: &str) -> BTreeSet<String> {
    let header = format!("message {message} {{");
    PROTO
        .lines()
        .map(str::trim)
        .skip_while(|line| *line != header)
        .skip(1)
        .take_while(|line| *line != "}")
        .filter(|line| line.ends_with(';'))
        .filter_map(|line| line.split_whitespace().nth(1).map(str::to_string))
        .collect()
}

/// Value names declared in `enum <name> { ... }`.
fn proto_enum_values(name: &str) -> Vec<String> {
    let header = format!("enum {name} {{");
    PROTO
        .lines()
        .map(str::trim)
        .skip_while(|line| *line != header)
        .skip(1)
        .take_while(|line| *line != "}")
        .filter_map(|line| line.split_whitespace().next().map(str::to_string))
        .collect()
}

fn swagger() -> Value {
    serde_json::from_str(SWAGGER).unwrap()
}

fn swagger_properties(definition: &str) -> BTreeSet<String> {
    swagger()["definitions"][definition]["properties"]
        .as_object()
        .unwrap()
        .keys()
        .cloned()
        .collect()
}

fn json_keys(message: &impl Serialize) -> BTreeSet<String> {
    serde_json::to_value(message)
        .unwrap()
        .as_object()
        .unwrap()
        .keys()
        .cloned()
        .collect()
}

async fn registered_routes() -> Vec<(String, String)> {
    let channel = Endpoint::from_static("http://127.0.0.1:1").connect_lazy();
    let mut mux = ServeMux::new();
    services::register_all(&mut mux, &channel).unwrap();
    mux.routes()
        .map(|(method, template, _)| (method.to_string(), template.to_string()))
        .collect()
}

#[tokio::test]
async fn gateway_routes_follow_proto_bindings() {
    assert_eq!(registered_routes().await, proto_bindings());
}

#[tokio::test]
async fn api_description_documents_every_route() {
    let documented: BTreeSet<(String, String)> = swagger()["paths"]
        .as_object()
        .unwrap()
        .iter()
        .flat_map(|(path, operations)| {
            operations
                .as_object()
                .unwrap()
                .keys()
                .map(|verb| (verb.to_uppercase(), path.clone()))
                .collect::<Vec<_>>()
        })
        .collect();
    let routed: BTreeSet<_> = registered_routes().await.into_iter().collect();
    assert_eq!(documented, routed);
}

#[test]
fn message_fields_match_proto_and_api_description() {
    let cases: [(&str, &str, BTreeSet<String>); 4] = [
        ("GreetRequest", "v1GreetRequest", json_keys(&GreetRequest::default())),
        ("GreetReply", "v1GreetReply", json_keys(&GreetReply::default())),
        ("HealthCheckRequest", "v1HealthCheckRequest", json_keys(&HealthCheckRequest::default())),
        ("HealthCheckResponse", "v1HealthCheckResponse", json_keys(&HealthCheckResponse::default())),
    ];
    for (message, definition, keys) in cases {
        assert_eq!(proto_fields(message), keys, "{message} fields");
        if swagger()["definitions"].get(definition).is_some() {
            assert_eq!(swagger_properties(definition), keys, "{definition} properties");
        }
    }
}

#[test]
fn serving_status_names_match_proto_and_api_description() {
    let names: Vec<String> = (0..=3_i32)
        .map(|n| ServingStatus::try_from(n).unwrap().as_str_name().to_string())
        .collect();
    assert_eq!(proto_enum_values("ServingStatus"), names);

    let documented: Vec<String> = swagger()["definitions"]["v1ServingStatus"]["enum"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    assert_eq!(documented, names);
}

use tonic_build::manual::{Builder, Method, Service};

const CODEC: &str = "tonic::codec::ProstCodec";

fn main() {
    // The contract lives in `proto/gatehouse/v1/service.proto`. Message types
    // are hand-written prost structs in `src/proto.rs` that mirror it, so only
    // the service stubs are generated here and no protoc install is needed.
    let greeter = Service::builder()
        .name("Greeter")
        .package("gatehouse.v1")
        .comment("Greets callers by name.")
        .method(
            Method::builder()
                .name("greet")
                .route_name("Greet")
                .input_type("crate::proto::GreetRequest")
                .output_type("crate::proto::GreetReply")
                .codec_path(CODEC)
                .build(),
        )
        .build();

    let health = Service::builder()
        .name("Health")
        .package("gatehouse.v1")
        .comment("Reports serving status, shaped after grpc.health.v1.")
        .method(
            Method::builder()
                .name("check")
                .route_name("Check")
                .input_type("crate::proto::HealthCheckRequest")
                .output_type("crate::proto::HealthCheckResponse")
                .codec_path(CODEC)
                .build(),
        )
        .method(
            Method::builder()
                .name("watch")
                .route_name("Watch")
                .input_type("crate::proto::HealthCheckRequest")
                .output_type("crate::proto::HealthCheckResponse")
                .codec_path(CODEC)
                .server_streaming()
                .build(),
        )
        .build();

    Builder::new().compile(&[greeter, health]);
}

use super::*;

fn parse(toml: &str) -> BlobvaultConfig {
    toml::from_str(toml).unwrap()
}

#[test]
fn empty_file_yields_defaults() {
    let config = parse("");
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.server.shutdown_timeout_seconds, 30);
    assert_eq!(config.server.max_blob_bytes, 10 * 1024 * 1024);
    assert!(config.auth.jwt_secret.is_none());
    assert_eq!(config.auth.leeway_seconds, 0);
    assert_eq!(config.auth.token_ttl_seconds, 86_400);
    assert_eq!(config.storage.backend, "memory");
    assert_eq!(config.storage.namespace_root, "blobs");
    assert_eq!(config.storage.timeout_ms, 5_000);
    assert_eq!(config.storage.max_retries, 0);
    assert!(config.blob.allowed_content_types.is_empty());
    assert!(!config.telemetry.enabled);
}

#[test]
fn full_config() {
    let config = parse(
        r#"
        [server]
        host = "0.0.0.0"
        port = 9000
        max_blob_bytes = 1024

        [auth]
        jwt_secret = "s3cret"
        issuer = "OctoGallery"
        leeway_seconds = 5

        [storage]
        backend = "s3"
        namespace_root = "gallery"
        timeout_ms = 2500
        max_retries = 3
        retry_base_ms = 50
        region = "eu-central-1"
        endpoint_url = "http://minio:9000"
        force_path_style = true

        [blob]
        allowed_content_types = ["image/png", "image/jpeg"]
        "#,
    );
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.server.max_blob_bytes, 1024);
    assert_eq!(config.auth.issuer.as_deref(), Some("OctoGallery"));
    assert_eq!(config.auth.leeway_seconds, 5);
    assert_eq!(config.storage.backend, "s3");
    assert_eq!(config.storage.timeout(), std::time::Duration::from_millis(2500));
    assert_eq!(config.storage.retry_policy().max_retries, 3);
    assert_eq!(
        config.storage.retry_policy().base,
        std::time::Duration::from_millis(50)
    );

    let s3 = config.storage.s3_config();
    assert_eq!(s3.region, "eu-central-1");
    assert_eq!(s3.endpoint_url.as_deref(), Some("http://minio:9000"));
    assert!(s3.force_path_style);
    assert_eq!(s3.operation_timeout_ms, 2500);

    assert_eq!(config.blob.policy().allowed(), ["image/png", "image/jpeg"]);
    assert!(config.validate().is_ok());
}

#[test]
fn zero_retries_disables_retry() {
    let config = parse("[storage]\nretry_base_ms = 500\n");
    assert_eq!(
        config.storage.retry_policy(),
        blobvault_gateway::RetryPolicy::disabled()
    );
}

#[test]
fn validate_requires_secret_and_issuer() {
    let config = parse("[auth]\nissuer = \"OctoGallery\"\n");
    assert!(matches!(config.validate(), Err(ServerError::Config(msg)) if msg.contains("jwt_secret")));

    let config = parse("[auth]\njwt_secret = \"s\"\n");
    assert!(matches!(config.validate(), Err(ServerError::Config(msg)) if msg.contains("issuer")));

    let config = parse("[auth]\njwt_secret = \"\"\nissuer = \"i\"\n");
    assert!(config.validate().is_err());
}

#[test]
fn validate_rejects_empty_namespace_root() {
    let config = parse(
        "[auth]\njwt_secret = \"s\"\nissuer = \"i\"\n[storage]\nnamespace_root = \"\"\n",
    );
    assert!(
        matches!(config.validate(), Err(ServerError::Config(msg)) if msg.contains("namespace_root"))
    );
}

#[test]
fn auth_debug_redacts_secret() {
    let config = parse("[auth]\njwt_secret = \"super-secret-value\"\nissuer = \"i\"\n");
    let debug = format!("{:?}", config.auth);
    assert!(debug.contains("[REDACTED]"));
    assert!(!debug.contains("super-secret-value"));
}

#[test]
fn telemetry_custom_config() {
    let config: TelemetryConfig = toml::from_str(
        r#"
        enabled = true
        endpoint = "http://collector:4318"
        protocol = "http"
        sample_ratio = 0.25

        [resource_attributes]
        "deployment.environment" = "staging"
        "#,
    )
    .unwrap();
    assert!(config.enabled);
    assert_eq!(config.protocol, OtlpProtocol::Http);
    assert_eq!(config.service_name, "blobvault");
    assert!((config.sample_ratio - 0.25).abs() < f64::EPSILON);
    assert_eq!(
        config.resource_attributes.get("deployment.environment").map(String::as_str),
        Some("staging")
    );
}

#[test]
fn telemetry_defaults_to_grpc() {
    let config = parse("");
    assert_eq!(config.telemetry.protocol, OtlpProtocol::Grpc);
    assert_eq!(config.telemetry.endpoint, "http://localhost:4317");
    assert_eq!(config.telemetry.timeout_seconds, 10);
}

#[test]
fn unknown_telemetry_protocol_is_rejected() {
    let result: Result<TelemetryConfig, _> = toml::from_str("protocol = \"carrier-pigeon\"\n");
    assert!(result.is_err());
}

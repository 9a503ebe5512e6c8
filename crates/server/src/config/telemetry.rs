use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;

/// Wire protocol used to ship spans to the collector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtlpProtocol {
    /// OTLP over gRPC (collector port 4317).
    #[default]
    Grpc,
    /// OTLP over HTTP with protobuf bodies (collector port 4318).
    Http,
}

impl fmt::Display for OtlpProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Grpc => "grpc",
            Self::Http => "http",
        })
    }
}

/// Span export settings. Export is off unless `enabled = true`.
///
/// ```toml
/// [telemetry]
/// enabled = true
/// endpoint = "http://localhost:4317"
/// protocol = "grpc"
/// ```
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub enabled: bool,
    /// Collector endpoint.
    pub endpoint: String,
    /// Reported as `service.name`.
    pub service_name: String,
    /// Share of traces kept, `0.0` to `1.0`.
    pub sample_ratio: f64,
    pub protocol: OtlpProtocol,
    /// Exporter request timeout.
    pub timeout_seconds: u64,
    /// Added to every exported span's resource.
    pub resource_attributes: HashMap<String, String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: "http://localhost:4317".to_owned(),
            service_name: "blobvault".to_owned(),
            sample_ratio: 1.0,
            protocol: OtlpProtocol::default(),
            timeout_seconds: 10,
            resource_attributes: HashMap::new(),
        }
    }
}

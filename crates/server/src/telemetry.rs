//! Tracing subscriber setup with optional OTLP span export.
//!
//! The `fmt` layer filtered by `RUST_LOG` (default `info`) is always
//! installed. With `[telemetry] enabled = true` spans from the HTTP layer,
//! the gateway and the backends are also exported to a collector.

use std::time::Duration;

use opentelemetry::trace::{TraceError, TracerProvider};
use opentelemetry::{KeyValue, global};
use opentelemetry_otlp::{SpanExporter, WithExportConfig};
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::trace::{BatchSpanProcessor, Sampler, SdkTracerProvider};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{OtlpProtocol, TelemetryConfig};

/// Keeps the tracer provider alive. Call [`TelemetryGuard::shutdown`] before
/// exit to flush buffered spans.
pub struct TelemetryGuard {
    provider: Option<SdkTracerProvider>,
}

impl TelemetryGuard {
    pub fn shutdown(mut self) {
        let Some(provider) = self.provider.take() else {
            return;
        };
        if let Err(e) = provider.shutdown() {
            warn!(error = %e, "tracer provider shutdown failed");
        }
    }
}

/// Install the global tracing subscriber.
///
/// An exporter that cannot be built leaves the server with fmt-only output.
pub fn init(config: &TelemetryConfig) -> TelemetryGuard {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (provider, export_error) = match config.enabled.then(|| tracer_provider(config)) {
        Some(Ok(provider)) => (Some(provider), None),
        Some(Err(e)) => (None, Some(e)),
        None => (None, None),
    };

    let otel_layer = provider
        .as_ref()
        .map(|p| tracing_opentelemetry::layer().with_tracer(p.tracer("blobvault")));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(otel_layer)
        .init();

    if let Some(e) = export_error {
        // Bad telemetry settings must not keep the server from starting.
        error!(
            error = %e,
            endpoint = %config.endpoint,
            protocol = %config.protocol,
            "could not build OTLP exporter, span export disabled"
        );
    } else if provider.is_some() {
        info!(
            endpoint = %config.endpoint,
            protocol = %config.protocol,
            sample_ratio = config.sample_ratio,
            "span export enabled"
        );
    }

    TelemetryGuard { provider }
}

/// Build the provider and register it as the global one.
fn tracer_provider(config: &TelemetryConfig) -> Result<SdkTracerProvider, TraceError> {
    let provider = SdkTracerProvider::builder()
        .with_span_processor(BatchSpanProcessor::builder(exporter(config)?).build())
        .with_sampler(sampler_for(config.sample_ratio))
        .with_resource(resource(config))
        .build();
    global::set_tracer_provider(provider.clone());
    Ok(provider)
}

fn exporter(config: &TelemetryConfig) -> Result<SpanExporter, TraceError> {
    let timeout = Duration::from_secs(config.timeout_seconds);
    match config.protocol {
        OtlpProtocol::Grpc => SpanExporter::builder()
            .with_tonic()
            .with_endpoint(&config.endpoint)
            .with_timeout(timeout)
            .build(),
        OtlpProtocol::Http => SpanExporter::builder()
            .with_http()
            .with_endpoint(&config.endpoint)
            .with_timeout(timeout)
            .build(),
    }
}

fn resource(config: &TelemetryConfig) -> Resource {
    let host = std::env::var("HOSTNAME").or_else(|_| std::env::var("HOST")).ok();
    let attributes = [
        KeyValue::new("service.name", config.service_name.clone()),
        KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
    ]
    .into_iter()
    .chain(host.map(|h| KeyValue::new("host.name", h)))
    .chain(
        config
            .resource_attributes
            .iter()
            .map(|(k, v)| KeyValue::new(k.clone(), v.clone())),
    );
    Resource::builder().with_attributes(attributes).build()
}

/// Out-of-range ratios saturate; NaN samples nothing.
fn sampler_for(ratio: f64) -> Sampler {
    if ratio.is_nan() || ratio <= 0.0 {
        Sampler::AlwaysOff
    } else if ratio >= 1.0 {
        Sampler::AlwaysOn
    } else {
        Sampler::TraceIdRatioBased(ratio)
    }
}

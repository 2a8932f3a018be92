use crate::config::{Config, TelemetryConfig};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::Error;
use anyhow::Context;
use opentelemetry::sdk::trace::Tracer;
use opentelemetry::sdk::Resource;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use tonic::metadata::{MetadataKey, MetadataMap};
use tracing::Span;
use tracing_actix_web::{DefaultRootSpanBuilder, RootSpan, RootSpanBuilder, TracingLogger};
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Registry;

pub struct CampusRootSpanBuilder;

impl RootSpanBuilder for CampusRootSpanBuilder {
    fn on_request_start(request: &ServiceRequest) -> Span {
        tracing_actix_web::root_span!(request, entity_id = tracing::field::Empty)
    }

    fn on_request_end<B: actix_web::body::MessageBody>(
        span: Span,
        outcome: &Result<ServiceResponse<B>, Error>,
    ) {
        DefaultRootSpanBuilder::on_request_end(span, outcome);
    }
}

pub fn create_middleware() -> TracingLogger<CampusRootSpanBuilder> {
    TracingLogger::<CampusRootSpanBuilder>::new()
}

/// Tags the request's root span with the id of the course, user or transaction it addresses.
pub fn record_entity(root_span: &RootSpan, entity_id: i64) {
    root_span.record("entity_id", entity_id);
}

pub fn create_opentelemetry_layer<S>(
    service_name: &'static str,
    config: &TelemetryConfig,
) -> Result<OpenTelemetryLayer<S, Tracer>, anyhow::Error>
where
    S: tracing::Subscriber + for<'span> LookupSpan<'span>,
{
    let mut metadata_map = MetadataMap::with_capacity(config.headers.len());
    for (name, value) in &config.headers {
        let key = MetadataKey::from_bytes(name.as_bytes())
            .with_context(|| format!("Invalid telemetry header name {}", name))?;
        let value = value
            .parse()
            .with_context(|| format!("Invalid value for telemetry header {}", name))?;
        metadata_map.insert(key, value);
    }
    let exporter = opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint(config.endpoint.clone())
        .with_metadata(metadata_map);

    let tracer = opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_trace_config(
            opentelemetry::sdk::trace::config().with_resource(Resource::new(vec![KeyValue::new(
                "service.name",
                service_name,
            )])),
        )
        .with_exporter(exporter)
        .install_simple()
        .context("Unable to create tracer")?;
    let telemetry_layer = tracing_opentelemetry::layer().with_tracer(tracer);
    Ok(telemetry_layer)
}

pub fn init_subscriber(service_name: &'static str, config: &Config) -> Result<(), anyhow::Error> {
    let level_filter = config.level_filter()?;
    let telemetry_layer = match &config.telemetry {
        Some(telemetry_config) => Some(create_opentelemetry_layer(
            service_name,
            telemetry_config,
        )?),
        None => None,
    };

    let subscriber = Registry::default()
        .with(level_filter)
        .with(tracing_subscriber::fmt::Layer::default())
        .with(telemetry_layer);
    tracing::subscriber::set_global_default(subscriber)
        .context("Unable to set up tracing subscriber")?;
    Ok(())
}

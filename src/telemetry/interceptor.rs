use crate::common::RequestId;
use std::fmt::Debug;
use tracing::field::{Field, Visit};
use tracing::span::Attributes;
use tracing::Id;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;

const REQ_ID: &str = "request_id";

// Custom layer for adding request-ids to the logs
//
// Copies a span's `request_id` attribute into the span's extensions at
// creation time, where other layers can look it up by type.
#[derive(Debug, Clone)]
pub struct RequestIdLayer;

impl<S> tracing_subscriber::Layer<S> for RequestIdLayer
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let span = ctx.span(id).expect("Span not found, this is a bug");

        // Iterate on given span attributes to check if we have a request_id to assign
        let mut visitor = RequestIdVisitor::default();
        attrs.record(&mut visitor);

        if let Some(request_id) = visitor.request_id {
            span.extensions_mut().insert(RequestId(request_id));
        }
    }
}

// A visitor to pull the request id out of span attributes.
#[derive(Default)]
struct RequestIdVisitor {
    request_id: Option<String>,
}

impl Visit for RequestIdVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == REQ_ID {
            self.request_id = Some(value.to_owned());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        if field.name() == REQ_ID {
            self.request_id = Some(format!("{:?}", value));
        }
    }
}

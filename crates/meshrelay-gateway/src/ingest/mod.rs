//! Ingest: policy gate, decode, observe, fan out.

pub mod pipeline;
pub mod policy;

pub use pipeline::{Delivery, EventSink, IngestOutcome, Ingestor};
pub use policy::{IngestPolicy, PolicyDecision, TopicFilter};

pub mod pipeline;
pub mod reducers;
pub mod source;

pub use pipeline::{IngestPipeline, IngestSummary};
pub use source::{EventSource, InMemoryEventSource, NdjsonEventSource, SourceError};

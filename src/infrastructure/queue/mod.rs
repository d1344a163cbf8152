pub mod metadata_queue;
pub mod metadata_writer;

pub use metadata_queue::{MetadataFetchRequest, MetadataQueue};
pub use metadata_writer::MetadataWriter;

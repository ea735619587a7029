pub mod adapter;
pub mod classify;
pub mod merge;
pub mod normalize;
pub mod pipeline;
pub mod progress;
pub mod resolve;

pub use adapter::{ObservationSource, OverpassAdapter};
pub use classify::{Classification, Taxonomy};
pub use merge::merge_observation;
pub use pipeline::IngestPipeline;
pub use progress::{LogSink, NullSink, ProgressSink};
pub use resolve::DuplicateResolver;

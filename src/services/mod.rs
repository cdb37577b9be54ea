pub mod affinity;
pub mod classifier;
pub mod codec;
pub mod collection;
pub mod providers;
pub mod scoring;
pub mod title_search;

pub use collection::RatingCollectionManager;
pub use scoring::{DeltaSource, FixedDelta, RandomDelta};

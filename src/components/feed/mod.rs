mod actor;
mod cache;
mod handle;
pub mod models;
mod source;

pub use cache::FeedCache;
pub use handle::FeedHandle;
pub use models::FeedSpec;
pub use source::{FeedSource, HttpFeedSource};

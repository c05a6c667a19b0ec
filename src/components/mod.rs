// Export components
pub mod feed;
pub mod ics;
pub mod shifts;

// Re-export the feed handle and the aggregator
pub use feed::FeedHandle;
pub use shifts::ShiftAggregator;

// Pipeline ingestion: fetching the sheet feed

pub mod feed;

pub use feed::{decode_feed, into_rows, source_from_config, FeedSource, FileFeedSource, HttpFeedSource};

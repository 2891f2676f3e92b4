//! YouTube Data API v3 client library.
//!
//! This module wraps the read-only, API-key-authenticated parts of the YouTube Data API v3 that
//! are useful for collecting metadata: searching, looking up videos and channels, and listing the
//! top-level comments on a video. Every operation returns a [`ResultTable`](crate::ResultTable)
//! of flat, typed rows rather than the nested JSON the service sends.
//!
//! # Operations
//!
//! | Operation                                  | Endpoint               | Pages                 |
//! |--------------------------------------------|------------------------|-----------------------|
//! | [`YouTubeClient::search`]                  | `search.list`          | follows tokens        |
//! | [`YouTubeClient::channel_videos`]          | `search.list`          | follows tokens        |
//! | [`YouTubeClient::video`] / `videos`        | `videos.list`          | 50 ids per request    |
//! | [`YouTubeClient::channel`] / `channels`    | `channels.list`        | 50 ids per request    |
//! | [`YouTubeClient::top_level_comments`]      | `commentThreads.list`  | one page, at most 100 |
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use youtube_scraper::youtube_api::{SearchCriteria, YouTubeClient};
//!
//! # async fn example() -> eyre::Result<()> {
//! let client = YouTubeClient::new("my-api-key", reqwest::Client::new());
//!
//! let criteria = SearchCriteria {
//!     required_results_count: 25,
//!     ..SearchCriteria::new("rust programming")
//! };
//! let results = client.search(&criteria).await?;
//! for result in &results {
//!     println!("{} {}: {}", result.kind, result.id, result.title);
//! }
//! # Ok(())
//! # }
//! ```

pub mod channels;
pub mod client;
pub mod comments;
pub mod error;
pub mod search;
pub mod types;
pub mod videos;

#[cfg(test)]
pub(crate) mod mock;

// Re-export main types for convenience
pub use client::{DEFAULT_BASE_URL, YouTubeClient};
pub use error::{ApiError, InvalidCriteria};
pub use types::{Page, PageInfo, PageRequest, PagedStream, Thumbnail, Thumbnails};

pub use search::{
    Order, ResultKind, SafeSearch, SearchCriteria, SearchRecord, SearchScope, VideoDefinition,
    VideoDuration,
};

pub use videos::{Video, VideoRecord, VideoStatistics};

pub use channels::{Channel, ChannelRecord, ChannelSnippet};

pub use comments::{CommentOrder, CommentRecord, TextFormat};

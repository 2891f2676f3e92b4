//! Search and metadata lookups against the YouTube Data API v3, flattened into tables.
//!
//! [`YouTubeClient`] issues the requests and follows pagination; each operation returns a
//! [`ResultTable`] whose rows implement [`Record`], so they can be read as typed structs or
//! flattened into [`FlatRecord`]s with normalized column names.

pub mod config;
pub mod table;
pub mod youtube_api;

pub use table::{Cell, FlatRecord, Record, ResultTable};
pub use youtube_api::YouTubeClient;

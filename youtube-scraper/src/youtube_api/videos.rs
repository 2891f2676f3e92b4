//! YouTube Videos API types and flattening.

use crate::table::{Cell, Record};
use crate::youtube_api::types::{PageInfo, Thumbnails, iso8601_duration, string_count};
use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Response structure for the `videos.list` API call.
///
/// Contains a list of [`Video`] resources that match the request criteria,
/// along with pagination information in [`PageInfo`]. Identifiers that don't resolve are simply
/// missing from `items`.
///
/// See: <https://developers.google.com/youtube/v3/docs/videos/list>
#[derive(Debug, Serialize, Deserialize)]
pub struct VideoListResponse {
    /// The value will be `youtube#videoListResponse`.
    pub kind: String,
    #[serde(default)]
    pub items: VecDeque<Video>,
    #[serde(rename = "pageInfo", default)]
    pub page_info: PageInfo,
}

/// A `video` resource represents a YouTube video.
///
/// See: <https://developers.google.com/youtube/v3/docs/videos#resource>
#[derive(Debug, Serialize, Deserialize)]
pub struct Video {
    /// The ID that YouTube uses to uniquely identify the video.
    pub id: String,
    pub snippet: VideoSnippet,
    #[serde(rename = "contentDetails")]
    pub content_details: VideoContentDetails,
    /// Absent when the statistics part wasn't requested or the owner disabled them.
    #[serde(default)]
    pub statistics: VideoStatistics,
}

/// Basic details about a video.
///
/// See: <https://developers.google.com/youtube/v3/docs/videos#snippet>
#[derive(Debug, Serialize, Deserialize)]
pub struct VideoSnippet {
    #[serde(rename = "publishedAt")]
    pub published_at: Timestamp,
    #[serde(rename = "channelId")]
    pub channel_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub thumbnails: Thumbnails,
    #[serde(rename = "channelTitle", default)]
    pub channel_title: String,
    /// Keyword tags. The API omits the field when the video has none.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// See: <https://developers.google.com/youtube/v3/docs/videos#contentDetails>
#[derive(Debug, Serialize, Deserialize)]
pub struct VideoContentDetails {
    /// Length of the video, sent as an ISO 8601 duration such as `PT15M33S`.
    #[serde(default, deserialize_with = "iso8601_duration")]
    pub duration: Option<SignedDuration>,
}

/// Statistics about the video.
///
/// Counts arrive as decimal strings and are parsed here. Any of them may be missing: likes can be
/// hidden, comments disabled, and dislikes are only visible to the video owner.
///
/// See: <https://developers.google.com/youtube/v3/docs/videos#statistics>
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct VideoStatistics {
    #[serde(rename = "viewCount", default, deserialize_with = "string_count")]
    pub view_count: Option<u64>,
    #[serde(rename = "likeCount", default, deserialize_with = "string_count")]
    pub like_count: Option<u64>,
    #[serde(rename = "dislikeCount", default, deserialize_with = "string_count")]
    pub dislike_count: Option<u64>,
    /// Deprecated by the API; always 0 when present.
    #[serde(rename = "favoriteCount", default, deserialize_with = "string_count")]
    pub favorite_count: Option<u64>,
    #[serde(rename = "commentCount", default, deserialize_with = "string_count")]
    pub comment_count: Option<u64>,
}

/// The watch page URL for a video.
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

/// One flattened video.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoRecord {
    pub id: String,
    pub published_at: Timestamp,
    pub title: String,
    pub url: String,
    pub description: String,
    pub duration: Option<SignedDuration>,
    pub views: Option<u64>,
    pub likes: Option<u64>,
    pub dislikes: Option<u64>,
    pub favorites: Option<u64>,
    pub comments: Option<u64>,
    pub tags: Vec<String>,
    pub thumbnails: Thumbnails,
    pub channel_id: String,
    pub channel_title: String,
}

impl From<Video> for VideoRecord {
    fn from(video: Video) -> Self {
        let Video {
            id,
            snippet,
            content_details,
            statistics,
        } = video;
        Self {
            url: watch_url(&id),
            id,
            published_at: snippet.published_at,
            title: snippet.title,
            description: snippet.description,
            duration: content_details.duration,
            views: statistics.view_count,
            likes: statistics.like_count,
            dislikes: statistics.dislike_count,
            favorites: statistics.favorite_count,
            comments: statistics.comment_count,
            tags: snippet.tags,
            thumbnails: snippet.thumbnails,
            channel_id: snippet.channel_id,
            channel_title: snippet.channel_title,
        }
    }
}

impl Record for VideoRecord {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "published_at",
        "title",
        "url",
        "description",
        "duration",
        "views",
        "likes",
        "dislikes",
        "favorites",
        "comments",
        "tags",
        "thumbnails",
        "channel_id",
        "channel_title",
    ];

    fn cells(&self) -> Vec<Cell> {
        vec![
            self.id.clone().into(),
            self.published_at.into(),
            self.title.clone().into(),
            self.url.clone().into(),
            self.description.clone().into(),
            self.duration.into(),
            self.views.into(),
            self.likes.into(),
            self.dislikes.into(),
            self.favorites.into(),
            self.comments.into(),
            Cell::blob(&self.tags),
            Cell::blob(&self.thumbnails),
            self.channel_id.clone().into(),
            self.channel_title.clone().into(),
        ]
    }
}

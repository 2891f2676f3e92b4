//! YouTube Comment Threads API types and flattening.

use crate::table::{Cell, Record};
use crate::youtube_api::types::PageInfo;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// The most comment threads `commentThreads.list` will return in one page.
pub const MAX_COMMENT_PAGE_SIZE: u32 = 100;

/// How comment threads are ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommentOrder {
    /// Newest first.
    #[default]
    Time,
    Relevance,
}

impl CommentOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            CommentOrder::Time => "time",
            CommentOrder::Relevance => "relevance",
        }
    }
}

/// Format of the comment text in `text_display`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextFormat {
    #[default]
    Html,
    PlainText,
}

impl TextFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            TextFormat::Html => "html",
            TextFormat::PlainText => "plainText",
        }
    }
}

/// Clamps a requested comment count into what a single `commentThreads.list` page can return.
pub fn clamp_comment_count(requested: u32) -> u32 {
    requested.clamp(1, MAX_COMMENT_PAGE_SIZE)
}

/// Response structure for the `commentThreads.list` API call.
///
/// See: <https://developers.google.com/youtube/v3/docs/commentThreads/list>
#[derive(Debug, Serialize, Deserialize)]
pub struct CommentThreadListResponse {
    /// The value will be `youtube#commentThreadListResponse`.
    pub kind: String,
    #[serde(default)]
    pub items: VecDeque<CommentThread>,
    #[serde(rename = "pageInfo", default)]
    pub page_info: PageInfo,
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

/// A top-level comment and, optionally, its replies.
///
/// See: <https://developers.google.com/youtube/v3/docs/commentThreads#resource>
#[derive(Debug, Serialize, Deserialize)]
pub struct CommentThread {
    pub id: String,
    pub snippet: CommentThreadSnippet,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommentThreadSnippet {
    #[serde(rename = "videoId")]
    pub video_id: Option<String>,
    #[serde(rename = "topLevelComment")]
    pub top_level_comment: Comment,
    #[serde(rename = "totalReplyCount", default)]
    pub total_reply_count: u64,
}

/// See: <https://developers.google.com/youtube/v3/docs/comments#resource>
#[derive(Debug, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub snippet: CommentSnippet,
}

/// See: <https://developers.google.com/youtube/v3/docs/comments#snippet>
#[derive(Debug, Serialize, Deserialize)]
pub struct CommentSnippet {
    #[serde(rename = "textDisplay")]
    pub text_display: String,
    #[serde(rename = "authorDisplayName")]
    pub author_display_name: String,
    #[serde(rename = "authorProfileImageUrl")]
    pub author_profile_image_url: Option<String>,
    #[serde(rename = "authorChannelUrl")]
    pub author_channel_url: Option<String>,
    /// Missing for authors without a channel, e.g. deleted accounts.
    #[serde(rename = "authorChannelId")]
    pub author_channel_id: Option<AuthorChannelId>,
    #[serde(rename = "likeCount", default)]
    pub like_count: u64,
    #[serde(rename = "publishedAt")]
    pub published_at: Timestamp,
    #[serde(rename = "updatedAt")]
    pub updated_at: Timestamp,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthorChannelId {
    pub value: String,
}

/// One flattened top-level comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentRecord {
    pub id: String,
    pub published_at: Timestamp,
    pub updated_at: Timestamp,
    pub text: String,
    pub author: String,
    pub likes: u64,
    pub author_image: Option<String>,
    pub author_channel_id: Option<String>,
    pub author_channel_url: Option<String>,
}

impl From<CommentThread> for CommentRecord {
    fn from(thread: CommentThread) -> Self {
        let Comment { id, snippet } = thread.snippet.top_level_comment;
        Self {
            id,
            published_at: snippet.published_at,
            updated_at: snippet.updated_at,
            text: snippet.text_display,
            author: snippet.author_display_name,
            likes: snippet.like_count,
            author_image: snippet.author_profile_image_url,
            author_channel_id: snippet.author_channel_id.map(|c| c.value),
            author_channel_url: snippet.author_channel_url,
        }
    }
}

impl Record for CommentRecord {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "published_at",
        "updated_at",
        "text",
        "author",
        "likes",
        "author_image",
        "author_channel_id",
        "author_channel_url",
    ];

    fn cells(&self) -> Vec<Cell> {
        vec![
            self.id.clone().into(),
            self.published_at.into(),
            self.updated_at.into(),
            self.text.clone().into(),
            self.author.clone().into(),
            self.likes.into(),
            self.author_image.clone().into(),
            self.author_channel_id.clone().into(),
            self.author_channel_url.clone().into(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn clamps_into_single_page() {
        assert_eq!(clamp_comment_count(150), 100);
        assert_eq!(clamp_comment_count(100), 100);
        assert_eq!(clamp_comment_count(20), 20);
        assert_eq!(clamp_comment_count(0), 1);
    }

    #[test]
    fn flattens_top_level_comment() {
        let thread: CommentThread = serde_json::from_value(serde_json::json!({
            "kind": "youtube#commentThread",
            "id": "thread1",
            "snippet": {
                "videoId": "vid",
                "topLevelComment": {
                    "kind": "youtube#comment",
                    "id": "comment1",
                    "snippet": {
                        "textDisplay": "first!",
                        "textOriginal": "first!",
                        "authorDisplayName": "@someone",
                        "authorProfileImageUrl": "https://yt3.ggpht.com/a",
                        "authorChannelUrl": "http://www.youtube.com/@someone",
                        "authorChannelId": {"value": "UCsomeone"},
                        "likeCount": 4,
                        "publishedAt": "2023-05-06T07:08:09Z",
                        "updatedAt": "2023-05-06T07:10:00Z"
                    }
                },
                "canReply": true,
                "totalReplyCount": 2,
                "isPublic": true
            }
        }))
        .unwrap();
        let record = CommentRecord::from(thread);
        assert_eq!(record.id, "comment1");
        assert_eq!(record.text, "first!");
        assert_eq!(record.likes, 4);
        assert_eq!(record.author_channel_id.as_deref(), Some("UCsomeone"));
        assert!(record.updated_at > record.published_at);
    }

    #[test]
    fn author_without_channel() {
        let thread: CommentThread = serde_json::from_value(serde_json::json!({
            "id": "thread2",
            "snippet": {
                "topLevelComment": {
                    "id": "comment2",
                    "snippet": {
                        "textDisplay": "hi",
                        "authorDisplayName": "",
                        "publishedAt": "2023-05-06T07:08:09Z",
                        "updatedAt": "2023-05-06T07:08:09Z"
                    }
                }
            }
        }))
        .unwrap();
        let flat = CommentRecord::from(thread).to_flat();
        assert_eq!(flat.get("author_channel_id"), Some(&Cell::Null));
        assert_eq!(flat.get("author_channel_url"), Some(&Cell::Null));
        assert_eq!(flat.get("likes"), Some(&Cell::Integer(0)));
    }
}

//! YouTube Channels API types and flattening.

use crate::table::{Cell, Record};
use crate::youtube_api::types::{PageInfo, Thumbnails, string_count};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Response structure for the `channels.list` API call.
///
/// When no requested identifier resolves, the service leaves out `items` altogether.
///
/// See: <https://developers.google.com/youtube/v3/docs/channels/list>
#[derive(Debug, Serialize, Deserialize)]
pub struct ChannelListResponse {
    /// The value will be `youtube#channelListResponse`.
    pub kind: String,
    #[serde(default)]
    pub items: VecDeque<Channel>,
    #[serde(rename = "pageInfo", default)]
    pub page_info: PageInfo,
}

/// A `channel` resource contains information about a YouTube channel.
///
/// See: <https://developers.google.com/youtube/v3/docs/channels#resource>
#[derive(Debug, Serialize, Deserialize)]
pub struct Channel {
    /// The ID that YouTube uses to uniquely identify the channel.
    pub id: String,
    pub snippet: ChannelSnippet,
    #[serde(default)]
    pub statistics: ChannelStatistics,
}

/// See: <https://developers.google.com/youtube/v3/docs/channels#snippet>
#[derive(Debug, Serialize, Deserialize)]
pub struct ChannelSnippet {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// The channel's handle-style custom URL (e.g. `@example`), if it has one.
    #[serde(rename = "customUrl")]
    pub custom_url: Option<String>,
    /// The date and time that the channel was created.
    #[serde(rename = "publishedAt")]
    pub published_at: Timestamp,
    #[serde(default)]
    pub thumbnails: Thumbnails,
}

/// See: <https://developers.google.com/youtube/v3/docs/channels#statistics>
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ChannelStatistics {
    #[serde(rename = "viewCount", default, deserialize_with = "string_count")]
    pub view_count: Option<u64>,
    /// Rounded down to three significant figures by the service.
    #[serde(rename = "subscriberCount", default, deserialize_with = "string_count")]
    pub subscriber_count: Option<u64>,
    #[serde(rename = "hiddenSubscriberCount", default)]
    pub hidden_subscriber_count: bool,
    #[serde(rename = "videoCount", default, deserialize_with = "string_count")]
    pub video_count: Option<u64>,
}

/// The canonical page URL for a channel.
pub fn channel_url(channel_id: &str) -> String {
    format!("https://www.youtube.com/channel/{channel_id}")
}

/// One flattened channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelRecord {
    pub id: String,
    pub published_at: Timestamp,
    pub title: String,
    pub url: String,
    pub description: String,
    pub views: Option<u64>,
    /// `None` when the channel hides its subscriber count.
    pub subscribers: Option<u64>,
    pub video_count: Option<u64>,
    pub thumbnails: Thumbnails,
    pub custom_url: Option<String>,
}

impl From<Channel> for ChannelRecord {
    fn from(channel: Channel) -> Self {
        let Channel {
            id,
            snippet,
            statistics,
        } = channel;
        let subscribers = if statistics.hidden_subscriber_count {
            None
        } else {
            statistics.subscriber_count
        };
        Self {
            url: channel_url(&id),
            id,
            published_at: snippet.published_at,
            title: snippet.title,
            description: snippet.description,
            views: statistics.view_count,
            subscribers,
            video_count: statistics.video_count,
            thumbnails: snippet.thumbnails,
            custom_url: snippet.custom_url,
        }
    }
}

impl Record for ChannelRecord {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "published_at",
        "title",
        "url",
        "description",
        "views",
        "subscribers",
        "video_count",
        "thumbnails",
        "custom_url",
    ];

    fn cells(&self) -> Vec<Cell> {
        vec![
            self.id.clone().into(),
            self.published_at.into(),
            self.title.clone().into(),
            self.url.clone().into(),
            self.description.clone().into(),
            self.views.into(),
            self.subscribers.into(),
            self.video_count.into(),
            Cell::blob(&self.thumbnails),
            self.custom_url.clone().into(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn channel(snippet_extra: serde_json::Value, statistics: serde_json::Value) -> Channel {
        let mut snippet = serde_json::json!({
            "title": "Example",
            "description": "About us",
            "publishedAt": "2015-06-01T12:00:00.123Z",
            "thumbnails": {"default": {"url": "https://yt3.ggpht.com/x"}}
        });
        snippet
            .as_object_mut()
            .unwrap()
            .extend(snippet_extra.as_object().unwrap().clone());
        serde_json::from_value(serde_json::json!({
            "kind": "youtube#channel",
            "id": "UCexample",
            "snippet": snippet,
            "statistics": statistics
        }))
        .unwrap()
    }

    #[test]
    fn custom_url_absence_is_null() {
        let record = ChannelRecord::from(channel(
            serde_json::json!({}),
            serde_json::json!({"viewCount": "10", "subscriberCount": "20", "videoCount": "3"}),
        ));
        assert_eq!(record.custom_url, None);
        assert_eq!(record.to_flat().get("custom_url"), Some(&Cell::Null));
        assert_eq!(record.url, "https://www.youtube.com/channel/UCexample");
        assert_eq!(record.subscribers, Some(20));
        assert_eq!(record.video_count, Some(3));
    }

    #[test]
    fn custom_url_presence_is_text() {
        let record = ChannelRecord::from(channel(
            serde_json::json!({"customUrl": "@example"}),
            serde_json::json!({}),
        ));
        assert_eq!(
            record.to_flat().get("custom_url"),
            Some(&Cell::Text("@example".to_string()))
        );
        assert_eq!(record.views, None);
    }

    #[test]
    fn hidden_subscriber_count_is_null() {
        let record = ChannelRecord::from(channel(
            serde_json::json!({}),
            serde_json::json!({"subscriberCount": "0", "hiddenSubscriberCount": true}),
        ));
        assert_eq!(record.subscribers, None);
    }
}

//! YouTube Search API types and flattening.

use crate::table::{Cell, Record};
use crate::youtube_api::error::InvalidCriteria;
use crate::youtube_api::types::{PageInfo, Thumbnails};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

/// The most results `search.list` will return in one page.
pub const MAX_SEARCH_PAGE_SIZE: u32 = 50;

/// How search results are ordered.
///
/// See: <https://developers.google.com/youtube/v3/docs/search/list#order>
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Order {
    /// Reverse chronological order of creation.
    Date,
    /// Highest to lowest rating.
    Rating,
    /// Relevance to the search query.
    #[default]
    Relevance,
    /// Alphabetically by title.
    Title,
    /// Channels in descending order of their number of uploaded videos.
    VideoCount,
    /// Highest to lowest number of views.
    ViewCount,
}

impl Order {
    pub fn as_str(self) -> &'static str {
        match self {
            Order::Date => "date",
            Order::Rating => "rating",
            Order::Relevance => "relevance",
            Order::Title => "title",
            Order::VideoCount => "videoCount",
            Order::ViewCount => "viewCount",
        }
    }
}

/// Whether restricted content is filtered out of search results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SafeSearch {
    #[default]
    Moderate,
    None,
    Strict,
}

impl SafeSearch {
    pub fn as_str(self) -> &'static str {
        match self {
            SafeSearch::Moderate => "moderate",
            SafeSearch::None => "none",
            SafeSearch::Strict => "strict",
        }
    }
}

/// Restricts video results by resolution. Only valid when searching for videos only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VideoDefinition {
    Any,
    High,
    Standard,
}

impl VideoDefinition {
    pub fn as_str(self) -> &'static str {
        match self {
            VideoDefinition::Any => "any",
            VideoDefinition::High => "high",
            VideoDefinition::Standard => "standard",
        }
    }
}

/// Restricts video results by length. Only valid when searching for videos only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VideoDuration {
    Any,
    /// Longer than 20 minutes.
    Long,
    /// Between 4 and 20 minutes.
    Medium,
    /// Shorter than 4 minutes.
    Short,
}

impl VideoDuration {
    pub fn as_str(self) -> &'static str {
        match self {
            VideoDuration::Any => "any",
            VideoDuration::Long => "long",
            VideoDuration::Medium => "medium",
            VideoDuration::Short => "short",
        }
    }
}

/// The type of resource a search result refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    Video,
    Channel,
    Playlist,
}

impl ResultKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ResultKind::Video => "video",
            ResultKind::Channel => "channel",
            ResultKind::Playlist => "playlist",
        }
    }
}

impl fmt::Display for ResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which kinds of resources a search may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchScope {
    pub video: bool,
    pub channel: bool,
    pub playlist: bool,
}

impl SearchScope {
    pub const ALL: Self = Self {
        video: true,
        channel: true,
        playlist: true,
    };

    pub const VIDEOS: Self = Self {
        video: true,
        channel: false,
        playlist: false,
    };

    pub fn is_empty(&self) -> bool {
        !(self.video || self.channel || self.playlist)
    }

    pub fn is_videos_only(&self) -> bool {
        *self == Self::VIDEOS
    }

    /// The comma-separated form used by the `type` request parameter.
    pub fn as_param(&self) -> String {
        [
            (self.video, ResultKind::Video),
            (self.channel, ResultKind::Channel),
            (self.playlist, ResultKind::Playlist),
        ]
        .into_iter()
        .filter_map(|(on, kind)| on.then_some(kind.as_str()))
        .collect::<Vec<_>>()
        .join(",")
    }
}

impl Default for SearchScope {
    fn default() -> Self {
        Self::ALL
    }
}

impl FromStr for SearchScope {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut scope = Self {
            video: false,
            channel: false,
            playlist: false,
        };
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match part {
                "video" => scope.video = true,
                "channel" => scope.channel = true,
                "playlist" => scope.playlist = true,
                other => eyre::bail!("unknown result kind {other:?} in search scope"),
            }
        }
        Ok(scope)
    }
}

/// Everything that determines which results a search returns.
///
/// Defaults: relevance ordering, 10 results, all result kinds, moderate safe search, no time
/// window, no region or language bias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCriteria {
    /// Free-text query (`q`).
    pub query: Option<String>,
    /// Only return resources created by this channel.
    pub channel_id: Option<String>,
    pub order: Order,
    /// Only return resources created at or after this instant.
    pub published_after: Option<Timestamp>,
    /// Only return resources created before this instant.
    pub published_before: Option<Timestamp>,
    /// How many results to return in total, across pages.
    pub required_results_count: usize,
    pub scope: SearchScope,
    /// ISO 3166-1 alpha-2 country code to return results for.
    pub region_code: Option<String>,
    /// ISO 639-1 language code that results should be most relevant to.
    pub relevance_language: Option<String>,
    pub safe_search: SafeSearch,
    pub video_definition: Option<VideoDefinition>,
    pub video_duration: Option<VideoDuration>,
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            query: None,
            channel_id: None,
            order: Order::default(),
            published_after: None,
            published_before: None,
            required_results_count: 10,
            scope: SearchScope::default(),
            region_code: None,
            relevance_language: None,
            safe_search: SafeSearch::default(),
            video_definition: None,
            video_duration: None,
        }
    }
}

impl SearchCriteria {
    /// Criteria for a free-text search with the default settings.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Self::default()
        }
    }

    /// Criteria for a channel's uploads, newest first.
    pub fn channel_uploads(channel_id: impl Into<String>) -> Self {
        Self {
            channel_id: Some(channel_id.into()),
            order: Order::Date,
            scope: SearchScope::VIDEOS,
            required_results_count: 100,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), InvalidCriteria> {
        if self.required_results_count == 0 {
            return Err(InvalidCriteria::ZeroResults);
        }
        if self.scope.is_empty() {
            return Err(InvalidCriteria::EmptyScope);
        }
        if let (Some(after), Some(before)) = (self.published_after, self.published_before) {
            if after > before {
                return Err(InvalidCriteria::InvertedWindow { after, before });
            }
        }
        Ok(())
    }

    /// Query parameters for one `search.list` page, excluding paging.
    ///
    /// Video-only filters are left out unless the scope is exactly videos, since the service
    /// rejects them otherwise.
    pub(crate) fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("part", "snippet".to_string()),
            ("type", self.scope.as_param()),
            ("order", self.order.as_str().to_string()),
            ("safeSearch", self.safe_search.as_str().to_string()),
            ("channelType", "any".to_string()),
        ];
        let optional = [
            ("q", self.query.clone()),
            ("channelId", self.channel_id.clone()),
            ("publishedAfter", self.published_after.map(|t| t.to_string())),
            ("publishedBefore", self.published_before.map(|t| t.to_string())),
            ("regionCode", self.region_code.clone()),
            ("relevanceLanguage", self.relevance_language.clone()),
        ];
        params.extend(optional.into_iter().filter_map(|(k, v)| Some((k, v?))));

        if self.scope.is_videos_only() {
            if let Some(definition) = self.video_definition {
                params.push(("videoDefinition", definition.as_str().to_string()));
            }
            if let Some(duration) = self.video_duration {
                params.push(("videoDuration", duration.as_str().to_string()));
            }
        }
        params
    }
}

/// Response structure for the `search.list` API call.
///
/// See: <https://developers.google.com/youtube/v3/docs/search/list>
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchListResponse {
    /// The value will be `youtube#searchListResponse`.
    pub kind: String,
    #[serde(default)]
    pub items: VecDeque<SearchResult>,
    #[serde(rename = "pageInfo", default)]
    pub page_info: PageInfo,
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

/// A search result as returned by the API.
///
/// See: <https://developers.google.com/youtube/v3/docs/search#resource>
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: SearchResultId,
    pub snippet: SearchResultSnippet,
}

/// Identifies the resource a search result points to. Exactly one of the id fields is set,
/// matching `kind`.
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResultId {
    /// `youtube#video`, `youtube#channel` or `youtube#playlist`.
    pub kind: String,
    #[serde(rename = "videoId")]
    pub video_id: Option<String>,
    #[serde(rename = "channelId")]
    pub channel_id: Option<String>,
    #[serde(rename = "playlistId")]
    pub playlist_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResultSnippet {
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
}

impl SearchResultId {
    /// Resolves the declared kind and the identifier that goes with it.
    pub fn resolve(&self) -> eyre::Result<(ResultKind, String)> {
        let (kind, id) = match self.kind.as_str() {
            "youtube#video" => (ResultKind::Video, &self.video_id),
            "youtube#channel" => (ResultKind::Channel, &self.channel_id),
            "youtube#playlist" => (ResultKind::Playlist, &self.playlist_id),
            other => eyre::bail!("unexpected search result kind {other:?}"),
        };
        let id = id
            .clone()
            .ok_or_else(|| eyre::eyre!("{} search result without a {kind} id", self.kind))?;
        Ok((kind, id))
    }
}

/// One flattened search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRecord {
    pub kind: ResultKind,
    pub id: String,
    pub published_at: Timestamp,
    pub title: String,
    pub description: String,
    pub channel_id: String,
    pub channel_title: String,
}

impl TryFrom<SearchResult> for SearchRecord {
    type Error = eyre::Report;

    fn try_from(result: SearchResult) -> eyre::Result<Self> {
        let (kind, id) = result.id.resolve()?;
        let snippet = result.snippet;
        Ok(Self {
            kind,
            id,
            published_at: snippet.published_at,
            title: snippet.title,
            description: snippet.description,
            channel_id: snippet.channel_id,
            channel_title: snippet.channel_title,
        })
    }
}

impl Record for SearchRecord {
    const COLUMNS: &'static [&'static str] = &[
        "kind",
        "id",
        "published_at",
        "title",
        "description",
        "channel_id",
        "channel_title",
    ];

    fn cells(&self) -> Vec<Cell> {
        vec![
            self.kind.as_str().into(),
            self.id.clone().into(),
            self.published_at.into(),
            self.title.clone().into(),
            self.description.clone().into(),
            self.channel_id.clone().into(),
            self.channel_title.clone().into(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn result(id: serde_json::Value) -> SearchResult {
        serde_json::from_value(serde_json::json!({
            "kind": "youtube#searchResult",
            "etag": "x",
            "id": id,
            "snippet": {
                "publishedAt": "2021-03-04T05:06:07Z",
                "channelId": "UCabc",
                "title": "A title",
                "description": "",
                "thumbnails": {},
                "channelTitle": "Some channel",
                "liveBroadcastContent": "none"
            }
        }))
        .unwrap()
    }

    #[test]
    fn id_follows_declared_kind() {
        let cases = [
            (
                serde_json::json!({"kind": "youtube#video", "videoId": "v1"}),
                ResultKind::Video,
                "v1",
            ),
            (
                serde_json::json!({"kind": "youtube#channel", "channelId": "c1"}),
                ResultKind::Channel,
                "c1",
            ),
            (
                serde_json::json!({"kind": "youtube#playlist", "playlistId": "p1"}),
                ResultKind::Playlist,
                "p1",
            ),
        ];
        for (id, kind, expected) in cases {
            let record = SearchRecord::try_from(result(id)).unwrap();
            assert_eq!(record.kind, kind);
            assert_eq!(record.id, expected);
        }
    }

    #[test]
    fn mismatched_or_unknown_kind_is_an_error() {
        let mismatched = result(serde_json::json!({"kind": "youtube#video", "channelId": "c1"}));
        assert!(SearchRecord::try_from(mismatched).is_err());

        let unknown = result(serde_json::json!({"kind": "youtube#short", "videoId": "v1"}));
        assert!(SearchRecord::try_from(unknown).is_err());
    }

    #[test]
    fn scope_round_trips_through_param_form() {
        assert_eq!(SearchScope::ALL.as_param(), "video,channel,playlist");
        assert_eq!(SearchScope::VIDEOS.as_param(), "video");
        let parsed: SearchScope = "playlist, video".parse().unwrap();
        assert_eq!(parsed.as_param(), "video,playlist");
        assert!("video,podcast".parse::<SearchScope>().is_err());
        assert!("".parse::<SearchScope>().unwrap().is_empty());
    }

    #[test]
    fn validation() {
        assert_eq!(SearchCriteria::new("cats").validate(), Ok(()));

        let zero = SearchCriteria {
            required_results_count: 0,
            ..SearchCriteria::new("cats")
        };
        assert_eq!(zero.validate(), Err(InvalidCriteria::ZeroResults));

        let after: Timestamp = "2024-02-01T00:00:00Z".parse().unwrap();
        let before: Timestamp = "2024-01-01T00:00:00Z".parse().unwrap();
        let inverted = SearchCriteria {
            published_after: Some(after),
            published_before: Some(before),
            ..SearchCriteria::new("cats")
        };
        assert_eq!(
            inverted.validate(),
            Err(InvalidCriteria::InvertedWindow { after, before })
        );

        let same_instant = SearchCriteria {
            published_after: Some(after),
            published_before: Some(after),
            ..SearchCriteria::new("cats")
        };
        assert_eq!(same_instant.validate(), Ok(()));
    }

    #[test]
    fn video_filters_only_sent_for_video_scope() {
        let mixed = SearchCriteria {
            video_duration: Some(VideoDuration::Long),
            ..SearchCriteria::new("cats")
        };
        assert!(!mixed.query_params().iter().any(|(k, _)| *k == "videoDuration"));

        let videos = SearchCriteria {
            scope: SearchScope::VIDEOS,
            ..mixed
        };
        assert!(
            videos
                .query_params()
                .contains(&("videoDuration", "long".to_string()))
        );
    }

    #[test]
    fn time_window_is_sent_as_rfc3339() {
        let criteria = SearchCriteria {
            published_after: Some("1970-01-01T00:00:00Z".parse().unwrap()),
            ..SearchCriteria::default()
        };
        let params = criteria.query_params();
        assert!(params.contains(&("publishedAfter", "1970-01-01T00:00:00Z".to_string())));
        assert!(!params.iter().any(|(k, _)| *k == "q" || *k == "publishedBefore"));
    }
}

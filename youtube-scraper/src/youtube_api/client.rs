//! Core YouTube API client: request construction, pagination, and the public operations.

use crate::table::ResultTable;
use crate::youtube_api::{
    channels::{ChannelListResponse, ChannelRecord},
    comments::{CommentOrder, CommentRecord, CommentThreadListResponse, TextFormat, clamp_comment_count},
    error::ApiError,
    search::{MAX_SEARCH_PAGE_SIZE, SearchCriteria, SearchListResponse, SearchRecord},
    types::{Page, PageRequest, PagedStream},
    videos::{VideoListResponse, VideoRecord},
};
use eyre::Context;
use http::Method;
use jiff::Timestamp;
use serde::de::DeserializeOwned;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use tokio_stream::{Stream, StreamExt};
use tracing::instrument;

/// Root of the public Google APIs endpoint.
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com";

/// The most identifiers `videos.list` and `channels.list` accept in one `id` parameter.
const MAX_IDS_PER_REQUEST: usize = 50;

/// Client for the read-only parts of the YouTube Data API v3.
///
/// The client is bound to one API key and one HTTP connection pool. It has no other state, so
/// clones are cheap and every operation is a pure function of its arguments and the remote
/// service. Requests are issued one at a time; an operation that needs several pages fetches
/// them sequentially.
#[derive(Clone)]
pub struct YouTubeClient {
    /// Sent in the `x-goog-api-key` header so it never shows up in URLs
    api_key: Arc<str>,
    /// Scheme and host the `/youtube/v3/...` paths are resolved against
    base_url: Arc<str>,
    /// HTTP client for API requests
    client: reqwest::Client,
}

impl fmt::Debug for YouTubeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("YouTubeClient")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl YouTubeClient {
    /// Creates a client that talks to the public YouTube Data API.
    ///
    /// # Arguments
    ///
    /// * `api_key` - An API key for a Google Cloud project with the YouTube Data API enabled
    /// * `client` - Shared HTTP client for making API requests
    pub fn new(api_key: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            api_key: Arc::from(api_key.into()),
            base_url: Arc::from(DEFAULT_BASE_URL),
            client,
        }
    }

    /// Points the client at a different service root, e.g. a local mock of the API.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.base_url = Arc::from(base_url.trim_end_matches('/'));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Makes a keyed GET request to one `youtube/v3` endpoint and decodes the JSON body.
    ///
    /// Non-success statuses become an [`ApiError`] at the root of the returned error. A body that
    /// doesn't match `T` is reported as a parse failure naming the endpoint.
    #[instrument(skip(self), level = tracing::Level::TRACE)]
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query_params: &[(&str, &str)],
    ) -> eyre::Result<T> {
        let url = format!("{}/youtube/v3/{endpoint}", self.base_url);
        let response = self
            .client
            .request(Method::GET, &url)
            .header("x-goog-api-key", &*self.api_key)
            .query(query_params)
            .send()
            .await
            .with_context(|| format!("send GET request to YouTube API: {endpoint}"))?;

        let status_code = response.status();
        if !status_code.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ApiError::from_response_body(status_code, &error_text))
                .with_context(|| format!("YouTube API {endpoint} request failed"));
        }

        let body = response
            .bytes()
            .await
            .with_context(|| format!("read YouTube {endpoint} API response body"))?;
        serde_json::from_slice(&body)
            .with_context(|| format!("parse YouTube {endpoint} API response as JSON"))
    }

    /// Searches for videos, channels, and playlists.
    ///
    /// Uses the `search.list` API, following `nextPageToken` until
    /// [`SearchCriteria::required_results_count`] results have been collected or the service has
    /// no more. The returned table has at most that many rows, in the order the pages arrived.
    ///
    /// # Errors
    ///
    /// Criteria that fail [`SearchCriteria::validate`] are rejected before any request is made,
    /// with an [`InvalidCriteria`](crate::youtube_api::InvalidCriteria) at the root. A rejected
    /// request surfaces as an [`ApiError`].
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/search/list>
    #[instrument(skip(self))]
    pub async fn search(&self, criteria: &SearchCriteria) -> eyre::Result<ResultTable<SearchRecord>> {
        let results = self.search_stream(criteria)?;
        let mut results = std::pin::pin!(results);
        let mut rows = Vec::new();
        while let Some(record) = results.next().await {
            rows.push(record.context("fetch search results")?);
        }

        tracing::debug!(rows = rows.len(), "search complete");
        Ok(ResultTable::new(rows))
    }

    /// Like [`Self::search`], but yields results as pages arrive instead of collecting them.
    ///
    /// Dropping the stream early stops further pages from being requested.
    pub fn search_stream(
        &self,
        criteria: &SearchCriteria,
    ) -> eyre::Result<impl Stream<Item = eyre::Result<SearchRecord>> + use<'_>> {
        criteria.validate().context("validate search criteria")?;
        let base_params = criteria.query_params();
        Ok(PagedStream::new(
            criteria.required_results_count,
            MAX_SEARCH_PAGE_SIZE,
            move |request| {
                let base_params = base_params.clone();
                async move { self.search_page(base_params, request).await }
            },
        ))
    }

    /// Lists a channel's videos, newest first.
    ///
    /// Equivalent to [`Self::search`] with the scope fixed to videos, the channel filter set, and
    /// ordering by date.
    #[instrument(skip(self))]
    pub async fn channel_videos(
        &self,
        channel_id: &str,
        published_after: Option<Timestamp>,
        published_before: Option<Timestamp>,
        results_count: usize,
    ) -> eyre::Result<ResultTable<SearchRecord>> {
        let criteria = SearchCriteria {
            published_after,
            published_before,
            required_results_count: results_count,
            ..SearchCriteria::channel_uploads(channel_id)
        };
        self.search(&criteria).await
    }

    /// Gets full metadata for a single video.
    ///
    /// Returns an empty table if the identifier doesn't resolve to a (public) video.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/videos/list>
    #[instrument(skip(self))]
    pub async fn video(&self, video_id: &str) -> eyre::Result<ResultTable<VideoRecord>> {
        self.videos(&[video_id]).await
    }

    /// Gets full metadata for several videos, batching identifiers into as few requests as the
    /// service allows.
    ///
    /// Identifiers that don't resolve are left out of the result.
    pub async fn videos(&self, video_ids: &[&str]) -> eyre::Result<ResultTable<VideoRecord>> {
        let mut rows = Vec::with_capacity(video_ids.len());
        for batch in video_ids.chunks(MAX_IDS_PER_REQUEST) {
            let ids = batch.join(",");
            let query_params = [("part", "snippet,contentDetails,statistics"), ("id", &*ids)];
            let videos: VideoListResponse = self.get_json("videos", &query_params).await?;

            tracing::debug!(
                requested = batch.len(),
                returned_items = videos.items.len(),
                "fetched videos"
            );
            rows.extend(videos.items.into_iter().map(VideoRecord::from));
        }
        Ok(ResultTable::new(rows))
    }

    /// Gets metadata and statistics for a single channel.
    ///
    /// Returns an empty table if the identifier doesn't resolve to a channel.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/channels/list>
    #[instrument(skip(self))]
    pub async fn channel(&self, channel_id: &str) -> eyre::Result<ResultTable<ChannelRecord>> {
        self.channels(&[channel_id]).await
    }

    /// Gets metadata and statistics for several channels, batching identifiers like
    /// [`Self::videos`].
    pub async fn channels(&self, channel_ids: &[&str]) -> eyre::Result<ResultTable<ChannelRecord>> {
        let mut rows = Vec::with_capacity(channel_ids.len());
        for batch in channel_ids.chunks(MAX_IDS_PER_REQUEST) {
            let ids = batch.join(",");
            let query_params = [("part", "snippet,statistics"), ("id", &*ids)];
            let channels: ChannelListResponse = self.get_json("channels", &query_params).await?;

            tracing::debug!(
                requested = batch.len(),
                returned_items = channels.items.len(),
                "fetched channels"
            );
            rows.extend(channels.items.into_iter().map(ChannelRecord::from));
        }
        Ok(ResultTable::new(rows))
    }

    /// Gets the top-level comments on a video, with comment text as HTML.
    ///
    /// See [`Self::top_level_comments_as`].
    pub async fn top_level_comments(
        &self,
        video_id: &str,
        order: CommentOrder,
        results_count: u32,
    ) -> eyre::Result<ResultTable<CommentRecord>> {
        self.top_level_comments_as(video_id, order, results_count, TextFormat::Html)
            .await
    }

    /// Gets the top-level comments on a video.
    ///
    /// Issues a single `commentThreads.list` request; replies are not included. `results_count`
    /// is clamped into `1..=100`, the most one page can hold, and a warning is logged if that
    /// changes it.
    ///
    /// # Errors
    ///
    /// Unlike video lookups, the service treats an unknown video (or one with comments disabled)
    /// as an error, which surfaces as an [`ApiError`].
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/commentThreads/list>
    #[instrument(skip(self))]
    pub async fn top_level_comments_as(
        &self,
        video_id: &str,
        order: CommentOrder,
        results_count: u32,
        text_format: TextFormat,
    ) -> eyre::Result<ResultTable<CommentRecord>> {
        let max_results = clamp_comment_count(results_count);
        if max_results != results_count {
            tracing::warn!(
                requested = results_count,
                max_results,
                "comment count out of range, clamping"
            );
        }

        let max_results_string = max_results.to_string();
        let query_params = [
            ("part", "snippet"),
            ("videoId", video_id),
            ("order", order.as_str()),
            ("textFormat", text_format.as_str()),
            ("maxResults", max_results_string.as_str()),
        ];
        let threads: CommentThreadListResponse =
            self.get_json("commentThreads", &query_params).await?;

        tracing::debug!(
            video_id,
            returned_items = threads.items.len(),
            has_next_page = threads.next_page_token.is_some(),
            "fetched top-level comments"
        );

        Ok(threads.items.into_iter().map(CommentRecord::from).collect())
    }

    /// Fetches and flattens one page of `search.list` results.
    async fn search_page(
        &self,
        mut query_params: Vec<(&'static str, String)>,
        request: PageRequest,
    ) -> eyre::Result<Page<SearchRecord>> {
        query_params.push(("maxResults", request.max_results.to_string()));
        if let Some(token) = request.page_token {
            query_params.push(("pageToken", token));
        }
        let query_params: Vec<(&str, &str)> =
            query_params.iter().map(|(k, v)| (*k, v.as_str())).collect();

        let response: SearchListResponse = self.get_json("search", &query_params).await?;

        tracing::debug!(
            total_results = response.page_info.total_results,
            returned_items = response.items.len(),
            has_next_page = response.next_page_token.is_some(),
            "fetched search results page"
        );

        let items = response
            .items
            .into_iter()
            .map(SearchRecord::try_from)
            .collect::<eyre::Result<VecDeque<_>>>()
            .context("flatten search results")?;

        Ok(Page {
            items,
            next_page_token: response.next_page_token,
        })
    }
}

//! Shared types and pagination infrastructure for the YouTube API client.

use jiff::{SignedDuration, Span, SpanRelativeTo};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context as TaskContext, Poll};
use tokio_stream::Stream;

/// One page of items returned by a YouTube list endpoint.
#[derive(Debug)]
pub struct Page<T> {
    /// Items in the order the service returned them.
    pub items: VecDeque<T>,
    /// Cursor for the following page, absent on the last page.
    pub next_page_token: Option<String>,
}

/// What a [`PagedStream`] asks its fetcher for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Continuation token from the previous page, `None` for the first page.
    pub page_token: Option<String>,
    /// Page size to request: the number of items still wanted, capped at the
    /// endpoint's maximum page size.
    pub max_results: u32,
}

type OneFuturePage<'a, F, T> = Pin<Box<dyn Future<Output = eyre::Result<(F, Page<T>)>> + 'a + Send>>;

/// A paginated stream that fetches subsequent pages from a YouTube API list endpoint until
/// either `limit` items have been yielded or the service stops returning continuation tokens.
///
/// Pages are fetched strictly one after another, and the next page is only requested once the
/// current one has been drained. Each request asks for exactly as many items as are still needed
/// (bounded by the endpoint's page size), so a stream over `T` available results with page size
/// `P` issues at most `ceil(T / P)` requests.
///
/// A page that comes back empty ends the stream even if it carries a continuation token, which
/// guarantees termination against a misbehaving service.
pub struct PagedStream<'a, T, F> {
    /// Current batch of items from the most recent API response
    current_items: VecDeque<T>,
    /// Future representing the currently pending API request, if any
    pending_request: Option<OneFuturePage<'a, F, T>>,
    /// How many more items the caller wants
    remaining: usize,
    /// Upper bound on `maxResults` for the endpoint
    max_page_size: u32,
    /// Whether we've reached the end of all available data
    is_done: bool,
}

impl<'a, T, F> PagedStream<'a, T, F> {
    /// Create a new PagedStream yielding at most `limit` items.
    ///
    /// The first request is issued lazily, on first poll. A `limit` of zero never issues any
    /// request.
    pub fn new<Fut>(limit: usize, max_page_size: u32, fetcher: F) -> Self
    where
        F: Fn(PageRequest) -> Fut,
        F: Send + 'a,
        Fut: Future<Output = eyre::Result<Page<T>>> + Send + 'a,
    {
        let max_page_size = max_page_size.max(1);
        if limit == 0 {
            return Self {
                current_items: VecDeque::new(),
                pending_request: None,
                remaining: 0,
                max_page_size,
                is_done: true,
            };
        }

        let first = PageRequest {
            page_token: None,
            max_results: page_size(limit, max_page_size),
        };
        let first_page = async move {
            let page = fetcher(first).await?;
            Ok((fetcher, page))
        };
        Self {
            pending_request: Some(Box::pin(first_page)),
            current_items: VecDeque::new(),
            remaining: limit,
            max_page_size,
            is_done: false,
        }
    }
}

fn page_size(wanted: usize, max_page_size: u32) -> u32 {
    u32::try_from(wanted).unwrap_or(u32::MAX).min(max_page_size)
}

impl<'a, T: Unpin, F> Unpin for PagedStream<'a, T, F> {}

impl<'a, T: Unpin, F, Fut> Stream for PagedStream<'a, T, F>
where
    F: Fn(PageRequest) -> Fut,
    F: Send + 'a,
    Fut: Future<Output = eyre::Result<Page<T>>> + Send + 'a,
{
    type Item = eyre::Result<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Option<Self::Item>> {
        loop {
            // Overshoot from the last page is dropped, not carried over
            if self.remaining == 0 {
                self.current_items.clear();
                self.pending_request = None;
                self.is_done = true;
                return Poll::Ready(None);
            }

            if let Some(item) = self.current_items.pop_front() {
                self.remaining -= 1;
                return Poll::Ready(Some(Ok(item)));
            }

            if self.is_done {
                return Poll::Ready(None);
            }

            let Some(pending) = self.pending_request.as_mut() else {
                self.is_done = true;
                return Poll::Ready(None);
            };

            match pending.as_mut().poll(cx) {
                Poll::Ready(Ok((fetcher, page))) => {
                    let was_empty = page.items.is_empty();
                    self.current_items.extend(page.items);
                    let wanted = self.remaining.saturating_sub(self.current_items.len());

                    match page.next_page_token {
                        Some(next_token) if wanted > 0 && !was_empty => {
                            let request = PageRequest {
                                page_token: Some(next_token),
                                max_results: page_size(wanted, self.max_page_size),
                            };
                            // set up the next page, but don't poll it until this one is drained
                            self.pending_request = Some(Box::pin(async move {
                                let page = fetcher(request).await?;
                                Ok((fetcher, page))
                            }));
                        }
                        next_token => {
                            if next_token.is_some() && was_empty {
                                tracing::debug!("empty page with continuation token, stopping");
                            }
                            self.is_done = true;
                            self.pending_request = None;
                        }
                    }
                    continue;
                }
                Poll::Ready(Err(e)) => {
                    self.pending_request = None;
                    self.is_done = true;
                    return Poll::Ready(Some(Err(e)));
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// Paging details for lists of resources.
///
/// Some endpoints omit this entirely when there are no results, hence the `Default`.
///
/// See: <https://developers.google.com/youtube/v3/docs/pageInfo>
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct PageInfo {
    /// The total number of results in the result set.
    ///
    /// For `search.list` this is an approximation and can exceed what is actually retrievable.
    #[serde(rename = "totalResults", default)]
    pub total_results: u32,
    /// The number of results included in the API response.
    #[serde(rename = "resultsPerPage", default)]
    pub results_per_page: u32,
}

/// A single thumbnail image.
///
/// See: <https://developers.google.com/youtube/v3/docs/thumbnails>
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// Thumbnails keyed by size name (`default`, `medium`, `high`, `standard`, `maxres`).
pub type Thumbnails = BTreeMap<String, Thumbnail>;

/// Parses an ISO 8601 duration as reported in `contentDetails.duration` (e.g. `PT1H2M3S`).
///
/// Days and weeks are treated as 24 hours and 7 days; calendar units (years, months) have no
/// fixed length and are rejected.
pub fn parse_iso8601_duration(s: &str) -> eyre::Result<SignedDuration> {
    let span: Span = s
        .parse()
        .map_err(|e| eyre::eyre!("invalid ISO 8601 duration {s:?}: {e}"))?;
    span.to_duration(SpanRelativeTo::days_are_24_hours())
        .map_err(|e| eyre::eyre!("ISO 8601 duration {s:?} has no fixed length: {e}"))
}

/// Deserializes an optional count that the API encodes as a decimal string (`"12345"`).
///
/// A missing or `null` field is `None`. A present field that isn't a non-negative integer is a
/// data error.
pub(crate) fn string_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Text(String),
        Number(u64),
    }

    match Option::<Count>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Count::Number(n)) => Ok(Some(n)),
        Some(Count::Text(s)) => s
            .parse()
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid count {s:?}: {e}"))),
    }
}

/// Deserializes an optional ISO 8601 duration string into a [`SignedDuration`].
pub(crate) fn iso8601_duration<'de, D>(deserializer: D) -> Result<Option<SignedDuration>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|s| parse_iso8601_duration(&s).map_err(serde::de::Error::custom))
        .transpose()
}

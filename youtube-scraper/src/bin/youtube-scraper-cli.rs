use clap::{Parser, Subcommand, ValueEnum};
use eyre::Context;
use jiff::Timestamp;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use youtube_scraper::config::{DEFAULT_KEY_FILE, resolve_api_key};
use youtube_scraper::youtube_api::{
    CommentOrder, DEFAULT_BASE_URL, Order, SafeSearch, SearchCriteria, SearchScope, TextFormat,
    VideoDefinition, VideoDuration, YouTubeClient,
};
use youtube_scraper::{Record, ResultTable};

/// Search YouTube and look up video, channel, and comment metadata as flat tables.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// YouTube Data API key; falls back to the contents of --key-file
    #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// File holding the API key
    #[arg(long, default_value = DEFAULT_KEY_FILE)]
    key_file: PathBuf,

    /// Service root to send requests to
    #[arg(long, env = "YOUTUBE_API_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Tsv)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Header line plus one tab-separated line per row
    Tsv,
    /// One JSON object per row
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OrderArg {
    Date,
    Rating,
    Relevance,
    Title,
    VideoCount,
    ViewCount,
}

impl From<OrderArg> for Order {
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::Date => Order::Date,
            OrderArg::Rating => Order::Rating,
            OrderArg::Relevance => Order::Relevance,
            OrderArg::Title => Order::Title,
            OrderArg::VideoCount => Order::VideoCount,
            OrderArg::ViewCount => Order::ViewCount,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum SafeSearchArg {
    Moderate,
    None,
    Strict,
}

impl From<SafeSearchArg> for SafeSearch {
    fn from(level: SafeSearchArg) -> Self {
        match level {
            SafeSearchArg::Moderate => SafeSearch::Moderate,
            SafeSearchArg::None => SafeSearch::None,
            SafeSearchArg::Strict => SafeSearch::Strict,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum DefinitionArg {
    Any,
    High,
    Standard,
}

impl From<DefinitionArg> for VideoDefinition {
    fn from(definition: DefinitionArg) -> Self {
        match definition {
            DefinitionArg::Any => VideoDefinition::Any,
            DefinitionArg::High => VideoDefinition::High,
            DefinitionArg::Standard => VideoDefinition::Standard,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum DurationArg {
    Any,
    Long,
    Medium,
    Short,
}

impl From<DurationArg> for VideoDuration {
    fn from(duration: DurationArg) -> Self {
        match duration {
            DurationArg::Any => VideoDuration::Any,
            DurationArg::Long => VideoDuration::Long,
            DurationArg::Medium => VideoDuration::Medium,
            DurationArg::Short => VideoDuration::Short,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum CommentOrderArg {
    Time,
    Relevance,
}

impl From<CommentOrderArg> for CommentOrder {
    fn from(order: CommentOrderArg) -> Self {
        match order {
            CommentOrderArg::Time => CommentOrder::Time,
            CommentOrderArg::Relevance => CommentOrder::Relevance,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search for videos, channels, and playlists
    Search {
        /// Free-text query
        query: Option<String>,
        /// Only return resources created by this channel
        #[arg(long)]
        channel_id: Option<String>,
        #[arg(long, value_enum, default_value_t = OrderArg::Relevance)]
        order: OrderArg,
        /// Only return resources published at or after this RFC 3339 instant
        #[arg(long)]
        after: Option<Timestamp>,
        /// Only return resources published before this RFC 3339 instant
        #[arg(long)]
        before: Option<Timestamp>,
        /// Number of results to collect across pages
        #[arg(long, short = 'n', default_value_t = 10)]
        count: usize,
        /// Comma-separated result kinds: video, channel, playlist
        #[arg(long, default_value = "video,channel,playlist")]
        scope: SearchScope,
        /// ISO 3166-1 alpha-2 country code
        #[arg(long)]
        region: Option<String>,
        /// ISO 639-1 language code results should be most relevant to
        #[arg(long)]
        language: Option<String>,
        #[arg(long, value_enum, default_value_t = SafeSearchArg::Moderate)]
        safe_search: SafeSearchArg,
        /// Resolution filter (video-only searches)
        #[arg(long, value_enum)]
        definition: Option<DefinitionArg>,
        /// Length filter (video-only searches)
        #[arg(long, value_enum)]
        duration: Option<DurationArg>,
    },
    /// Look up full metadata for one or more videos
    Video {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// List a channel's videos, newest first
    ChannelVideos {
        channel_id: String,
        #[arg(long)]
        after: Option<Timestamp>,
        #[arg(long)]
        before: Option<Timestamp>,
        #[arg(long, short = 'n', default_value_t = 100)]
        count: usize,
    },
    /// Look up metadata and statistics for one or more channels
    Channel {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// List the top-level comments on a video
    Comments {
        video_id: String,
        #[arg(long, value_enum, default_value_t = CommentOrderArg::Time)]
        order: CommentOrderArg,
        /// Number of comments; at most 100 are returned
        #[arg(long, short = 'n', default_value_t = 100)]
        count: u32,
        /// Return comment text without HTML markup
        #[arg(long)]
        plain_text: bool,
    },
}

fn emit<R: Record>(table: &ResultTable<R>, format: OutputFormat) -> eyre::Result<()> {
    let stdout = std::io::stdout().lock();
    let written = match format {
        OutputFormat::Tsv => table.write_tsv(stdout),
        OutputFormat::Json => table.write_json_lines(stdout),
    };
    written.context("write results to stdout")
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();

    let cli = Cli::parse();

    let api_key = resolve_api_key(cli.api_key.as_deref(), &cli.key_file).await?;
    let http = reqwest::Client::builder()
        .build()
        .context("build HTTP client")?;
    let yt = YouTubeClient::new(api_key, http).with_base_url(cli.base_url);

    match cli.command {
        Command::Search {
            query,
            channel_id,
            order,
            after,
            before,
            count,
            scope,
            region,
            language,
            safe_search,
            definition,
            duration,
        } => {
            let criteria = SearchCriteria {
                query,
                channel_id,
                order: order.into(),
                published_after: after,
                published_before: before,
                required_results_count: count,
                scope,
                region_code: region,
                relevance_language: language,
                safe_search: safe_search.into(),
                video_definition: definition.map(Into::into),
                video_duration: duration.map(Into::into),
            };
            let results = yt.search(&criteria).await.context("search YouTube")?;
            tracing::info!(rows = results.len(), "search finished");
            emit(&results, cli.output)
        }
        Command::Video { ids } => {
            let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
            let videos = yt.videos(&ids).await.context("look up videos")?;
            if videos.len() < ids.len() {
                tracing::warn!(
                    requested = ids.len(),
                    found = videos.len(),
                    "some video ids did not resolve"
                );
            }
            emit(&videos, cli.output)
        }
        Command::ChannelVideos {
            channel_id,
            after,
            before,
            count,
        } => {
            let videos = yt
                .channel_videos(&channel_id, after, before, count)
                .await
                .with_context(|| format!("list videos of channel {channel_id}"))?;
            emit(&videos, cli.output)
        }
        Command::Channel { ids } => {
            let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
            let channels = yt.channels(&ids).await.context("look up channels")?;
            if channels.len() < ids.len() {
                tracing::warn!(
                    requested = ids.len(),
                    found = channels.len(),
                    "some channel ids did not resolve"
                );
            }
            emit(&channels, cli.output)
        }
        Command::Comments {
            video_id,
            order,
            count,
            plain_text,
        } => {
            let format = if plain_text {
                TextFormat::PlainText
            } else {
                TextFormat::Html
            };
            let comments = yt
                .top_level_comments_as(&video_id, order.into(), count, format)
                .await
                .with_context(|| format!("list comments on video {video_id}"))?;
            emit(&comments, cli.output)
        }
    }
}

//! API key resolution.

use eyre::Context;
use std::path::Path;

/// Key file read when no key is given explicitly.
pub const DEFAULT_KEY_FILE: &str = "key.txt";

/// Environment variable the CLI reads the API key from.
pub const API_KEY_ENV: &str = "YOUTUBE_API_KEY";

/// Picks the API key to use: `explicit` if given, otherwise the contents of `key_file`.
///
/// Surrounding whitespace (such as the trailing newline most editors leave) is stripped. An empty
/// key is an error rather than something to send to the service.
pub async fn resolve_api_key(explicit: Option<&str>, key_file: &Path) -> eyre::Result<String> {
    let key = match explicit {
        Some(key) => key.to_string(),
        None => tokio::fs::read_to_string(key_file).await.with_context(|| {
            format!(
                "read API key from {} (or set {API_KEY_ENV})",
                key_file.display()
            )
        })?,
    };

    let key = key.trim();
    if key.is_empty() {
        eyre::bail!("YouTube API key is empty");
    }
    Ok(key.to_string())
}

//! services/api/src/adapters/supadata.rs
//!
//! An adapter for the Supadata scraping API, implementing the
//! `TranscriptService` port. YouTube transcript fetches run a bounded
//! fallback sequence (full URL, then extracted video id, then an explicit
//! English language parameter); when every attempt fails the adapter returns
//! an explanatory plain-text message rather than an error, because the
//! workflow treats a missing transcript as displayable content.

use std::sync::LazyLock;

use async_trait::async_trait;
use deep_content_core::ports::{PortError, PortResult, TranscriptService};
use regex::Regex;
use serde::Deserialize;
use tracing::{info, warn};

const SUPADATA_BASE_URL: &str = "https://api.supadata.ai/v1";

pub const NO_TRANSCRIPT_MESSAGE: &str = "No transcript available for this YouTube video. \n\n\
Possible reasons:\n\
- The video doesn't have captions enabled\n\
- The creator hasn't added captions\n\
- YouTube auto-generated captions aren't available\n\
- The video is too new and captions haven't been processed yet\n\n\
Try a different video from an official channel (like news, education, etc.) that is more likely to have captions.";

static YOUTUBE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^.*(?:(?:youtu\.be/|v/|vi/|u/\w/|embed/|shorts/)|(?:(?:watch)?\?v(?:i)?=|&v(?:i)?=))([^#&?]*).*",
    )
    .unwrap()
});

/// Extracts the video id from the common YouTube URL shapes (watch, short
/// link, embed, shorts).
pub fn extract_youtube_id(url: &str) -> Option<String> {
    YOUTUBE_ID
        .captures(url)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|id| !id.is_empty())
}

//=========================================================================================
// Wire Types and Formatting
//=========================================================================================

#[derive(Deserialize)]
struct TranscriptResponse {
    #[serde(default)]
    lang: Option<String>,
    #[serde(default, rename = "availableLangs")]
    available_langs: Option<Vec<String>>,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ScrapeResponse {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

/// The ordered transcript query attempts: the full URL first, then the
/// extracted video id when one exists, then the URL again with an explicit
/// English language parameter.
fn transcript_queries<'a>(
    url: &'a str,
    video_id: Option<&'a str>,
) -> Vec<Vec<(&'static str, &'a str)>> {
    let mut queries = vec![vec![("url", url), ("text", "true")]];
    if let Some(video_id) = video_id {
        queries.push(vec![("videoId", video_id), ("text", "true")]);
    }
    queries.push(vec![("url", url), ("text", "true"), ("lang", "en")]);
    queries
}

fn format_youtube_transcript(
    url: &str,
    video_id: Option<&str>,
    data: &TranscriptResponse,
) -> String {
    let mut formatted = format!("YouTube Video: {}\n", url);
    if let Some(video_id) = video_id {
        formatted.push_str(&format!("Video ID: {}\n", video_id));
    }
    if let Some(lang) = &data.lang {
        formatted.push_str(&format!("Transcript Language: {}\n", lang));
    }
    if let Some(langs) = &data.available_langs {
        if !langs.is_empty() {
            formatted.push_str(&format!("Available Languages: {}\n", langs.join(", ")));
        }
    }
    formatted.push_str("\nTRANSCRIPT:\n\n");
    match &data.content {
        Some(content) => formatted.push_str(content),
        None => formatted.push_str("No transcript content available."),
    }
    formatted
}

fn format_web_content(url: &str, data: &ScrapeResponse) -> String {
    let mut formatted = String::new();
    if let Some(name) = &data.name {
        formatted.push_str(&format!("Title: {}\n", name));
        formatted.push_str(&format!("Source: {}\n\n", url));
    }
    match &data.content {
        Some(content) => formatted.push_str(&format!("CONTENT:\n\n{}", content)),
        None => formatted.push_str("No content available from this website."),
    }
    formatted
}

//=========================================================================================
// The Adapter
//=========================================================================================

/// Talks to the Supadata API.
pub struct SupadataAdapter {
    client: reqwest::Client,
    api_key: String,
}

impl SupadataAdapter {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
        }
    }

    /// One GET against the transcript endpoint. `Ok(None)` means the API
    /// answered with a non-success status (the caller moves on to the next
    /// fallback); transport errors are surfaced.
    async fn try_transcript(
        &self,
        query: &[(&str, &str)],
    ) -> PortResult<Option<TranscriptResponse>> {
        let response = self
            .client
            .get(format!("{}/youtube/transcript", SUPADATA_BASE_URL))
            .header("x-api-key", &self.api_key)
            .query(query)
            .send()
            .await
            .map_err(|e| PortError::Provider(format!("Supadata request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(%status, body = %body, "transcript attempt failed");
            return Ok(None);
        }

        let data = response
            .json::<TranscriptResponse>()
            .await
            .map_err(|e| PortError::Provider(format!("Supadata response unreadable: {}", e)))?;
        Ok(Some(data))
    }
}

#[async_trait]
impl TranscriptService for SupadataAdapter {
    async fn youtube_transcript(&self, url: &str) -> PortResult<String> {
        info!(url, "fetching YouTube transcript");
        let video_id = extract_youtube_id(url);

        for (attempt, query) in transcript_queries(url, video_id.as_deref()).iter().enumerate() {
            if attempt > 0 {
                info!(attempt, "retrying transcript with the next query shape");
            }
            if let Some(data) = self.try_transcript(query).await? {
                return Ok(format_youtube_transcript(url, video_id.as_deref(), &data));
            }
        }

        Ok(NO_TRANSCRIPT_MESSAGE.to_string())
    }

    async fn web_content(&self, url: &str) -> PortResult<String> {
        let response = self
            .client
            .get(format!("{}/web/scrape", SUPADATA_BASE_URL))
            .header("x-api-key", &self.api_key)
            .query(&[("url", url)])
            .send()
            .await
            .map_err(|e| PortError::Provider(format!("Supadata request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(PortError::Provider(format!(
                "Failed to fetch website content: {}",
                status
            )));
        }

        let data = response
            .json::<ScrapeResponse>()
            .await
            .map_err(|e| PortError::Provider(format!("Supadata response unreadable: {}", e)))?;
        Ok(format_web_content(url, &data))
    }
}

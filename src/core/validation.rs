//! URL validation and supported platform detection
//!
//! Whitelist approach: a link is accepted only when it is http(s) and its host
//! is one of the known platform domains or a subdomain of one. Matching on the
//! host (not on the raw text) keeps `https://evil.example/?q=youtube.com` out.

use std::fmt;
use url::{ParseError, Url};

/// Platforms the bot accepts links from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    YouTube,
    TikTok,
    Instagram,
    X,
    Reddit,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::YouTube,
        Platform::TikTok,
        Platform::Instagram,
        Platform::X,
        Platform::Reddit,
    ];

    /// Registrable domains served by this platform
    pub fn domains(self) -> &'static [&'static str] {
        match self {
            Platform::YouTube => &["youtube.com", "youtu.be"],
            Platform::TikTok => &["tiktok.com"],
            Platform::Instagram => &["instagram.com"],
            Platform::X => &["x.com", "twitter.com"],
            Platform::Reddit => &["reddit.com", "v.redd.it"],
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Platform::YouTube => "YouTube",
            Platform::TikTok => "TikTok",
            Platform::Instagram => "Instagram",
            Platform::X => "X/Twitter",
            Platform::Reddit => "Reddit",
        }
    }

    /// Detects the platform from the URL host.
    pub fn detect(url: &Url) -> Option<Platform> {
        if url.scheme() != "http" && url.scheme() != "https" {
            return None;
        }
        let host = url.host_str()?.trim_end_matches('.').to_ascii_lowercase();

        Platform::ALL.into_iter().find(|platform| {
            platform
                .domains()
                .iter()
                .any(|domain| host == *domain || host.ends_with(&format!(".{}", domain)))
        })
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Human-readable list used in "unsupported" replies
pub fn supported_platforms_list() -> String {
    Platform::ALL
        .iter()
        .map(|p| p.display_name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// True for "youtu.be" or "www.youtube.com": dotted labels ending in an
/// alphabetic TLD.
fn looks_like_host(host: &str) -> bool {
    let labels: Vec<&str> = host.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|label| !label.is_empty())
        && labels
            .last()
            .is_some_and(|tld| tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()))
}

/// Parses one token as a link. Scheme-less links ("youtu.be/abc") are
/// retried with `https://`.
fn parse_link(token: &str) -> Option<Url> {
    let token = token.trim_matches(|c| c == '<' || c == '>');
    match Url::parse(token) {
        Ok(url) => Some(url),
        Err(ParseError::RelativeUrlWithoutBase) => {
            let host = token.split(['/', '?', '#']).next().unwrap_or_default();
            if !looks_like_host(host) {
                return None;
            }
            Url::parse(&format!("https://{}", token)).ok()
        }
        Err(_) => None,
    }
}

/// Returns the first whitespace-separated token that parses as an http(s) URL.
pub fn extract_url(text: &str) -> Option<Url> {
    text.split_whitespace()
        .filter_map(parse_link)
        .find(|url| url.scheme() == "http" || url.scheme() == "https")
}

/// Finds a link in the text and checks it belongs to a supported platform.
pub fn detect_supported_url(text: &str) -> Option<(Url, Platform)> {
    let url = extract_url(text)?;
    let platform = Platform::detect(&url)?;
    Some((url, platform))
}

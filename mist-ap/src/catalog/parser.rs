//! Catalog page scraping
//!
//! Result listings embed every sound as a play callback of the form
//! `onclick="play('/media/sounds/x.mp3', 'loader-id', 'slug-1234')"`.
//! Detail pages declare their sound through OpenGraph meta tags.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{SoundDetails, SoundEntry};

static PLAY_CALLBACK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"onclick="play\('(/media/sounds/[^']+)',\s*'[^']*',\s*'([^']+)'\)""#)
        .expect("play callback pattern is valid")
});

static TRAILING_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-\d+$").expect("trailing id pattern is valid"));

static META_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<meta\s[^>]*>").expect("meta tag pattern is valid"));

static META_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\b(?:property|name)\s*=\s*"([^"]+)""#).expect("meta key pattern is valid")
});

static META_CONTENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bcontent\s*=\s*"([^"]*)""#).expect("meta content pattern is valid")
});

/// Human name for a slug: numeric suffix dropped, dashes become spaces
pub fn display_name(slug: &str) -> String {
    TRAILING_ID.replace(slug, "").replace('-', " ")
}

/// Absolute URL for a site-relative path
pub fn absolute_url(base_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else if path.starts_with('/') {
        format!("{}{}", base_url.trim_end_matches('/'), path)
    } else {
        format!("{}/{}", base_url.trim_end_matches('/'), path)
    }
}

/// All sounds listed on a results page, in page order
pub fn parse_results(html: &str, base_url: &str) -> Vec<SoundEntry> {
    PLAY_CALLBACK
        .captures_iter(html)
        .map(|caps| {
            let slug = caps[2].to_string();
            SoundEntry {
                name: display_name(&slug),
                url: absolute_url(base_url, &caps[1]),
                slug,
            }
        })
        .collect()
}

/// Decode the handful of entities that show up in meta content
fn decode_entities(raw: &str) -> String {
    raw.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Value of the first meta tag whose property/name equals `key`
fn meta_content(html: &str, key: &str) -> Option<String> {
    META_TAG.find_iter(html).find_map(|tag| {
        let tag = tag.as_str();
        let found_key = META_KEY.captures(tag)?;
        if !found_key[1].eq_ignore_ascii_case(key) {
            return None;
        }
        let content = META_CONTENT.captures(tag)?;
        Some(decode_entities(content[1].trim()))
    })
}

/// Sound details from a detail page; `None` if the page names no audio
pub fn parse_details(html: &str, slug: &str, base_url: &str) -> Option<SoundDetails> {
    let url = meta_content(html, "og:audio")
        .filter(|u| !u.is_empty())
        .map(|u| absolute_url(base_url, &u))
        .or_else(|| {
            PLAY_CALLBACK
                .captures(html)
                .map(|caps| absolute_url(base_url, &caps[1]))
        })?;

    let title = meta_content(html, "og:title")
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| display_name(slug));

    let description = meta_content(html, "og:description").filter(|d| !d.is_empty());

    Some(SoundDetails {
        slug: slug.to_string(),
        title,
        url,
        description,
        duration_secs: None,
    })
}

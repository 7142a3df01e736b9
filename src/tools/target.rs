//! Challenge page URLs.
//!
//! The Turnstile token is bound to the free-tool page a browser would have
//! loaded, so these always point at the public site regardless of which
//! base URL the data requests go to.

use crate::types::TrafficMode;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

pub const CHALLENGE_ORIGIN: &str = "https://ahrefs.com";

/// Free text (keywords, countries): everything but unreserved characters and `/`.
const TEXT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

/// Domains and URLs keep their `:` so `https://host/path` stays readable.
const TARGET: &AsciiSet = &TEXT.remove(b':');

fn text(s: &str) -> String {
    utf8_percent_encode(s, TEXT).to_string()
}

fn target(s: &str) -> String {
    utf8_percent_encode(s, TARGET).to_string()
}

pub fn backlinks_target(domain: &str) -> String {
    format!(
        "{}/backlink-checker/?input={}&mode=subdomains",
        CHALLENGE_ORIGIN,
        target(domain)
    )
}

pub fn keyword_generator_target(keyword: &str, country: &str) -> String {
    format!(
        "{}/keyword-generator/?country={}&input={}",
        CHALLENGE_ORIGIN,
        text(country),
        text(keyword)
    )
}

pub fn traffic_target(domain_or_url: &str, mode: TrafficMode) -> String {
    format!(
        "{}/traffic-checker/?input={}&mode={}",
        CHALLENGE_ORIGIN,
        target(domain_or_url),
        mode.as_str()
    )
}

pub fn keyword_difficulty_target(keyword: &str, country: &str) -> String {
    format!(
        "{}/keyword-difficulty/?country={}&input={}",
        CHALLENGE_ORIGIN,
        text(country),
        text(keyword)
    )
}

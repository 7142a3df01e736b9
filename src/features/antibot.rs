use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

/// Browser fingerprint sent with every upstream request (UA + matching client hints).
#[derive(Debug, Clone)]
pub struct BrowserProfile {
    pub user_agent: &'static str,
    pub sec_ch_ua: &'static str,
    pub sec_ch_ua_platform: &'static str,
}

pub const BROWSER_PROFILES: &[BrowserProfile] = &[
    // Chrome 131 on Windows 10
    BrowserProfile {
        user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
        sec_ch_ua: r#""Chromium";v="131", "Not_A Brand";v="24", "Google Chrome";v="131""#,
        sec_ch_ua_platform: "\"Windows\"",
    },
    // Chrome 131 on macOS
    BrowserProfile {
        user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
        sec_ch_ua: r#""Chromium";v="131", "Not_A Brand";v="24", "Google Chrome";v="131""#,
        sec_ch_ua_platform: "\"macOS\"",
    },
    // Edge 131 on Windows 11
    BrowserProfile {
        user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36 Edg/131.0.0.0",
        sec_ch_ua: r#""Chromium";v="131", "Not_A Brand";v="24", "Microsoft Edge";v="131""#,
        sec_ch_ua_platform: "\"Windows\"",
    },
    // Chrome 130 on Linux
    BrowserProfile {
        user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/130.0.0.0 Safari/537.36",
        sec_ch_ua: r#""Chromium";v="130", "Not_A Brand";v="24", "Google Chrome";v="130""#,
        sec_ch_ua_platform: "\"Linux\"",
    },
];

/// Pick a random desktop profile.
pub fn get_random_browser_profile() -> &'static BrowserProfile {
    use rand::prelude::*;
    let mut rng = rand::rng();
    &BROWSER_PROFILES[rng.random_range(0..BROWSER_PROFILES.len())]
}

/// Headers for the Ahrefs `/v4/*` XHR endpoints, as the free-tool page sends them.
///
/// `origin` is the upstream base URL; `referer` is the tool page the token was issued for.
pub fn upstream_headers(origin: &str, referer: &str) -> HeaderMap {
    let profile = get_random_browser_profile();
    let pairs: [(&str, &str); 12] = [
        ("accept", "*/*"),
        ("accept-language", "en-US,en;q=0.9"),
        ("content-type", "application/json; charset=utf-8"),
        ("origin", origin),
        ("referer", referer),
        ("user-agent", profile.user_agent),
        ("sec-ch-ua", profile.sec_ch_ua),
        ("sec-ch-ua-mobile", "?0"),
        ("sec-ch-ua-platform", profile.sec_ch_ua_platform),
        ("sec-fetch-dest", "empty"),
        ("sec-fetch-mode", "cors"),
        ("sec-fetch-site", "same-origin"),
    ];

    let mut headers = HeaderMap::with_capacity(pairs.len());
    for (name, value) in pairs {
        // Caller-supplied URLs may carry bytes HeaderValue rejects; drop those headers.
        if let Ok(v) = HeaderValue::from_str(value) {
            headers.insert(HeaderName::from_static(name), v);
        }
    }
    headers
}

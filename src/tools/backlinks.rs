use super::upstream::{self, num, text};
use super::{acquire_token, require_non_empty, target};
use crate::captcha::AccessToken;
use crate::core::error::{SeoError, SeoResult};
use crate::signature_cache::CachedSignature;
use crate::types::{Backlink, BacklinksReport, SignedInput};
use crate::AppState;
use serde_json::{json, Value};
use tracing::{info, warn};

/// Top backlinks for `domain` (subdomains mode) plus the domain overview.
///
/// A cached signed grant is tried first; if upstream rejects it the entry is
/// dropped and the lookup goes through the overview call once. Grants are only
/// cached after the list call accepted them.
pub async fn get_backlinks_list(state: &AppState, domain: &str) -> SeoResult<BacklinksReport> {
    let domain = require_non_empty("domain", domain)?;
    let challenge_url = target::backlinks_target(domain);

    let token = acquire_token(state, &challenge_url).await?;

    if let Some(cached) = state.signature_cache.load(domain).await {
        info!("backlinks: reusing cached signature for {}", domain);
        let signed = SignedInput {
            signature: cached.signature,
            valid_until: cached.valid_until,
        };
        match fetch_backlinks(state, &signed, domain, &challenge_url).await {
            Ok(backlinks) => return Ok(report(domain, cached.overview, backlinks)),
            Err(e @ SeoError::UpstreamQuery { .. }) => {
                warn!("backlinks: cached signature for {} rejected: {}", domain, e);
                state.signature_cache.invalidate(domain).await;
            }
            Err(e) => return Err(e),
        }
    }

    let (signed, overview) = fetch_overview(state, &token, domain, &challenge_url).await?;
    let backlinks = fetch_backlinks(state, &signed, domain, &challenge_url).await?;

    state
        .signature_cache
        .store(
            domain,
            CachedSignature::new(signed.signature, signed.valid_until, overview.clone()),
        )
        .await;

    Ok(report(domain, overview, backlinks))
}

fn report(domain: &str, overview: Value, backlinks: Vec<Backlink>) -> BacklinksReport {
    info!("backlinks: {} entries for {}", backlinks.len(), domain);
    BacklinksReport {
        overview,
        backlinks,
    }
}

/// Signed grant and overview for `domain`, cleared with `token`.
pub async fn fetch_overview(
    state: &AppState,
    token: &AccessToken,
    domain: &str,
    referer: &str,
) -> SeoResult<(SignedInput, Value)> {
    let body = json!({
        "captcha": token.as_str(),
        "mode": "subdomains",
        "url": domain,
    });
    let payload = upstream::post_json(state, upstream::BACKLINKS_OVERVIEW, referer, &body, domain).await?;
    parse_overview(&payload)
        .ok_or_else(|| SeoError::upstream(domain, format!("failed to get signature for domain: {}", domain)))
}

async fn fetch_backlinks(
    state: &AppState,
    signed: &SignedInput,
    domain: &str,
    referer: &str,
) -> SeoResult<Vec<Backlink>> {
    let body = json!({
        "reportType": "TopBacklinks",
        "signedInput": {
            "signature": signed.signature,
            "input": {
                "validUntil": signed.valid_until,
                "mode": "subdomains",
                "url": format!("{}/", domain),
            }
        }
    });
    let payload = upstream::post_json(state, upstream::BACKLINKS_LIST, referer, &body, domain).await?;
    parse_backlinks(&payload).ok_or_else(|| SeoError::upstream(domain, "backlinks list missing from response"))
}

/// `signedInput.signature`, `signedInput.input.validUntil` and `data`.
pub fn parse_overview(payload: &Value) -> Option<(SignedInput, Value)> {
    let signed = payload.get("signedInput")?;
    let signature = signed
        .get("signature")
        .and_then(|s| s.as_str())
        .filter(|s| !s.is_empty())?
        .to_string();
    let valid_until = signed
        .get("input")
        .and_then(|i| i.get("validUntil"))
        .filter(|v| !v.is_null())?
        .clone();
    let overview = payload.get("data").cloned().unwrap_or(Value::Null);

    Some((
        SignedInput {
            signature,
            valid_until,
        },
        overview,
    ))
}

/// `topBacklinks.backlinks[]`; an empty list is a valid answer.
pub fn parse_backlinks(payload: &Value) -> Option<Vec<Backlink>> {
    let items = payload
        .get("topBacklinks")?
        .get("backlinks")?
        .as_array()?;

    Some(
        items
            .iter()
            .map(|b| Backlink {
                anchor: text(b, "anchor", ""),
                domain_rating: num(b, "domainRating"),
                title: text(b, "title", ""),
                url_from: text(b, "urlFrom", ""),
                url_to: text(b, "urlTo", ""),
                edu: b.get("edu").and_then(|v| v.as_bool()).unwrap_or(false),
                gov: b.get("gov").and_then(|v| v.as_bool()).unwrap_or(false),
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overview_requires_signature_and_validity() {
        let ok = json!({
            "signedInput": {"signature": "abc", "input": {"validUntil": "2099-01-01T00:00:00Z"}},
            "data": {"domainRating": 77}
        });
        let (signed, overview) = parse_overview(&ok).unwrap();
        assert_eq!(signed.signature, "abc");
        assert_eq!(overview, json!({"domainRating": 77}));

        let no_sig = json!({"signedInput": {"input": {"validUntil": 1}}, "data": {}});
        assert!(parse_overview(&no_sig).is_none());

        let no_valid = json!({"signedInput": {"signature": "abc", "input": {}}, "data": {}});
        assert!(parse_overview(&no_valid).is_none());
    }

    #[test]
    fn backlinks_fill_defaults_for_missing_fields() {
        let payload = json!({"topBacklinks": {"backlinks": [
            {"anchor": "docs", "domainRating": 88, "title": "T", "urlFrom": "https://a", "urlTo": "https://b", "edu": true},
            {"urlFrom": "https://c"}
        ]}});
        let links = parse_backlinks(&payload).unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].domain_rating, 88.0);
        assert!(links[0].edu);
        assert!(!links[0].gov);
        assert_eq!(links[1].anchor, "");
        assert_eq!(links[1].url_from, "https://c");
    }

    #[test]
    fn empty_backlinks_are_not_an_error() {
        let payload = json!({"topBacklinks": {"backlinks": []}});
        assert_eq!(parse_backlinks(&payload), Some(vec![]));
        assert!(parse_backlinks(&json!({})).is_none());
    }
}

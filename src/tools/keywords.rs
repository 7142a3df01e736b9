use super::upstream::{self, num, text};
use super::{acquire_token, require_non_empty, target};
use crate::core::error::{SeoError, SeoResult};
use crate::types::{IdeaKind, KeywordDifficulty, KeywordIdea, SerpEntry};
use crate::AppState;
use serde_json::{json, Value};
use std::collections::HashSet;
use tracing::info;

/// Keyword and question ideas for `keyword`.
pub async fn keyword_ideas(
    state: &AppState,
    keyword: &str,
    country: &str,
    search_engine: &str,
) -> SeoResult<Vec<KeywordIdea>> {
    let keyword = require_non_empty("keyword", keyword)?;
    let challenge_url = target::keyword_generator_target(keyword, country);
    let token = acquire_token(state, &challenge_url).await?;

    let body = json!({
        "withQuestionIdeas": true,
        "captcha": token.as_str(),
        "searchEngine": search_engine,
        "country": country,
        "keyword": ["Some", keyword],
    });
    let payload = upstream::post_json(state, upstream::KEYWORD_IDEAS, &challenge_url, &body, keyword).await?;
    let ideas = parse_keyword_ideas(&payload)
        .ok_or_else(|| SeoError::upstream(keyword, "no keyword ideas in response"))?;

    info!("keywords: {} ideas for '{}'", ideas.len(), keyword);
    Ok(ideas)
}

/// Suggested keyword strings, ideas first then questions, without duplicates.
pub async fn keyword_generator(
    state: &AppState,
    keyword: &str,
    country: &str,
    search_engine: &str,
) -> SeoResult<Vec<String>> {
    let ideas = keyword_ideas(state, keyword, country, search_engine).await?;
    Ok(suggestions(&ideas))
}

pub fn suggestions(ideas: &[KeywordIdea]) -> Vec<String> {
    let mut seen = HashSet::new();
    ideas
        .iter()
        .filter(|i| !i.keyword.is_empty())
        .filter(|i| seen.insert(i.keyword.to_lowercase()))
        .map(|i| i.keyword.clone())
        .collect()
}

/// `allIdeas.results[]` and `questionIdeas.results[]`. `None` when neither
/// section is present; both present but empty is a valid empty answer.
pub fn parse_keyword_ideas(payload: &Value) -> Option<Vec<KeywordIdea>> {
    let sections = [
        ("allIdeas", IdeaKind::Idea),
        ("questionIdeas", IdeaKind::Question),
    ];

    let mut found_any = false;
    let mut ideas = Vec::new();
    for (key, kind) in sections {
        let Some(results) = payload
            .get(key)
            .and_then(|s| s.get("results"))
            .and_then(|r| r.as_array())
        else {
            continue;
        };
        found_any = true;
        ideas.extend(results.iter().map(|idea| KeywordIdea {
            keyword: text(idea, "keyword", ""),
            country: text(idea, "country", "-"),
            difficulty: label(idea, "difficultyLabel"),
            volume: label(idea, "volumeLabel"),
            updated_at: text(idea, "updatedAt", "-"),
            kind,
        }));
    }

    found_any.then_some(ideas)
}

/// Labels are usually strings but occasionally bare numbers.
fn label(v: &Value, key: &str) -> String {
    match v.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => "Unknown".to_string(),
    }
}

/// Difficulty score and the organic SERP behind it.
pub async fn keyword_difficulty(
    state: &AppState,
    keyword: &str,
    country: &str,
) -> SeoResult<KeywordDifficulty> {
    let keyword = require_non_empty("keyword", keyword)?;
    let challenge_url = target::keyword_difficulty_target(keyword, country);
    let token = acquire_token(state, &challenge_url).await?;

    let body = json!({
        "captcha": token.as_str(),
        "country": country,
        "keyword": keyword,
    });
    let payload =
        upstream::post_json(state, upstream::KEYWORD_DIFFICULTY, &challenge_url, &body, keyword).await?;
    let kd = parse_keyword_difficulty(&payload)
        .ok_or_else(|| SeoError::upstream(keyword, "no difficulty data in response"))?;

    info!("keywords: difficulty {} for '{}'", kd.difficulty, keyword);
    Ok(kd)
}

pub fn parse_keyword_difficulty(payload: &Value) -> Option<KeywordDifficulty> {
    // Without a score the rest of the payload is meaningless.
    if payload.get("difficulty").map_or(true, Value::is_null) {
        return None;
    }

    let serp = payload
        .get("serp")
        .and_then(|s| s.get("results"))
        .and_then(|r| r.as_array())
        .map(|items| items.iter().filter_map(parse_serp_entry).collect())
        .unwrap_or_default();

    Some(KeywordDifficulty {
        difficulty: num(payload, "difficulty"),
        shortage: num(payload, "shortage"),
        last_update: text(payload, "lastUpdate", ""),
        serp,
    })
}

/// Organic rows look like
/// `{"pos": 1, "content": ["organic", {"link": ["Some", {"title", "url": [_, {"url"}], "metrics"}]}]}`.
/// Everything else (ads, features) is skipped.
fn parse_serp_entry(item: &Value) -> Option<SerpEntry> {
    let content = item.get("content")?.as_array()?;
    if content.first()?.as_str()? != "organic" {
        return None;
    }
    let link = content.get(1)?.get("link")?.as_array()?;
    if link.first()?.as_str()? != "Some" {
        return None;
    }
    let link = link.get(1)?;

    let url = link
        .get("url")
        .and_then(|u| u.get(1))
        .and_then(|u| u.get("url"))
        .and_then(|u| u.as_str())
        .unwrap_or_default()
        .to_string();

    let mut entry = SerpEntry {
        title: text(link, "title", ""),
        url,
        position: item.get("pos").and_then(|p| p.as_i64()).unwrap_or(0),
        domain_rating: None,
        url_rating: None,
        traffic: None,
        keywords: None,
        top_keyword: None,
        top_volume: None,
    };

    if let Some(metrics) = link.get("metrics").filter(|m| m.is_object()) {
        entry.domain_rating = Some(num(metrics, "domainRating"));
        entry.url_rating = Some(num(metrics, "urlRating"));
        entry.traffic = Some(num(metrics, "traffic"));
        entry.keywords = Some(num(metrics, "keywords"));
        entry.top_keyword = Some(text(metrics, "topKeyword", ""));
        entry.top_volume = Some(num(metrics, "topVolume"));
    }

    Some(entry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ideas_and_questions_are_both_collected() {
        let payload = json!({
            "allIdeas": {"results": [
                {"keyword": "rust tutorial", "country": "us", "difficultyLabel": "Easy", "volumeLabel": "1K-10K", "updatedAt": "2025-01-01"}
            ]},
            "questionIdeas": {"results": [
                {"keyword": "is rust hard", "volumeLabel": 500}
            ]}
        });
        let ideas = parse_keyword_ideas(&payload).unwrap();
        assert_eq!(ideas.len(), 2);
        assert_eq!(ideas[0].kind, IdeaKind::Idea);
        assert_eq!(ideas[0].difficulty, "Easy");
        assert_eq!(ideas[1].kind, IdeaKind::Question);
        assert_eq!(ideas[1].volume, "500");
        assert_eq!(ideas[1].difficulty, "Unknown");
        assert_eq!(ideas[1].country, "-");
    }

    #[test]
    fn missing_sections_are_not_an_empty_success() {
        assert!(parse_keyword_ideas(&json!({})).is_none());
        assert_eq!(
            parse_keyword_ideas(&json!({"allIdeas": {"results": []}})),
            Some(vec![])
        );
    }

    #[test]
    fn suggestions_drop_duplicates_and_blanks() {
        let idea = |k: &str| KeywordIdea {
            keyword: k.to_string(),
            country: "us".into(),
            difficulty: "Easy".into(),
            volume: "10".into(),
            updated_at: "-".into(),
            kind: IdeaKind::Idea,
        };
        let got = suggestions(&[idea("Rust"), idea(""), idea("rust"), idea("cargo")]);
        assert_eq!(got, vec!["Rust".to_string(), "cargo".to_string()]);
    }

    #[test]
    fn difficulty_keeps_only_organic_rows() {
        let payload = json!({
            "difficulty": 42,
            "shortage": 3,
            "lastUpdate": "2025-02-02",
            "serp": {"results": [
                {"pos": 1, "content": ["organic", {"link": ["Some", {
                    "title": "The Rust Book",
                    "url": ["Url", {"url": "https://doc.rust-lang.org/book/"}],
                    "metrics": {"domainRating": 90, "urlRating": 60, "traffic": 1000, "keywords": 50, "topKeyword": "rust book", "topVolume": 9000}
                }]}]},
                {"pos": 2, "content": ["ads", {}]},
                {"pos": 3, "content": ["organic", {"link": ["None"]}]},
                {"pos": 4, "content": ["organic", {"link": ["Some", {"title": "No metrics"}]}]}
            ]}
        });
        let kd = parse_keyword_difficulty(&payload).unwrap();
        assert_eq!(kd.difficulty, 42.0);
        assert_eq!(kd.serp.len(), 2);
        assert_eq!(kd.serp[0].url, "https://doc.rust-lang.org/book/");
        assert_eq!(kd.serp[0].domain_rating, Some(90.0));
        assert_eq!(kd.serp[1].position, 4);
        assert_eq!(kd.serp[1].traffic, None);
    }

    #[test]
    fn difficulty_score_is_required() {
        assert!(parse_keyword_difficulty(&json!([1, 2])).is_none());
        assert!(parse_keyword_difficulty(&json!({})).is_none());
        assert!(parse_keyword_difficulty(&json!({"difficulty": null, "serp": {"results": []}})).is_none());

        let zero = parse_keyword_difficulty(&json!({"difficulty": 0})).unwrap();
        assert_eq!(zero.difficulty, 0.0);
        assert!(zero.serp.is_empty());
    }
}

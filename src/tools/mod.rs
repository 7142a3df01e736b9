pub mod backlinks;
pub mod keywords;
pub mod target;
pub mod traffic;
pub mod upstream;

use crate::captcha::AccessToken;
use crate::core::error::{SeoError, SeoResult};
use crate::AppState;
use tracing::{info, warn};

pub use backlinks::get_backlinks_list;
pub use keywords::{keyword_difficulty, keyword_generator, keyword_ideas};
pub use traffic::get_traffic;

/// Clear the challenge for `target_url` through the state's broker.
///
/// Every query goes through here before touching upstream.
pub async fn acquire_token(state: &AppState, target_url: &str) -> SeoResult<AccessToken> {
    match state.broker.acquire(target_url).await {
        Ok(token) => {
            info!("token acquired for {}", target_url);
            Ok(token)
        }
        Err(e) => {
            warn!("token acquisition failed for {}: {}", target_url, e);
            Err(SeoError::from_token(target_url, e))
        }
    }
}

/// Trimmed, non-empty argument value.
pub(crate) fn require_non_empty<'a>(name: &str, value: &'a str) -> SeoResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(SeoError::InvalidArgument(format!("{} must not be empty", name)));
    }
    Ok(value)
}

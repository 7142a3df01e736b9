use std::time::Duration;
use thiserror::Error;

/// Failures at the token broker boundary.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("CAPSOLVER_API_KEY is not set")]
    MissingApiKey,

    #[error("solver rejected the task: {0}")]
    Submission(String),

    #[error("solver reported failure: {0}")]
    SolverFailed(String),

    #[error("solver returned a ready task without a token")]
    MalformedSolution,

    #[error("no solution after {polls} polls in {waited:?}")]
    Timeout { polls: u32, waited: Duration },

    #[error("error communicating with solver: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Failures surfaced by the query functions and, through them, by every tool.
#[derive(Debug, Error)]
pub enum SeoError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("failed to get verification token for URL: {url}: {source}")]
    TokenAcquisition {
        url: String,
        #[source]
        source: TokenError,
    },

    #[error("timed out waiting for verification token for URL: {url} ({polls} polls in {waited:?})")]
    TokenTimeout {
        url: String,
        polls: u32,
        waited: Duration,
    },

    #[error("no usable data for {input}: {reason}")]
    UpstreamQuery { input: String, reason: String },

    #[error("request failed for {input}: {source}")]
    Transport {
        input: String,
        #[source]
        source: reqwest::Error,
    },
}

impl SeoError {
    /// Lift a broker failure into the query taxonomy, keeping the challenge URL.
    pub fn from_token(url: &str, err: TokenError) -> Self {
        match err {
            TokenError::MissingApiKey => SeoError::Configuration(format!(
                "CAPSOLVER_API_KEY is not set (needed for {})",
                url
            )),
            TokenError::Timeout { polls, waited } => SeoError::TokenTimeout {
                url: url.to_string(),
                polls,
                waited,
            },
            other => SeoError::TokenAcquisition {
                url: url.to_string(),
                source: other,
            },
        }
    }

    pub fn upstream(input: impl Into<String>, reason: impl Into<String>) -> Self {
        SeoError::UpstreamQuery {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub fn transport(input: impl Into<String>, source: reqwest::Error) -> Self {
        SeoError::Transport {
            input: input.into(),
            source,
        }
    }

    /// Stable machine-readable kind, echoed to tool clients.
    pub fn kind(&self) -> &'static str {
        match self {
            SeoError::Configuration(_) => "configuration_error",
            SeoError::InvalidArgument(_) => "invalid_argument",
            SeoError::TokenAcquisition { .. } => "token_acquisition_error",
            SeoError::TokenTimeout { .. } => "timeout_error",
            SeoError::UpstreamQuery { .. } => "upstream_query_error",
            SeoError::Transport { .. } => "transport_error",
        }
    }
}

pub type SeoResult<T> = Result<T, SeoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_maps_to_configuration() {
        let err = SeoError::from_token("https://ahrefs.com/x", TokenError::MissingApiKey);
        assert_eq!(err.kind(), "configuration_error");
        assert!(err.to_string().contains("CAPSOLVER_API_KEY"));
    }

    #[test]
    fn timeout_stays_distinct_from_solver_failure() {
        let timeout = SeoError::from_token(
            "u",
            TokenError::Timeout {
                polls: 3,
                waited: Duration::from_secs(6),
            },
        );
        let failed = SeoError::from_token("u", TokenError::SolverFailed("ERROR_CAPTCHA_UNSOLVABLE".into()));
        assert_eq!(timeout.kind(), "timeout_error");
        assert_eq!(failed.kind(), "token_acquisition_error");
        assert!(failed.to_string().contains("URL: u"));
    }
}

//! Configuration of the generative data service client.

use crate::service::error::DataFetchError;
use bon::Builder;
use std::env;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Environment variables checked, in order, for the API key.
pub const API_KEY_VARS: [&str; 2] = ["API_KEY", "GEMINI_API_KEY"];

/// Settings for [`crate::GeminiClient`].
///
/// # Examples
///
/// ```
/// use weather_dash::ServiceConfig;
///
/// let config = ServiceConfig::builder()
///     .api_key("secret".to_string())
///     .build();
/// assert_eq!(config.model, "gemini-2.5-flash");
/// ```
#[derive(Debug, Clone, Builder)]
pub struct ServiceConfig {
    pub api_key: String,
    #[builder(default = DEFAULT_MODEL.to_string())]
    pub model: String,
    #[builder(default = DEFAULT_BASE_URL.to_string())]
    pub base_url: String,
}

impl ServiceConfig {
    /// Reads the API key from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`DataFetchError::MissingCredential`] when none of
    /// [`API_KEY_VARS`] is set to a non-empty value.
    pub fn from_env() -> Result<Self, DataFetchError> {
        let api_key = API_KEY_VARS
            .iter()
            .find_map(|var| env::var(var).ok().filter(|value| !value.trim().is_empty()))
            .ok_or(DataFetchError::MissingCredential(API_KEY_VARS[0]))?;
        Ok(Self::builder().api_key(api_key).build())
    }

    pub(crate) fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

use super::error::{RestDaoError, RestResult};

/// Runtime configuration describing how to reach the PostgREST endpoint.
#[derive(Clone)]
pub struct RestConfig {
    /// Base URL of the REST API, e.g. `https://<project>.supabase.co/rest/v1`.
    pub base_url: String,
    /// Key sent both as `apikey` and as bearer token.
    pub api_key: Option<String>,
}

impl std::fmt::Debug for RestConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

impl RestConfig {
    /// Construct a configuration for an endpoint without credentials.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
        }
    }

    /// Attach the service key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Build a configuration from `POSTGREST_URL` and `POSTGREST_API_KEY`.
    pub fn from_env() -> RestResult<Self> {
        let base_url = std::env::var("POSTGREST_URL").map_err(|_| RestDaoError::MissingEnvVar {
            var: "POSTGREST_URL",
        })?;

        let config = Self::new(base_url);
        Ok(match std::env::var("POSTGREST_API_KEY") {
            Ok(key) if !key.trim().is_empty() => config.with_api_key(key.trim()),
            _ => config,
        })
    }
}

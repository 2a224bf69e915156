use std::fmt::Debug;

/// Builder for [`RelayConfig`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct RelayConfigBuilder {
    api_key: String,
    customer_id: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
    system_prompt: Option<String>,
}

impl RelayConfigBuilder {
    /// Creates a builder with the given upstream API key.
    #[inline]
    pub fn with_api_key<S: Into<String>>(api_key: S) -> Self {
        Self {
            api_key: api_key.into(),
            customer_id: None,
            model: None,
            base_url: None,
            system_prompt: None,
        }
    }

    /// Sets the customer identifier forwarded to the upstream.
    #[inline]
    pub fn with_customer_id<S: Into<String>>(mut self, id: S) -> Self {
        self.customer_id = Some(id.into());
        self
    }

    /// Sets the model to use.
    #[inline]
    pub fn with_model<S: Into<String>>(mut self, model: S) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets a custom base URL.
    #[inline]
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Replaces the persona prompt prepended to every upstream request.
    #[inline]
    pub fn with_system_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Builds the configuration.
    #[inline]
    pub fn build(self) -> RelayConfig {
        RelayConfig {
            api_key: self.api_key,
            customer_id: self.customer_id,
            model: self.model.unwrap_or_else(|| "gpt-4o-mini".to_string()),
            base_url: self
                .base_url
                .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            system_prompt: self.system_prompt.unwrap_or_else(|| {
                include_str!("./system_prompt.md").to_string()
            }),
        }
    }
}

impl Debug for RelayConfigBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayConfigBuilder")
            .field("api_key", &"<redacted>")
            .field("customer_id", &self.customer_id)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Configuration for the relay's upstream call.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct RelayConfig {
    pub(crate) api_key: String,
    pub(crate) customer_id: Option<String>,
    pub(crate) model: String,
    pub(crate) base_url: String,
    pub(crate) system_prompt: String,
}

impl Debug for RelayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayConfig")
            .field("api_key", &"<redacted>")
            .field("customer_id", &self.customer_id)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

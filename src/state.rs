//! Application state: the variant registry and the optional model requester.
//!
//! Both are built once at startup and only read afterwards, so handlers share
//! the state through an `Arc` without any locking.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::config::load_agent_config_from_env;
use crate::openai::OpenAI;
use crate::registry::{RegistryError, VariantRegistry};
use crate::requester::StructuredOutputRequester;

pub struct AppState {
    pub registry: VariantRegistry,
    pub requester: Option<Arc<dyn StructuredOutputRequester>>,
}

impl AppState {
    /// Build state from env: load config, build the registry, init OpenAI.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Result<Self, RegistryError> {
        let cfg = load_agent_config_from_env().unwrap_or_default();
        let registry = VariantRegistry::new()?;

        let requester: Option<Arc<dyn StructuredOutputRequester>> =
            match OpenAI::from_env(cfg.prompts, cfg.sampling) {
                Some(oa) => {
                    info!(target: "quizmaster_backend", base_url = %oa.base_url, model = %oa.model, "OpenAI enabled.");
                    Some(Arc::new(oa))
                }
                None => {
                    info!(target: "quizmaster_backend", "OpenAI disabled (no OPENAI_API_KEY). Serving built-in questions.");
                    None
                }
            };

        Ok(Self::with_requester(registry, requester))
    }

    /// State with an explicit requester (or none).
    pub fn with_requester(
        registry: VariantRegistry,
        requester: Option<Arc<dyn StructuredOutputRequester>>,
    ) -> Self {
        Self { registry, requester }
    }
}

//! Cloudflare Workers setup workflow (deploy capability)
//!
//! wrangler has no command that enumerates existing Workers, so discovery
//! only verifies that the session is authenticated and reports nothing
//! owned. The flow then always walks the create path, which for Workers
//! just reserves a valid name; the Worker itself materializes on first
//! deploy.

use super::flow::{Resource, ResourceProvider};
use super::{run_provider_cli, ProviderError};
use crate::config::{sanitize_name, DeployConfig};
use crate::exec::{SessionContext, NETWORK_TIMEOUT};
use crate::prompt::Prompter;
use async_trait::async_trait;

const DASHBOARD_URL: &str = "https://dash.cloudflare.com";

pub struct CloudflareProvider;

/// Worker names are DNS labels: lowercase alphanumerics and hyphens, no
/// leading/trailing hyphen, at most 63 characters.
pub(crate) fn is_valid_worker_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 63
        && !name.starts_with('-')
        && !name.ends_with('-')
        && name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

#[async_trait]
impl ResourceProvider for CloudflareProvider {
    type Config = DeployConfig;

    fn capability(&self) -> &'static str {
        "deploy"
    }
    fn display_name(&self) -> &'static str {
        "Cloudflare"
    }
    fn resource_noun(&self) -> &'static str {
        "worker"
    }
    fn derived_name(&self, project: &str) -> String {
        format!("{}-api", sanitize_name(project))
    }

    async fn list(&self, session: &SessionContext) -> Result<Vec<Resource>, ProviderError> {
        let out =
            run_provider_cli(session, "wrangler", &["whoami"], NETWORK_TIMEOUT).await;
        if !out.success || out.combined().to_lowercase().contains("not authenticated") {
            return Err(ProviderError::NotAuthenticated { provider: "Cloudflare" });
        }
        Ok(Vec::new())
    }

    async fn create(
        &self,
        _session: &SessionContext,
        name: &str,
    ) -> Result<Resource, ProviderError> {
        if !is_valid_worker_name(name) {
            return Err(ProviderError::transient(format!(
                "'{name}' is not a valid worker name (lowercase letters, digits, hyphens)"
            )));
        }
        Ok(Resource { id: name.to_string(), name: name.to_string() })
    }

    async fn extract(
        &self,
        _session: &SessionContext,
        _prompter: &dyn Prompter,
        resource: &Resource,
    ) -> Result<DeployConfig, ProviderError> {
        Ok(DeployConfig { worker_name: resource.name.clone() })
    }

    async fn manual(&self, prompter: &dyn Prompter) -> Result<DeployConfig, ProviderError> {
        super::print_manual_steps(
            "Cloudflare",
            DASHBOARD_URL,
            &[
                "Sign in to the Cloudflare dashboard",
                "Pick (or make up) a name for the API Worker",
            ],
        );
        loop {
            let name = prompter.input("Worker name", false)?;
            if is_valid_worker_name(&name) {
                return Ok(DeployConfig { worker_name: name });
            }
            println!("  worker names are lowercase letters, digits, and hyphens (max 63)");
        }
    }
}

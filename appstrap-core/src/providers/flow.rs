//! Generic resource provisioning flow
//!
//! Every provider setup shares the same shape: list what the account
//! already owns, create or select a resource, extract its credentials,
//! and fall back to manual entry when automation fails. The flow is
//! parameterized by a [`ResourceProvider`] capability set so each provider
//! only supplies its discovery/create/extract specifics.

use super::ProviderError;
use crate::exec::SessionContext;
use crate::prompt::Prompter;
use async_trait::async_trait;
use colored::Colorize;
use tracing::{info, warn};

/// Bounded attempt count for automatic name-suffix retries on collisions.
const MAX_NAME_ATTEMPTS: u32 = 10;

/// An existing remote resource (project, database, worker).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub id: String,
    pub name: String,
}

/// Provider-specific half of the provisioning flow.
#[async_trait]
pub trait ResourceProvider: Send + Sync {
    type Config: Send;

    /// Capability this provider serves ("auth", "database", "deploy").
    fn capability(&self) -> &'static str;
    fn display_name(&self) -> &'static str;
    /// What the provider calls its resources ("project", "database", "worker").
    fn resource_noun(&self) -> &'static str;
    /// Name derived from the project name, e.g. `<project>-db`.
    fn derived_name(&self, project: &str) -> String;

    /// List resources owned by the authenticated identity.
    async fn list(&self, session: &SessionContext) -> Result<Vec<Resource>, ProviderError>;

    /// Create a resource with the given name. Must classify name
    /// collisions as [`ProviderError::NameConflict`].
    async fn create(
        &self,
        session: &SessionContext,
        name: &str,
    ) -> Result<Resource, ProviderError>;

    /// Retrieve connection/config credentials for a resource.
    async fn extract(
        &self,
        session: &SessionContext,
        prompter: &dyn Prompter,
        resource: &Resource,
    ) -> Result<Self::Config, ProviderError>;

    /// Human-driven copy-paste credential entry.
    async fn manual(&self, prompter: &dyn Prompter) -> Result<Self::Config, ProviderError>;
}

/// `name` on the first attempt, `name-N` afterwards.
pub(crate) fn suffixed(name: &str, attempt: u32) -> String {
    if attempt <= 1 {
        name.to_string()
    } else {
        format!("{name}-{attempt}")
    }
}

/// Selection items: existing resource names plus a "create new" escape.
pub(crate) fn choice_items(resources: &[Resource], noun: &str) -> Vec<String> {
    let mut items: Vec<String> = resources.iter().map(|r| r.name.clone()).collect();
    items.push(format!("Create a new {noun}"));
    items
}

async fn create_with_suffix<P: ResourceProvider>(
    session: &SessionContext,
    provider: &P,
    base: &str,
) -> Result<Resource, ProviderError> {
    let mut attempt = 1;
    loop {
        let name = suffixed(base, attempt);
        match provider.create(session, &name).await {
            Ok(resource) => {
                println!(
                    "  {} created {} '{}'",
                    "✓".green(),
                    provider.resource_noun(),
                    resource.name
                );
                return Ok(resource);
            }
            Err(ProviderError::NameConflict { .. }) if attempt < MAX_NAME_ATTEMPTS => {
                info!("name '{}' taken, retrying with a suffix", name);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Run the full discovery → create-or-select → extract flow for one
/// provider, with the manual path as the fallback for extraction and
/// discovery failures. Policy blocks, authentication failures, and user
/// declines propagate untouched for the retry wrapper to classify.
pub async fn provision<P: ResourceProvider>(
    session: &SessionContext,
    prompter: &dyn Prompter,
    provider: &P,
    project_name: &str,
) -> Result<P::Config, ProviderError> {
    info!("setting up {} ({})", provider.display_name(), provider.capability());

    let resources = match provider.list(session).await {
        Ok(resources) => resources,
        Err(e) if e.is_policy() || e.is_decline() => return Err(e),
        Err(ProviderError::NotAuthenticated { provider }) => {
            return Err(ProviderError::NotAuthenticated { provider });
        }
        Err(e) => {
            warn!("discovery failed ({e}); using manual entry");
            return provider.manual(prompter).await;
        }
    };

    let derived = provider.derived_name(project_name);
    let selected = if resources.is_empty() {
        let question = format!(
            "No existing {} found. Create '{}'?",
            provider.resource_noun(),
            derived
        );
        if !session.fast && !prompter.confirm(&question, true)? {
            return Err(ProviderError::declined(format!(
                "creating a {} on {}",
                provider.resource_noun(),
                provider.display_name()
            )));
        }
        create_with_suffix(session, provider, &derived).await?
    } else if session.fast {
        // Fast mode never prompts; reuse what is already there.
        info!("fast mode: selecting existing {} '{}'", provider.resource_noun(), resources[0].name);
        resources[0].clone()
    } else {
        let items = choice_items(&resources, provider.resource_noun());
        let question =
            format!("Select a {} {}", provider.display_name(), provider.resource_noun());
        let index = prompter.select(&question, &items, 0)?;
        if index == resources.len() {
            create_with_suffix(session, provider, &derived).await?
        } else {
            resources[index].clone()
        }
    };

    match provider.extract(session, prompter, &selected).await {
        Ok(config) => Ok(config),
        Err(e) if e.is_policy() || e.is_decline() => Err(e),
        Err(e) => {
            warn!("credential extraction failed ({e}); using manual entry");
            println!(
                "  {} could not read credentials automatically, switching to manual entry",
                "!".yellow()
            );
            provider.manual(prompter).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::testing::MockRunner;
    use crate::prompt::scripted::ScriptedPrompter;
    use crate::providers::PolicyKind;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    struct MockProvider {
        existing: Vec<Resource>,
        conflicts_before_success: usize,
        extract_fails: bool,
        list_error: Option<fn() -> ProviderError>,
        created: Mutex<Vec<String>>,
        manual_calls: AtomicUsize,
    }

    impl MockProvider {
        fn new() -> Self {
            Self {
                existing: Vec::new(),
                conflicts_before_success: 0,
                extract_fails: false,
                list_error: None,
                created: Mutex::new(Vec::new()),
                manual_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ResourceProvider for MockProvider {
        type Config = String;

        fn capability(&self) -> &'static str {
            "database"
        }
        fn display_name(&self) -> &'static str {
            "MockDB"
        }
        fn resource_noun(&self) -> &'static str {
            "database"
        }
        fn derived_name(&self, project: &str) -> String {
            format!("{project}-db")
        }

        async fn list(&self, _: &SessionContext) -> Result<Vec<Resource>, ProviderError> {
            match self.list_error {
                Some(make) => Err(make()),
                None => Ok(self.existing.clone()),
            }
        }

        async fn create(
            &self,
            _: &SessionContext,
            name: &str,
        ) -> Result<Resource, ProviderError> {
            let mut created = self.created.lock().unwrap();
            created.push(name.to_string());
            if created.len() <= self.conflicts_before_success {
                return Err(ProviderError::conflict(name));
            }
            Ok(Resource { id: format!("id-{name}"), name: name.to_string() })
        }

        async fn extract(
            &self,
            _: &SessionContext,
            _: &dyn Prompter,
            resource: &Resource,
        ) -> Result<String, ProviderError> {
            if self.extract_fails {
                Err(ProviderError::transient("extraction broke"))
            } else {
                Ok(format!("url-for-{}", resource.id))
            }
        }

        async fn manual(&self, _: &dyn Prompter) -> Result<String, ProviderError> {
            self.manual_calls.fetch_add(1, Ordering::SeqCst);
            Ok("manual-url".to_string())
        }
    }

    fn session(fast: bool) -> SessionContext {
        SessionContext::new(Arc::new(MockRunner::new()), fast, false)
    }

    #[tokio::test]
    async fn empty_discovery_creates_derived_name() {
        let provider = MockProvider::new();
        let prompter = ScriptedPrompter::new().push_confirm(true);
        let config = provision(&session(false), &prompter, &provider, "my-app").await.unwrap();
        assert_eq!(config, "url-for-id-my-app-db");
        assert_eq!(*provider.created.lock().unwrap(), vec!["my-app-db"]);
    }

    #[tokio::test]
    async fn name_conflicts_retry_with_numeric_suffix() {
        let provider = MockProvider { conflicts_before_success: 2, ..MockProvider::new() };
        let prompter = ScriptedPrompter::new().push_confirm(true);
        provision(&session(false), &prompter, &provider, "my-app").await.unwrap();
        assert_eq!(
            *provider.created.lock().unwrap(),
            vec!["my-app-db", "my-app-db-2", "my-app-db-3"]
        );
    }

    #[tokio::test]
    async fn conflict_retries_are_bounded() {
        let provider = MockProvider { conflicts_before_success: 99, ..MockProvider::new() };
        let prompter = ScriptedPrompter::new().push_confirm(true);
        let result = provision(&session(false), &prompter, &provider, "my-app").await;
        assert!(matches!(result, Err(ProviderError::NameConflict { .. })));
        assert_eq!(provider.created.lock().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn fast_mode_selects_first_existing_without_prompts() {
        let provider = MockProvider {
            existing: vec![
                Resource { id: "a".into(), name: "first-db".into() },
                Resource { id: "b".into(), name: "second-db".into() },
            ],
            ..MockProvider::new()
        };
        let prompter = ScriptedPrompter::new();
        let config = provision(&session(true), &prompter, &provider, "my-app").await.unwrap();
        assert_eq!(config, "url-for-a");
        assert!(prompter.questions().is_empty());
    }

    #[tokio::test]
    async fn create_new_escape_option_is_honored() {
        let provider = MockProvider {
            existing: vec![Resource { id: "a".into(), name: "first-db".into() }],
            ..MockProvider::new()
        };
        // index 1 = "Create a new database"
        let prompter = ScriptedPrompter::new().push_select(1);
        provision(&session(false), &prompter, &provider, "my-app").await.unwrap();
        assert_eq!(*provider.created.lock().unwrap(), vec!["my-app-db"]);
    }

    #[tokio::test]
    async fn extraction_failure_falls_back_to_manual() {
        let provider = MockProvider { extract_fails: true, ..MockProvider::new() };
        let prompter = ScriptedPrompter::new().push_confirm(true);
        let config = provision(&session(false), &prompter, &provider, "my-app").await.unwrap();
        assert_eq!(config, "manual-url");
        assert_eq!(provider.manual_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn policy_blocks_propagate_instead_of_manual() {
        let provider = MockProvider {
            list_error: Some(|| {
                ProviderError::policy(PolicyKind::TermsOfService, "accept the terms first")
            }),
            ..MockProvider::new()
        };
        let prompter = ScriptedPrompter::new();
        let result = provision(&session(false), &prompter, &provider, "my-app").await;
        assert!(matches!(result, Err(ProviderError::PolicyBlocked { .. })));
        assert_eq!(provider.manual_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn discovery_failure_uses_manual_entry() {
        let provider = MockProvider {
            list_error: Some(|| ProviderError::transient("cli exploded")),
            ..MockProvider::new()
        };
        let prompter = ScriptedPrompter::new();
        let config = provision(&session(false), &prompter, &provider, "my-app").await.unwrap();
        assert_eq!(config, "manual-url");
    }

    #[test]
    fn suffix_convention() {
        assert_eq!(suffixed("app-db", 1), "app-db");
        assert_eq!(suffixed("app-db", 2), "app-db-2");
        assert_eq!(suffixed("app-db", 10), "app-db-10");
    }
}

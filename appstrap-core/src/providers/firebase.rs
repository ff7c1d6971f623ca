//! Firebase setup workflow (auth capability)
//!
//! Lists/creates Firebase projects, ensures a web app exists, and pulls its
//! SDK config. Firebase has two policy conditions worth naming precisely:
//! unaccepted Terms of Service, and accounts whose first project must be
//! created through the web console.

use super::flow::{Resource, ResourceProvider};
use super::{run_provider_cli, PolicyKind, ProviderError, CREATE_TIMEOUT};
use crate::config::{sanitize_name, AuthConfig};
use crate::exec::{SessionContext, NETWORK_TIMEOUT};
use crate::prompt::Prompter;
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

const CONSOLE_URL: &str = "https://console.firebase.google.com";

pub struct FirebaseProvider;

fn classify_failure(stderr: &str) -> ProviderError {
    let lower = stderr.to_lowercase();
    if lower.contains("terms of service") {
        return ProviderError::policy(
            PolicyKind::TermsOfService,
            format!(
                "Your Google account has not accepted the Firebase Terms of Service. \
                 Open {CONSOLE_URL}, accept the terms, then retry."
            ),
        );
    }
    if lower.contains("first project") || lower.contains("create a project in the console") {
        return ProviderError::policy(
            PolicyKind::FirstResourceManual,
            format!(
                "This account's first Firebase project must be created in the web console. \
                 Create one at {CONSOLE_URL}, then retry."
            ),
        );
    }
    if lower.contains("not logged in") || lower.contains("failed to authenticate") {
        return ProviderError::NotAuthenticated { provider: "Firebase" };
    }
    if lower.contains("already exists") || lower.contains("already in use") || lower.contains("unavailable") {
        // Mapped to NameConflict by the caller, which knows the name.
        return ProviderError::conflict("project id");
    }
    ProviderError::command_failed("firebase", stderr.trim().to_string())
}

/// The `result` array of a `--json` firebase invocation.
fn json_result(stdout: &str) -> Result<Value, ProviderError> {
    let value: Value = serde_json::from_str(stdout)
        .map_err(|e| ProviderError::transient(format!("unparseable firebase output: {e}")))?;
    Ok(value.get("result").cloned().unwrap_or(value))
}

impl FirebaseProvider {
    async fn ensure_web_app(
        &self,
        session: &SessionContext,
        project_id: &str,
        app_name: &str,
    ) -> Result<String, ProviderError> {
        let out = run_provider_cli(
            session,
            "firebase",
            &["apps:list", "WEB", "--project", project_id, "--json"],
            NETWORK_TIMEOUT,
        )
        .await;
        if out.success {
            if let Ok(Value::Array(apps)) = json_result(&out.stdout) {
                if let Some(app_id) = apps
                    .first()
                    .and_then(|a| a.get("appId"))
                    .and_then(Value::as_str)
                {
                    debug!("reusing existing web app {app_id}");
                    return Ok(app_id.to_string());
                }
            }
        }

        let out = run_provider_cli(
            session,
            "firebase",
            &["apps:create", "WEB", app_name, "--project", project_id, "--json"],
            CREATE_TIMEOUT,
        )
        .await;
        if !out.success {
            return Err(classify_failure(&out.combined()));
        }
        json_result(&out.stdout)?
            .get("appId")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ProviderError::transient("apps:create returned no appId"))
    }
}

#[async_trait]
impl ResourceProvider for FirebaseProvider {
    type Config = AuthConfig;

    fn capability(&self) -> &'static str {
        "auth"
    }
    fn display_name(&self) -> &'static str {
        "Firebase"
    }
    fn resource_noun(&self) -> &'static str {
        "project"
    }
    fn derived_name(&self, project: &str) -> String {
        sanitize_name(project)
    }

    async fn list(&self, session: &SessionContext) -> Result<Vec<Resource>, ProviderError> {
        let out =
            run_provider_cli(session, "firebase", &["projects:list", "--json"], NETWORK_TIMEOUT)
                .await;
        if !out.success {
            return Err(classify_failure(&out.combined()));
        }
        let result = json_result(&out.stdout)?;
        let Some(projects) = result.as_array() else {
            return Err(ProviderError::transient("projects:list returned no array"));
        };
        Ok(projects
            .iter()
            .filter_map(|p| {
                let id = p.get("projectId")?.as_str()?;
                let name = p.get("displayName").and_then(Value::as_str).unwrap_or(id);
                Some(Resource { id: id.to_string(), name: name.to_string() })
            })
            .collect())
    }

    async fn create(
        &self,
        session: &SessionContext,
        name: &str,
    ) -> Result<Resource, ProviderError> {
        let out = run_provider_cli(
            session,
            "firebase",
            &["projects:create", name, "--display-name", name, "--json"],
            CREATE_TIMEOUT,
        )
        .await;
        if !out.success {
            return match classify_failure(&out.combined()) {
                ProviderError::NameConflict { .. } => Err(ProviderError::conflict(name)),
                other => Err(other),
            };
        }
        let result = json_result(&out.stdout)?;
        let id = result
            .get("projectId")
            .and_then(Value::as_str)
            .unwrap_or(name);
        Ok(Resource { id: id.to_string(), name: name.to_string() })
    }

    async fn extract(
        &self,
        session: &SessionContext,
        _prompter: &dyn Prompter,
        resource: &Resource,
    ) -> Result<AuthConfig, ProviderError> {
        let app_name = format!("{}-web", resource.id);
        let app_id = self.ensure_web_app(session, &resource.id, &app_name).await?;

        let out = run_provider_cli(
            session,
            "firebase",
            &["apps:sdkconfig", "WEB", &app_id, "--project", &resource.id, "--json"],
            NETWORK_TIMEOUT,
        )
        .await;
        if !out.success {
            return Err(classify_failure(&out.combined()));
        }
        let result = json_result(&out.stdout)?;
        let sdk = result.get("sdkConfig").unwrap_or(&result);
        let field = |key: &str| sdk.get(key).and_then(Value::as_str).map(str::to_string);

        let (Some(api_key), Some(app_id)) = (field("apiKey"), field("appId")) else {
            return Err(ProviderError::transient("sdkconfig missing apiKey/appId"));
        };
        Ok(AuthConfig {
            project_id: field("projectId").unwrap_or_else(|| resource.id.clone()),
            api_key,
            sender_id: field("messagingSenderId").unwrap_or_default(),
            app_id,
            measurement_id: field("measurementId").unwrap_or_default(),
        })
    }

    async fn manual(&self, prompter: &dyn Prompter) -> Result<AuthConfig, ProviderError> {
        super::print_manual_steps(
            "Firebase",
            CONSOLE_URL,
            &[
                "Sign in to the Firebase console and create a project",
                "Add a Web app to the project (</> icon on the project overview)",
                "Copy the config values shown at the end of app registration",
            ],
        );

        let project_id = prompter.input("Firebase project id", false)?;
        let api_key = loop {
            let key = prompter.input("Web API key (starts with 'AIza')", false)?;
            if key.starts_with("AIza") {
                break key;
            }
            println!("  that does not look like a Firebase web API key, try again");
        };
        let app_id = prompter.input("App id (1:...:web:...)", false)?;
        let sender_id = prompter.input("Messaging sender id", true)?;
        let measurement_id = prompter.input("Measurement id (optional)", true)?;

        Ok(AuthConfig { project_id, api_key, sender_id, app_id, measurement_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::testing::{err_output, ok_output, MockRunner};
    use crate::prompt::scripted::ScriptedPrompter;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn session_with(runner: Arc<MockRunner>) -> SessionContext {
        let session = SessionContext::new(runner, false, false);
        session.seed_path("firebase", Some(PathBuf::from("/usr/local/bin/firebase")));
        session
    }

    #[tokio::test]
    async fn list_parses_projects_json() {
        let runner = Arc::new(MockRunner::new().on(
            "firebase",
            ok_output(
                r#"{"status":"success","result":[
                    {"projectId":"my-app","displayName":"My App"},
                    {"projectId":"other","displayName":"Other"}]}"#,
            ),
        ));
        let session = session_with(runner);
        let resources = FirebaseProvider.list(&session).await.unwrap();
        assert_eq!(resources.len(), 2);
        assert_eq!(resources[0].id, "my-app");
        assert_eq!(resources[0].name, "My App");
    }

    #[tokio::test]
    async fn tos_failure_is_a_policy_block() {
        let runner = Arc::new(MockRunner::new().on(
            "firebase",
            err_output("Error: Callers must accept the Terms of Service prior to creating projects."),
        ));
        let session = session_with(runner);
        let result = FirebaseProvider.create(&session, "my-app").await;
        match result {
            Err(ProviderError::PolicyBlocked { kind, .. }) => {
                assert_eq!(kind, PolicyKind::TermsOfService);
            }
            other => panic!("expected policy block, got {:?}", other.err()),
        }
    }

    #[tokio::test]
    async fn taken_project_id_is_a_name_conflict() {
        let runner = Arc::new(
            MockRunner::new()
                .on("firebase", err_output("Error: Project ID is unavailable or already in use")),
        );
        let session = session_with(runner);
        let result = FirebaseProvider.create(&session, "my-app").await;
        assert!(matches!(result, Err(ProviderError::NameConflict { name }) if name == "my-app"));
    }

    #[tokio::test]
    async fn logged_out_cli_fails_fast() {
        let runner = Arc::new(MockRunner::new().on(
            "firebase",
            err_output("Error: Failed to authenticate, have you run firebase login?"),
        ));
        let session = session_with(runner);
        let result = FirebaseProvider.list(&session).await;
        assert!(matches!(result, Err(ProviderError::NotAuthenticated { .. })));
    }

    #[tokio::test]
    async fn manual_path_revalidates_the_api_key() {
        let prompter = ScriptedPrompter::new()
            .push_input("my-app")
            .push_input("not-a-key")
            .push_input("AIzaSyExample")
            .push_input("1:123:web:abc")
            .push_input("123456")
            .push_input("");
        let config = FirebaseProvider.manual(&prompter).await.unwrap();
        assert_eq!(config.project_id, "my-app");
        assert_eq!(config.api_key, "AIzaSyExample");
        assert!(config.measurement_id.is_empty());
    }
}

//! Existing-project detection
//!
//! `connect` reworks one capability of an already-scaffolded project, so
//! it must read the current state back out of `.env` and rewrite only the
//! lines it owns. [`EnvFile`] keeps the file as raw lines and edits values
//! in place; everything it does not touch survives byte for byte.

use super::{
    AuthConfig, ConnectionFlags, DatabaseConfig, DbProvider, DeployConfig, ProjectConfig,
    LOCAL_AUTH_PROJECT_ID, LOCAL_DATABASE_URL,
};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const KEY_AUTH_PROJECT_ID: &str = "VITE_FIREBASE_PROJECT_ID";
pub const KEY_AUTH_API_KEY: &str = "VITE_FIREBASE_API_KEY";
pub const KEY_AUTH_SENDER_ID: &str = "VITE_FIREBASE_SENDER_ID";
pub const KEY_AUTH_APP_ID: &str = "VITE_FIREBASE_APP_ID";
pub const KEY_AUTH_MEASUREMENT_ID: &str = "VITE_FIREBASE_MEASUREMENT_ID";
pub const KEY_DATABASE_URL: &str = "DATABASE_URL";
pub const KEY_DATABASE_PROVIDER: &str = "DATABASE_PROVIDER";
pub const KEY_WORKER_NAME: &str = "WORKER_NAME";
pub const KEY_SESSION_SECRET: &str = "AUTH_SESSION_SECRET";

/// A `.env` file held as raw lines. Edits replace the value on an existing
/// `KEY=` line or append a new one; no other line is ever rewritten.
#[derive(Debug, Clone)]
pub struct EnvFile {
    path: PathBuf,
    lines: Vec<String>,
}

fn split_entry(line: &str) -> Option<(&str, &str)> {
    let trimmed = line.trim_start();
    if trimmed.starts_with('#') {
        return None;
    }
    let (key, value) = trimmed.split_once('=')?;
    Some((key.trim(), value))
}

impl EnvFile {
    /// Load a file, or start empty if it does not exist yet.
    pub fn load(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let lines = match fs::read_to_string(&path) {
            Ok(text) => text.lines().map(str::to_string).collect(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e),
        };
        Ok(Self { path, lines })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.lines
            .iter()
            .rev()
            .find_map(|line| split_entry(line).filter(|(k, _)| *k == key).map(|(_, v)| v))
    }

    /// Replace the value of `key` in place, or append the entry.
    pub fn set(&mut self, key: &str, value: &str) {
        for line in self.lines.iter_mut().rev() {
            if split_entry(line).is_some_and(|(k, _)| k == key) {
                *line = format!("{key}={value}");
                return;
            }
        }
        self.lines.push(format!("{key}={value}"));
    }

    pub fn contents(&self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }

    pub fn save(&self) -> io::Result<()> {
        fs::write(&self.path, self.contents())
    }
}

/// What an existing project is currently connected to, per capability.
/// A capability counts as production when its values differ from the
/// local defaults written at scaffold time.
#[derive(Debug, Clone)]
pub struct DetectedState {
    pub auth: AuthConfig,
    pub database: DatabaseConfig,
    pub deploy: DeployConfig,
    pub flags: ConnectionFlags,
}

impl DetectedState {
    pub fn from_env(env: &EnvFile, project_name: &str) -> Self {
        let local_auth = AuthConfig::local_default();
        let auth = AuthConfig {
            project_id: env
                .get(KEY_AUTH_PROJECT_ID)
                .unwrap_or(&local_auth.project_id)
                .to_string(),
            api_key: env.get(KEY_AUTH_API_KEY).unwrap_or(&local_auth.api_key).to_string(),
            sender_id: env.get(KEY_AUTH_SENDER_ID).unwrap_or(&local_auth.sender_id).to_string(),
            app_id: env.get(KEY_AUTH_APP_ID).unwrap_or(&local_auth.app_id).to_string(),
            measurement_id: env.get(KEY_AUTH_MEASUREMENT_ID).unwrap_or("").to_string(),
        };

        let provider = match env.get(KEY_DATABASE_PROVIDER) {
            Some("neon") => DbProvider::Neon,
            Some("supabase") => DbProvider::Supabase,
            _ => DbProvider::Custom,
        };
        let database = DatabaseConfig {
            url: env.get(KEY_DATABASE_URL).unwrap_or(LOCAL_DATABASE_URL).to_string(),
            provider,
        };

        let local_worker = DeployConfig::local_default(project_name).worker_name;
        let deploy = DeployConfig {
            worker_name: env.get(KEY_WORKER_NAME).unwrap_or(&local_worker).to_string(),
        };

        let flags = ConnectionFlags {
            auth: auth.project_id != LOCAL_AUTH_PROJECT_ID,
            database: database.url != LOCAL_DATABASE_URL,
            deploy: deploy.worker_name != local_worker,
        };
        Self { auth, database, deploy, flags }
    }

    /// Assemble the full synthesis input for a project directory.
    pub fn into_project(self, name: &str, dir: PathBuf) -> (ProjectConfig, ConnectionFlags) {
        let project = ProjectConfig {
            name: name.to_string(),
            dir,
            auth: self.auth,
            database: self.database,
            deploy: self.deploy,
        };
        (project, self.flags)
    }
}

//! Profile file credentials provider.

use super::{Credentials, CredentialsProvider};
use crate::error::{CredentialsError, LaraError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::{env, fs};

/// Default profile name.
pub const DEFAULT_PROFILE: &str = "default";

/// Profile name environment variable.
pub const LARA_PROFILE: &str = "LARA_PROFILE";

/// Credentials file location environment variable.
pub const LARA_CREDENTIALS_FILE: &str = "LARA_CREDENTIALS_FILE";

const ACCESS_KEY_ID_KEY: &str = "lara_access_key_id";
const ACCESS_KEY_SECRET_KEY: &str = "lara_access_key_secret";

/// Credentials provider that reads from a profile-structured file.
///
/// The file defaults to `~/.lara/credentials` (or `LARA_CREDENTIALS_FILE`):
///
/// ```text
/// [default]
/// lara_access_key_id = ...
/// lara_access_key_secret = ...
///
/// [staging]
/// lara_access_key_id = ...
/// lara_access_key_secret = ...
/// ```
///
/// Keys before the first `[profile]` header belong to `default`. Unknown keys,
/// malformed lines and profiles missing either key are rejected.
#[derive(Debug, Clone)]
pub struct ProfileCredentialsProvider {
    profile_name: String,
    credentials_file: Option<PathBuf>,
}

impl ProfileCredentialsProvider {
    /// Create a new provider using `LARA_PROFILE` or the default profile.
    pub fn new() -> Self {
        let profile = env::var(LARA_PROFILE).unwrap_or_else(|_| DEFAULT_PROFILE.to_string());
        Self {
            profile_name: profile,
            credentials_file: None,
        }
    }

    /// Create a provider for a specific profile.
    pub fn with_profile(profile_name: impl Into<String>) -> Self {
        Self {
            profile_name: profile_name.into(),
            credentials_file: None,
        }
    }

    /// Use a custom credentials file path.
    pub fn with_credentials_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_file = Some(path.into());
        self
    }

    fn credentials_file_path(&self) -> PathBuf {
        if let Some(path) = &self.credentials_file {
            return path.clone();
        }

        if let Ok(path) = env::var(LARA_CREDENTIALS_FILE) {
            return PathBuf::from(path);
        }

        dirs::home_dir()
            .map(|home| home.join(".lara").join("credentials"))
            .unwrap_or_else(|| PathBuf::from(".lara/credentials"))
    }

    fn parse_credentials_file(
        content: &str,
    ) -> Result<HashMap<String, Credentials>, CredentialsError> {
        let invalid = |message: String| CredentialsError::ProfileError { message };

        let mut raw: HashMap<String, HashMap<&'static str, String>> = HashMap::new();
        let mut profile = DEFAULT_PROFILE.to_string();

        for line in content.lines() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if line.starts_with('[') {
                if !line.ends_with(']') {
                    return Err(invalid(format!("Invalid line in credentials file: {}", line)));
                }
                profile = line[1..line.len() - 1].trim().to_string();
                raw.entry(profile.clone()).or_default();
                continue;
            }

            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| invalid(format!("Invalid line in credentials file: {}", line)))?;

            let key = match key.trim() {
                ACCESS_KEY_ID_KEY => ACCESS_KEY_ID_KEY,
                ACCESS_KEY_SECRET_KEY => ACCESS_KEY_SECRET_KEY,
                other => {
                    return Err(invalid(format!("Invalid key in credentials file: {}", other)))
                }
            };

            raw.entry(profile.clone())
                .or_default()
                .insert(key, value.trim().to_string());
        }

        let mut profiles = HashMap::with_capacity(raw.len());
        for (name, mut entries) in raw {
            let id = entries.remove(ACCESS_KEY_ID_KEY).ok_or_else(|| {
                invalid(format!("Missing \"{}\" for profile \"{}\"", ACCESS_KEY_ID_KEY, name))
            })?;
            let secret = entries.remove(ACCESS_KEY_SECRET_KEY).ok_or_else(|| {
                invalid(format!("Missing \"{}\" for profile \"{}\"", ACCESS_KEY_SECRET_KEY, name))
            })?;
            profiles.insert(name, Credentials::new(id, secret));
        }

        Ok(profiles)
    }
}

impl Default for ProfileCredentialsProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialsProvider for ProfileCredentialsProvider {
    async fn get_credentials(&self) -> Result<Credentials, LaraError> {
        let path = self.credentials_file_path();

        let content = fs::read_to_string(&path).map_err(|e| CredentialsError::ProfileError {
            message: format!("Failed to read credentials file at {:?}: {}", path, e),
        })?;

        let mut profiles = Self::parse_credentials_file(&content)?;

        let credentials = profiles.remove(&self.profile_name).ok_or_else(|| {
            CredentialsError::ProfileError {
                message: format!(
                    "Profile \"{}\" not found in credentials file: {:?}",
                    self.profile_name, path
                ),
            }
        })?;

        credentials.validate()
    }

    fn name(&self) -> &'static str {
        "profile"
    }
}

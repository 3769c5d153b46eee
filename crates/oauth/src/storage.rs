use std::{
    collections::HashMap,
    io::Write,
    path::{Path, PathBuf},
};

use tracing::{debug, info, warn};

use crate::{Result, types::OAuthTokens};

/// JSON file mapping provider name to its tokens.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Tokens for `provider`, or `None` when absent or unreadable.
    pub fn load(&self, provider: &str) -> Option<OAuthTokens> {
        let path = self.path.display().to_string();
        match self.read_map() {
            Ok(mut map) => {
                let tokens = map.remove(provider);
                debug!(path = %path, provider, found = tokens.is_some(), "token store read");
                tokens
            },
            Err(e) => {
                warn!(path = %path, provider, error = %e, "token store unreadable");
                None
            },
        }
    }

    /// Insert or replace `provider`'s tokens. The file is created owner-only.
    pub fn save(&self, provider: &str, tokens: &OAuthTokens) -> Result<()> {
        let mut map = self.read_map().unwrap_or_default();
        map.insert(provider.to_string(), tokens.clone());
        self.write_map(&map)?;
        info!(path = %self.path.display(), provider, "OAuth tokens saved");
        Ok(())
    }

    pub fn delete(&self, provider: &str) -> Result<bool> {
        let mut map = self.read_map()?;
        let removed = map.remove(provider).is_some();
        if removed {
            self.write_map(&map)?;
            info!(path = %self.path.display(), provider, "OAuth tokens deleted");
        }
        Ok(removed)
    }

    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .read_map()
            .map(|m| m.into_keys().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    fn read_map(&self) -> Result<HashMap<String, OAuthTokens>> {
        match std::fs::read_to_string(&self.path) {
            Ok(data) => Ok(serde_json::from_str(&data)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_map(&self, map: &HashMap<String, OAuthTokens>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(map)?;

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path)?;
        file.write_all(&data)?;

        // `mode` only applies on creation; tighten files written by older runs.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }
}

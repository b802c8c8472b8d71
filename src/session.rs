//! Signed-in session state, token persistence and the category cache.
//!
//! Nothing here is global: the binary builds a [`Session`] once and hands it
//! (behind an `Arc`) to every call that needs authentication.

use crate::api::{ApiClient, ApiError, Category, User};
use secrecy::{ExposeSecret, SecretString};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable that overrides every other token source.
pub const TOKEN_ENV_VAR: &str = "NEWSDESK_API_TOKEN";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Token file error: {0}")]
    Io(#[from] std::io::Error),
}

// ============================================================================
// Session
// ============================================================================

/// Bearer token plus the user it belongs to, once known.
///
/// The token is a `SecretString`, so Debug output and logs never show it.
#[derive(Debug)]
pub struct Session {
    token: SecretString,
    user: Option<User>,
}

impl Session {
    pub fn new(token: SecretString) -> Self {
        Self { token, user: None }
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.user = Some(user);
        self
    }

    pub fn token(&self) -> &SecretString {
        &self.token
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Name shown in the status bar.
    pub fn display_name(&self) -> &str {
        match &self.user {
            Some(user) if !user.name.is_empty() => &user.name,
            Some(user) => &user.email,
            None => "unknown user",
        }
    }
}

/// Where the active token came from. Logged at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Environment,
    Config,
    TokenFile,
}

/// Pick the token by precedence: environment, then config, then the
/// stored token file. Blank values are skipped.
pub fn resolve_token(
    env: Option<String>,
    config: Option<&str>,
    store: &TokenStore,
) -> Result<Option<(SecretString, TokenSource)>, SessionError> {
    if let Some(token) = env.filter(|t| !t.trim().is_empty()) {
        return Ok(Some((SecretString::from(token.trim().to_string()), TokenSource::Environment)));
    }
    if let Some(token) = config.map(str::trim).filter(|t| !t.is_empty()) {
        return Ok(Some((SecretString::from(token.to_string()), TokenSource::Config)));
    }
    Ok(store.load()?.map(|token| (token, TokenSource::TokenFile)))
}

// ============================================================================
// Token file
// ============================================================================

/// Persists the bearer token in `<config dir>/token`, readable only by the
/// owner on Unix.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(config_dir: &Path) -> Self {
        Self {
            path: config_dir.join("token"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored token, or `None` when there is no file or it is blank.
    pub fn load(&self) -> Result<Option<SecretString>, SessionError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let token = content.trim();
                if token.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(SecretString::from(token.to_string())))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SessionError::Io(e)),
        }
    }

    /// Write the token through a temp file and rename, so a crash never
    /// leaves a truncated token behind.
    pub fn save(&self, token: &SecretString) -> Result<(), SessionError> {
        let temp_path = self
            .path
            .with_extension(format!("tmp.{:04x}", rand::random::<u16>()));

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let result = (|| -> std::io::Result<()> {
            let mut file = options.open(&temp_path)?;
            file.write_all(token.expose_secret().as_bytes())?;
            file.sync_all()?;
            drop(file);

            #[cfg(windows)]
            if self.path.exists() {
                std::fs::remove_file(&self.path)?;
            }
            std::fs::rename(&temp_path, &self.path)
        })();

        if let Err(e) = result {
            let _ = std::fs::remove_file(&temp_path);
            return Err(SessionError::Io(e));
        }

        tracing::debug!(path = %self.path.display(), "Stored API token");
        Ok(())
    }

    /// Remove the stored token. A missing file is not an error.
    pub fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "Removed stored API token");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionError::Io(e)),
        }
    }
}

// ============================================================================
// Category cache
// ============================================================================

/// Categories fetched from the server, refreshed explicitly.
#[derive(Debug, Clone, Default)]
pub struct CategoryCache {
    categories: Vec<Category>,
    loaded: bool,
}

/// A category with its display depth (0 for roots, 1 for children).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryRow<'a> {
    pub category: &'a Category,
    pub depth: usize,
}

impl CategoryCache {
    pub async fn refresh(&mut self, client: &ApiClient, session: &Session) -> Result<(), ApiError> {
        let categories = client.fetch_categories(session).await?;
        self.replace(categories);
        Ok(())
    }

    pub fn replace(&mut self, categories: Vec<Category>) {
        self.categories = categories;
        self.loaded = true;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn all(&self) -> &[Category] {
        &self.categories
    }

    pub fn get(&self, id: u64) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Root categories ordered by position.
    pub fn roots(&self) -> Vec<&Category> {
        let mut roots: Vec<_> = self.categories.iter().filter(|c| c.is_root()).collect();
        roots.sort_by_key(|c| (c.position, c.id));
        roots
    }

    /// Each root with its direct children, both ordered by position.
    ///
    /// Children whose parent is not a known root are left out.
    pub fn grouped(&self) -> Vec<(&Category, Vec<&Category>)> {
        self.roots()
            .into_iter()
            .map(|root| {
                let mut children: Vec<_> = self
                    .categories
                    .iter()
                    .filter(|c| !c.is_root() && c.parent_id == root.id)
                    .collect();
                children.sort_by_key(|c| (c.position, c.id));
                (root, children)
            })
            .collect()
    }

    /// `grouped()` flattened into display rows.
    pub fn rows(&self) -> Vec<CategoryRow<'_>> {
        self.grouped()
            .into_iter()
            .flat_map(|(root, children)| {
                std::iter::once(CategoryRow {
                    category: root,
                    depth: 0,
                })
                .chain(children.into_iter().map(|category| CategoryRow { category, depth: 1 }))
            })
            .collect()
    }

    /// Flip a category's active flag locally after the server accepted it.
    pub fn set_active(&mut self, id: u64, active: bool) {
        if let Some(category) = self.categories.iter_mut().find(|c| c.id == id) {
            category.active = active;
        }
    }
}

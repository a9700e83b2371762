pub mod prompt;

use atomic_write_file::AtomicWriteFile;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::{self, Config};

pub use prompt::{clean_token, prompt_for_token};

#[derive(Debug)]
pub enum CredentialError {
    NotInitialized,
    Parse { path: PathBuf, message: String },
    Io(String),
    Prompt(String),
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialError::NotInitialized => {
                write!(f, "Credential store is not initialized; call init and load first")
            }
            CredentialError::Parse { path, message } => {
                write!(f, "Failed to parse config at {}: {}", path.display(), message)
            }
            CredentialError::Io(msg) => write!(f, "Config I/O failed: {}", msg),
            CredentialError::Prompt(msg) => write!(f, "Failed to read private token: {}", msg),
        }
    }
}

impl std::error::Error for CredentialError {}

/// Tokens per GitLab domain and the preferred domain order, backed by a YAML file.
///
/// Lifecycle is `new` -> `init` -> `load`, then mutations. Every mutation
/// rewrites the whole file.
#[derive(Debug)]
pub struct CredentialStore {
    path: Option<PathBuf>,
    config: Option<Config>,
}

impl CredentialStore {
    /// `None` means the default path is resolved by `init`.
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path, config: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Resolve the file path and create an empty store file if none exists.
    pub fn init(&mut self) -> Result<(), CredentialError> {
        let path = match self.path.take() {
            Some(p) => p,
            None => config::get_config_path().map_err(|e| CredentialError::Io(format!("{:#}", e)))?,
        };

        if !path.exists() {
            create_empty_store(&path)?;
        }

        self.path = Some(path);
        Ok(())
    }

    /// Read the store file into memory. Malformed content is an error and is left untouched.
    pub fn load(&mut self) -> Result<&Config, CredentialError> {
        let path = self.path.as_ref().ok_or(CredentialError::NotInitialized)?;

        let content = fs::read_to_string(path)
            .map_err(|e| CredentialError::Io(format!("read {}: {}", path.display(), e)))?;

        let loaded = config::parse_config(&content).map_err(|e| CredentialError::Parse {
            path: path.clone(),
            message: format!("{:#}", e),
        })?;

        let config = self.config.insert(loaded);
        Ok(&*config)
    }

    pub fn config(&self) -> Result<&Config, CredentialError> {
        self.config.as_ref().ok_or(CredentialError::NotInitialized)
    }

    fn config_mut(&mut self) -> Result<&mut Config, CredentialError> {
        self.config.as_mut().ok_or(CredentialError::NotInitialized)
    }

    /// Write the in-memory store back to disk atomically
    pub fn save(&self) -> Result<(), CredentialError> {
        let path = self.path.as_ref().ok_or(CredentialError::NotInitialized)?;
        write_store(path, self.config()?)
    }

    pub fn get_token(&self, domain: &str) -> Result<Option<String>, CredentialError> {
        Ok(self.config()?.token(domain).map(str::to_string))
    }

    /// Stored token for `domain`, or ask the user for one and persist it.
    pub fn get_or_prompt(&mut self, domain: &str) -> Result<String, CredentialError> {
        self.get_or_prompt_with(domain, prompt_for_token)
    }

    pub fn get_or_prompt_with<F>(&mut self, domain: &str, ask: F) -> Result<String, CredentialError>
    where
        F: FnOnce(&str) -> anyhow::Result<String>,
    {
        if let Some(token) = self.get_token(domain)? {
            return Ok(token);
        }

        let token = ask(domain)
            .and_then(|input| clean_token(&input))
            .map_err(|e| CredentialError::Prompt(format!("{:#}", e)))?;

        self.save_token(domain, &token)?;
        Ok(token)
    }

    /// First candidate that is also a preferred domain. Candidate order wins;
    /// the preferred list only decides membership.
    pub fn top_priority_domain<S: AsRef<str>>(
        &self,
        candidates: &[S],
    ) -> Result<Option<String>, CredentialError> {
        let config = self.config()?;
        Ok(candidates
            .iter()
            .map(|candidate| candidate.as_ref())
            .find(|domain| config.has_preferred_domain(domain))
            .map(str::to_string))
    }

    /// Highest priority preferred domain
    pub fn top_domain(&self) -> Result<Option<String>, CredentialError> {
        Ok(self.config()?.top_domain().map(str::to_string))
    }

    pub fn preferred_domains(&self) -> Result<&[String], CredentialError> {
        Ok(&self.config()?.preferred_domains)
    }

    /// Append `domain` to the preferred list and persist. No de-duplication.
    pub fn save_preferred_domain(&mut self, domain: &str) -> Result<(), CredentialError> {
        self.config_mut()?.add_preferred_domain(domain);
        self.save()
    }

    /// Append a token entry and persist. No de-duplication.
    pub fn save_token(&mut self, domain: &str, token: &str) -> Result<(), CredentialError> {
        self.config_mut()?.add_token(domain, token);
        self.save()
    }
}

fn create_empty_store(path: &Path) -> Result<(), CredentialError> {
    config::ensure_parent_dir(path).map_err(|e| CredentialError::Io(format!("{:#}", e)))?;
    write_store(path, &Config::default())
}

fn write_store(path: &Path, config: &Config) -> Result<(), CredentialError> {
    let yaml = config::render_config(config).map_err(|e| CredentialError::Io(format!("{:#}", e)))?;

    let mut file = AtomicWriteFile::open(path)
        .map_err(|e| CredentialError::Io(format!("open {}: {}", path.display(), e)))?;
    file.write_all(yaml.as_bytes())
        .map_err(|e| CredentialError::Io(format!("write {}: {}", path.display(), e)))?;
    file.commit()
        .map_err(|e| CredentialError::Io(format!("commit {}: {}", path.display(), e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn loaded_store(dir: &TempDir) -> CredentialStore {
        let mut store = CredentialStore::new(Some(dir.path().join("config.yaml")));
        store.init().unwrap();
        store.load().unwrap();
        store
    }

    #[test]
    fn test_init_creates_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.yaml");
        let mut store = CredentialStore::new(Some(path.clone()));

        store.init().unwrap();
        assert!(path.exists());

        let config = store.load().unwrap();
        assert!(config.tokens.is_empty());
        assert!(config.preferred_domains.is_empty());
    }

    #[test]
    fn test_uninitialized_store_is_reported() {
        let mut store = CredentialStore::new(None);
        assert!(matches!(store.load(), Err(CredentialError::NotInitialized)));
        assert!(matches!(
            store.get_token("gitlab.com"),
            Err(CredentialError::NotInitialized)
        ));
        assert!(matches!(
            store.save_token("gitlab.com", "t"),
            Err(CredentialError::NotInitialized)
        ));
    }

    #[test]
    fn test_token_roundtrip_across_reload() {
        let dir = TempDir::new().unwrap();
        let mut store = loaded_store(&dir);
        store.save_token("gitlab.ssl.domain1.jp", "token1").unwrap();
        store.save_token("gitlab.ssl.domain2.jp", "token2").unwrap();
        assert_eq!(
            store.get_token("gitlab.ssl.domain1.jp").unwrap().as_deref(),
            Some("token1")
        );

        let reloaded = loaded_store(&dir);
        assert_eq!(
            reloaded.get_token("gitlab.ssl.domain1.jp").unwrap().as_deref(),
            Some("token1")
        );
        assert_eq!(
            reloaded.get_token("gitlab.ssl.domain2.jp").unwrap().as_deref(),
            Some("token2")
        );
        assert_eq!(reloaded.get_token("gitlab.com").unwrap(), None);
    }

    #[test]
    fn test_replaced_token_survives_reload() {
        let dir = TempDir::new().unwrap();
        let mut store = loaded_store(&dir);
        store.save_token("gitlab.com", "first").unwrap();
        store.save_token("gitlab.com", "second").unwrap();

        let reloaded = loaded_store(&dir);
        assert_eq!(reloaded.get_token("gitlab.com").unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn test_top_priority_domain_follows_candidate_order() {
        let dir = TempDir::new().unwrap();
        let mut store = loaded_store(&dir);
        store.save_preferred_domain("d1").unwrap();
        store.save_preferred_domain("d2").unwrap();

        assert_eq!(
            store.top_priority_domain(&["d2", "d1"]).unwrap().as_deref(),
            Some("d2")
        );
        assert_eq!(
            store.top_priority_domain(&["d3", "d1"]).unwrap().as_deref(),
            Some("d1")
        );
        assert_eq!(store.top_priority_domain(&["d3"]).unwrap(), None);
        assert_eq!(store.top_priority_domain::<&str>(&[]).unwrap(), None);
        assert_eq!(store.top_domain().unwrap().as_deref(), Some("d1"));
    }

    #[test]
    fn test_preferred_domains_persist_in_order() {
        let dir = TempDir::new().unwrap();
        let mut store = loaded_store(&dir);
        store.save_preferred_domain("gitlab.b.com").unwrap();
        store.save_preferred_domain("gitlab.a.com").unwrap();

        let reloaded = loaded_store(&dir);
        assert_eq!(
            reloaded.preferred_domains().unwrap(),
            &["gitlab.b.com".to_string(), "gitlab.a.com".to_string()]
        );
    }

    #[test]
    fn test_get_or_prompt_uses_stored_token() {
        let dir = TempDir::new().unwrap();
        let mut store = loaded_store(&dir);
        store.save_token("gitlab.com", "stored").unwrap();

        let token = store
            .get_or_prompt_with("gitlab.com", |_| panic!("should not prompt"))
            .unwrap();
        assert_eq!(token, "stored");
    }

    #[test]
    fn test_get_or_prompt_persists_entered_token() {
        let dir = TempDir::new().unwrap();
        let mut store = loaded_store(&dir);

        let token = store
            .get_or_prompt_with("gitlab.com", |domain| {
                assert_eq!(domain, "gitlab.com");
                Ok("  entered  \n".to_string())
            })
            .unwrap();
        assert_eq!(token, "entered");

        let reloaded = loaded_store(&dir);
        assert_eq!(reloaded.get_token("gitlab.com").unwrap().as_deref(), Some("entered"));
    }

    #[test]
    fn test_get_or_prompt_rejects_empty_token() {
        let dir = TempDir::new().unwrap();
        let mut store = loaded_store(&dir);

        let result = store.get_or_prompt_with("gitlab.com", |_| Ok("   ".to_string()));
        assert!(matches!(result, Err(CredentialError::Prompt(_))));
        assert_eq!(store.get_token("gitlab.com").unwrap(), None);
    }

    #[test]
    fn test_prompt_failure_propagates() {
        let dir = TempDir::new().unwrap();
        let mut store = loaded_store(&dir);

        let result = store.get_or_prompt_with("gitlab.com", |_| anyhow::bail!("stdin closed"));
        match result {
            Err(CredentialError::Prompt(msg)) => assert!(msg.contains("stdin closed")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_malformed_file_is_fatal_and_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        let garbage = "tokens: [unclosed\n";
        fs::write(&path, garbage).unwrap();

        let mut store = CredentialStore::new(Some(path.clone()));
        store.init().unwrap();
        assert!(matches!(store.load(), Err(CredentialError::Parse { .. })));
        assert_eq!(fs::read_to_string(&path).unwrap(), garbage);
    }

    #[test]
    fn test_blank_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "\n").unwrap();

        let mut store = CredentialStore::new(Some(path));
        store.init().unwrap();
        assert!(store.load().unwrap().tokens.is_empty());
    }
}

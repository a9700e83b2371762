pub mod path;
pub mod reference;
pub mod url;

pub use path::{repository_relative_path, RepositoryPath};
pub use reference::{ResourceKind, ResourceReference, REFERENCE_PREFIXES};
pub use url::{url_by_remote, url_by_user_specific, PRIMARY_BRANCH};

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::credentials::CredentialStore;
use crate::git::{self, ProjectPath, RemoteError, RemoteInfo, RemoteInspector};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocatorError {
    InvalidArgument(String),
    InvalidNumber(String),
    NoBrowsableUrl,
    PathNotFound(PathBuf),
    OutsideRepository(PathBuf),
}

impl LocatorError {
    /// Errors about the local filesystem rather than the user's reference
    pub fn is_environment(&self) -> bool {
        matches!(
            self,
            LocatorError::PathNotFound(_) | LocatorError::OutsideRepository(_)
        )
    }
}

impl fmt::Display for LocatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocatorError::InvalidArgument(arg) => write!(f, "Invalid arg. {}", arg),
            LocatorError::InvalidNumber(num) => write!(f, "Invalid browse number. \"{}\"", num),
            LocatorError::NoBrowsableUrl => write!(f, "Not found browse url."),
            LocatorError::PathNotFound(p) => {
                write!(f, "Not found file or path. Path:{}", p.display())
            }
            LocatorError::OutsideRepository(p) => {
                write!(f, "Path is outside the repository. Path:{}", p.display())
            }
        }
    }
}

impl std::error::Error for LocatorError {}

/// What a single invocation asks to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseTarget {
    Reference(ResourceReference),
    Path(PathBuf),
    CurrentDirectory(PathBuf),
    TopPage,
}

impl BrowseTarget {
    /// An explicit path wins over the current directory, which wins over a
    /// reference. Relative paths are taken from `cwd`.
    pub fn from_args(
        reference: Option<&str>,
        path: Option<&Path>,
        current_dir: bool,
        cwd: &Path,
    ) -> Result<Self, LocatorError> {
        if let Some(path) = path {
            return Ok(BrowseTarget::Path(cwd.join(path)));
        }
        if current_dir {
            return Ok(BrowseTarget::CurrentDirectory(cwd.to_path_buf()));
        }
        match reference {
            Some(arg) => Ok(BrowseTarget::Reference(ResourceReference::parse(arg)?)),
            None => Ok(BrowseTarget::TopPage),
        }
    }

    fn reference(&self) -> Option<&ResourceReference> {
        match self {
            BrowseTarget::Reference(r) => Some(r),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseRequest {
    pub target: BrowseTarget,
    pub project: Option<ProjectPath>,
}

/// Where the remote came from for this invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Remote(RemoteInfo),
    /// No local remote; top preferred domain from the credential file
    Domain(String),
    Unresolved,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUrl {
    pub url: String,
    pub remote: Option<RemoteInfo>,
}

/// Pick the GitLab remote to browse.
///
/// A remote on a preferred domain beats remote order. When the GitLab remotes
/// span several domains and none is preferred yet, the first one is chosen and
/// its domain recorded as preferred so later runs agree.
pub fn resolve_remote<I>(inspector: &I, store: &mut CredentialStore) -> Result<Resolution>
where
    I: RemoteInspector + ?Sized,
{
    let configured = if inspector.is_repository()? {
        inspector.remotes()?
    } else {
        Vec::new()
    };

    if configured.is_empty() {
        return Ok(match store.top_domain()? {
            Some(domain) => Resolution::Domain(domain),
            None => Resolution::Unresolved,
        });
    }

    // remotes exist, so none parsing as GitLab still means NotGitlabClone
    let gitlab = git::filter_gitlab_remotes(git::parse_remotes(&configured));
    let first = git::current_remote(gitlab.clone())?;

    let domains: Vec<&str> = gitlab.iter().map(|r| r.domain.as_str()).collect();
    if let Some(preferred) = store.top_priority_domain(domains.as_slice())? {
        if let Some(remote) = gitlab.iter().find(|r| r.domain == preferred) {
            return Ok(Resolution::Remote(remote.clone()));
        }
    }

    let distinct: HashSet<&str> = domains.iter().copied().collect();
    if distinct.len() > 1 {
        store
            .save_preferred_domain(&first.domain)
            .context("Failed to remember preferred domain")?;
    }

    Ok(Resolution::Remote(first))
}

/// Resolve the remote and render the URL for `request`.
pub fn browse_url<I>(
    inspector: &I,
    store: &mut CredentialStore,
    request: &BrowseRequest,
) -> Result<ResolvedUrl>
where
    I: RemoteInspector + ?Sized,
{
    let resolution = resolve_remote(inspector, store)?;

    let is_path_target = matches!(
        request.target,
        BrowseTarget::Path(_) | BrowseTarget::CurrentDirectory(_)
    );

    let (remote, user_specific) = match (resolution, &request.project) {
        (Resolution::Remote(remote), Some(project)) => (project.apply(remote), true),
        (Resolution::Remote(remote), None) => (remote, false),
        _ if is_path_target => return Err(RemoteError::NotGitlabClone.into()),
        (Resolution::Domain(domain), Some(project)) => (project.on_domain(&domain), true),
        (Resolution::Domain(domain), None) => {
            if request.target != BrowseTarget::TopPage {
                return Err(LocatorError::NoBrowsableUrl.into());
            }
            return Ok(ResolvedUrl {
                url: url::domain_url(&domain),
                remote: None,
            });
        }
        (Resolution::Unresolved, _) => return Err(LocatorError::NoBrowsableUrl.into()),
    };

    let url = match &request.target {
        BrowseTarget::Path(target) | BrowseTarget::CurrentDirectory(target) => {
            let root = inspector.root()?;
            let repo_path = repository_relative_path(&root, target)?;
            let branch = inspector.current_remote_branch(&remote)?;
            url::path_url(&remote, &branch, &repo_path.relative, repo_path.is_dir)
        }
        target if user_specific => url_by_user_specific(&remote, target.reference()),
        BrowseTarget::Reference(reference) => url::resource_url(&remote, reference),
        BrowseTarget::TopPage => {
            let branch = inspector.current_remote_branch(&remote)?;
            url_by_remote(&remote, None, &branch)
        }
    };

    Ok(ResolvedUrl {
        url,
        remote: Some(remote),
    })
}

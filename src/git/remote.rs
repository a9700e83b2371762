use std::fmt;

/// Hosts whose name starts with this are treated as GitLab servers.
///
/// Loose on purpose: `gitlabs-mirror.example.com` matches too.
pub const GITLAB_HOST_PREFIX: &str = "gitlab";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    NotGitlabClone,
    InvalidProject(String),
    Git(String),
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteError::NotGitlabClone => write!(f, "Not a cloned repository from gitlab."),
            RemoteError::InvalidProject(p) => {
                write!(f, "Invalid project \"{}\"; expected <namespace>/<project>", p)
            }
            RemoteError::Git(msg) => write!(f, "Git inspection failed: {}", msg),
        }
    }
}

impl std::error::Error for RemoteError {}

/// A remote whose URL points at a GitLab project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteInfo {
    pub name: String,
    pub domain: String,
    pub group: String,
    pub repository: String,
}

impl RemoteInfo {
    pub fn is_gitlab(&self) -> bool {
        self.domain.starts_with(GITLAB_HOST_PREFIX)
    }

    /// `group/repository`
    pub fn project_path(&self) -> String {
        format!("{}/{}", self.group, self.repository)
    }
}

/// Parse a configured remote URL into its host and project components.
///
/// Understands `ssh://`, `git://`, `http(s)://` and scp-like
/// `user@host:group/repo.git`. Returns `None` when the URL has no usable
/// host or fewer than two path segments.
pub fn parse_remote_url(name: &str, url: &str) -> Option<RemoteInfo> {
    let url = url.trim();

    let (host, path) = if let Some((scheme, rest)) = url.split_once("://") {
        let (authority, path) = rest.split_once('/')?;
        let host = authority.rsplit_once('@').map_or(authority, |(_, h)| h);
        let host = match scheme {
            "http" | "https" => host,
            // ssh ports never appear in the web URL
            _ => host.split_once(':').map_or(host, |(h, _)| h),
        };
        (host, path)
    } else {
        let (authority, path) = url.split_once(':')?;
        if authority.contains('/') {
            return None;
        }
        let host = authority.rsplit_once('@').map_or(authority, |(_, h)| h);
        (host, path)
    };

    if host.is_empty() {
        return None;
    }

    let path = path.trim_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    let (group, repository) = path.rsplit_once('/')?;
    if group.is_empty() || repository.is_empty() {
        return None;
    }

    Some(RemoteInfo {
        name: name.to_string(),
        domain: host.to_string(),
        group: group.to_string(),
        repository: repository.to_string(),
    })
}

/// Keep the remotes hosted on a GitLab-looking domain, in the order git lists them
pub fn filter_gitlab_remotes(candidates: Vec<RemoteInfo>) -> Vec<RemoteInfo> {
    candidates.into_iter().filter(RemoteInfo::is_gitlab).collect()
}

/// The first GitLab remote, as ordered by git
pub fn current_remote(candidates: Vec<RemoteInfo>) -> Result<RemoteInfo, RemoteError> {
    filter_gitlab_remotes(candidates)
        .into_iter()
        .next()
        .ok_or(RemoteError::NotGitlabClone)
}

/// An explicit `namespace/project` chosen on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPath {
    pub namespace: String,
    pub project: String,
}

impl ProjectPath {
    /// Split at the last `/`, so nested groups stay in the namespace.
    pub fn parse(s: &str) -> Result<Self, RemoteError> {
        let trimmed = s.trim().trim_matches('/');
        match trimmed.rsplit_once('/') {
            Some((namespace, project)) if !namespace.is_empty() && !project.is_empty() => {
                Ok(ProjectPath {
                    namespace: namespace.to_string(),
                    project: project.to_string(),
                })
            }
            _ => Err(RemoteError::InvalidProject(s.to_string())),
        }
    }

    /// Point `remote` at this project, keeping its domain
    pub fn apply(&self, remote: RemoteInfo) -> RemoteInfo {
        RemoteInfo {
            group: self.namespace.clone(),
            repository: self.project.clone(),
            ..remote
        }
    }

    /// A remote on `domain` for this project, used when no local remote exists
    pub fn on_domain(&self, domain: &str) -> RemoteInfo {
        RemoteInfo {
            name: String::new(),
            domain: domain.to_string(),
            group: self.namespace.clone(),
            repository: self.project.clone(),
        }
    }
}

impl std::str::FromStr for ProjectPath {
    type Err = RemoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProjectPath::parse(s)
    }
}

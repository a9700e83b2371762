pub mod remote;

pub use remote::{
    current_remote, filter_gitlab_remotes, parse_remote_url, ProjectPath, RemoteError, RemoteInfo,
    GITLAB_HOST_PREFIX,
};

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// What the browse flow needs to know about the local clone.
pub trait RemoteInspector {
    /// `Ok(false)` outside a work tree; `Err` when git itself could not run
    fn is_repository(&self) -> Result<bool>;

    /// `(name, url)` pairs in the order git reports them
    fn remotes(&self) -> Result<Vec<(String, String)>>;

    /// Branch name tracked on `remote`, without the `<remote>/` prefix
    fn current_remote_branch(&self, remote: &RemoteInfo) -> Result<String>;

    /// Absolute path of the work tree root
    fn root(&self) -> Result<PathBuf>;
}

/// Parse `(name, url)` pairs, dropping URLs that do not name a project
pub fn parse_remotes(raw: &[(String, String)]) -> Vec<RemoteInfo> {
    raw.iter()
        .filter_map(|(name, url)| parse_remote_url(name, url))
        .collect()
}

/// `RemoteInspector` backed by the `git` executable.
#[derive(Debug, Clone, Default)]
pub struct GitCli {
    working_dir: Option<PathBuf>,
}

impl GitCli {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: Some(dir.into()),
        }
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        run_git_command_string(args, self.working_dir.as_deref())
    }
}

impl RemoteInspector for GitCli {
    fn is_repository(&self) -> Result<bool> {
        let output = run_git_command(
            &["rev-parse", "--is-inside-work-tree"],
            self.working_dir.as_deref(),
        )
        .map_err(|e| RemoteError::Git(format!("{:#}", e)))?;

        Ok(output.status.success() && String::from_utf8_lossy(&output.stdout).trim() == "true")
    }

    fn remotes(&self) -> Result<Vec<(String, String)>> {
        let output = self.run(&["remote", "-v"])?;
        Ok(parse_remote_verbose(&output))
    }

    fn current_remote_branch(&self, remote: &RemoteInfo) -> Result<String> {
        if let Ok(upstream) =
            self.run(&["rev-parse", "--abbrev-ref", "--symbolic-full-name", "@{upstream}"])
        {
            let prefix = format!("{}/", remote.name);
            if let Some(branch) = upstream.strip_prefix(&prefix) {
                if !branch.is_empty() {
                    return Ok(branch.to_string());
                }
            }
        }

        let branch = self.run(&["branch", "--show-current"])?;
        if branch.is_empty() {
            anyhow::bail!(RemoteError::Git(
                "HEAD is detached and has no upstream branch".to_string()
            ));
        }
        Ok(branch)
    }

    fn root(&self) -> Result<PathBuf> {
        let root = self.run(&["rev-parse", "--show-toplevel"])?;
        Ok(PathBuf::from(root))
    }
}

/// Fetch entries of `git remote -v`, one per remote name, first seen first
fn parse_remote_verbose(output: &str) -> Vec<(String, String)> {
    let mut remotes: Vec<(String, String)> = Vec::new();
    for line in output.lines() {
        let mut fields = line.split_whitespace();
        let (Some(name), Some(url)) = (fields.next(), fields.next()) else {
            continue;
        };
        if fields.next() == Some("(push)") {
            continue;
        }
        if remotes.iter().any(|(n, _)| n == name) {
            continue;
        }
        remotes.push((name.to_string(), url.to_string()));
    }
    remotes
}

/// Run a git command and return the output
pub fn run_git_command(args: &[&str], working_dir: Option<&Path>) -> Result<Output> {
    let mut cmd = Command::new("git");
    cmd.args(args);

    if let Some(dir) = working_dir {
        cmd.current_dir(dir);
    }

    cmd.output()
        .with_context(|| format!("Failed to execute git command: git {}", args.join(" ")))
}

/// Run a git command and return trimmed stdout
pub fn run_git_command_string(args: &[&str], cwd: Option<&Path>) -> Result<String> {
    let output = run_git_command(args, cwd)?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!(RemoteError::Git(format!(
            "git {}: {}",
            args.join(" "),
            stderr.trim()
        )));
    }

    Ok(String::from_utf8(output.stdout)
        .context("Git command output is not valid UTF-8")?
        .trim()
        .to_string())
}

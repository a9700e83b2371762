use owo_colors::OwoColorize;
use std::io::IsTerminal;

use crate::git::RemoteInfo;

/// Line printed after a browser was launched
pub fn format_opening(url: &str, use_colors: bool) -> String {
    if use_colors {
        format!("Opening {}", url.underline())
    } else {
        format!("Opening {}", url)
    }
}

/// Shown when no browser could be launched, so the URL can be opened by hand
pub fn format_manual_open(url: &str, use_colors: bool) -> String {
    if use_colors {
        format!("Open this URL in your browser: {}", url.underline())
    } else {
        format!("Open this URL in your browser: {}", url)
    }
}

/// One-line description of a remote for verbose output
pub fn format_remote(remote: &RemoteInfo, use_colors: bool) -> String {
    if use_colors {
        format!(
            "{} -> {} {}",
            remote.name.bold(),
            remote.domain.cyan(),
            remote.project_path().yellow()
        )
    } else {
        format!("{} -> {} {}", remote.name, remote.domain, remote.project_path())
    }
}

/// Numbered preferred domain list, highest priority first
pub fn format_domain_list(domains: &[String], use_colors: bool) -> String {
    if domains.is_empty() {
        return "No preferred domains configured.".to_string();
    }

    domains
        .iter()
        .enumerate()
        .map(|(i, domain)| {
            if use_colors {
                format!("{:>2}. {}", i + 1, domain.cyan())
            } else {
                format!("{:>2}. {}", i + 1, domain)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_lines() {
        assert_eq!(
            format_opening("https://gitlab.com/g/r", false),
            "Opening https://gitlab.com/g/r"
        );
        assert_eq!(
            format_manual_open("https://gitlab.com/g/r", false),
            "Open this URL in your browser: https://gitlab.com/g/r"
        );
    }

    #[test]
    fn test_format_remote() {
        let remote = RemoteInfo {
            name: "origin".to_string(),
            domain: "gitlab.com".to_string(),
            group: "group".to_string(),
            repository: "repo".to_string(),
        };
        assert_eq!(format_remote(&remote, false), "origin -> gitlab.com group/repo");
    }

    #[test]
    fn test_format_domain_list() {
        assert_eq!(format_domain_list(&[], false), "No preferred domains configured.");
        let domains = vec!["gitlab.com".to_string(), "gitlab.example.com".to_string()];
        assert_eq!(
            format_domain_list(&domains, false),
            " 1. gitlab.com\n 2. gitlab.example.com"
        );
    }

    #[test]
    fn test_colored_line_keeps_url() {
        assert!(format_opening("https://gitlab.com", true).contains("https://gitlab.com"));
    }
}

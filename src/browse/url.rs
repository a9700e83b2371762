use super::reference::{ResourceKind, ResourceReference};
use crate::git::RemoteInfo;

/// Branch whose top page is the repository page itself
pub const PRIMARY_BRANCH: &str = "master";

pub fn repository_url(remote: &RemoteInfo) -> String {
    format!("https://{}/{}/{}", remote.domain, remote.group, remote.repository)
}

pub fn branch_url(remote: &RemoteInfo, branch: &str) -> String {
    format!("{}/tree/{}", repository_url(remote), branch)
}

pub fn blob_url(remote: &RemoteInfo, branch: &str, path: &str) -> String {
    format!("{}/blob/{}/{}", repository_url(remote), branch, path)
}

pub fn tree_url(remote: &RemoteInfo, branch: &str, path: &str) -> String {
    format!("{}/tree/{}/{}", repository_url(remote), branch, path)
}

pub fn domain_url(domain: &str) -> String {
    format!("https://{}", domain)
}

fn resource_segment(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Issue => "issues",
        ResourceKind::MergeRequest => "merge_requests",
        ResourceKind::Pipeline => "pipelines",
    }
}

/// Detail page when the reference has a number, list page otherwise
pub fn resource_url(remote: &RemoteInfo, reference: &ResourceReference) -> String {
    let base = format!("{}/{}", repository_url(remote), resource_segment(reference.kind));
    match reference.number {
        Some(number) => format!("{}/{}", base, number),
        None => base,
    }
}

/// URL for the locally resolved remote. Without a reference the branch decides
/// between the repository page and the branch page.
pub fn url_by_remote(
    remote: &RemoteInfo,
    reference: Option<&ResourceReference>,
    branch: &str,
) -> String {
    match reference {
        Some(reference) => resource_url(remote, reference),
        None if branch == PRIMARY_BRANCH => repository_url(remote),
        None => branch_url(remote, branch),
    }
}

/// URL for a project named on the command line. Branches are not consulted.
pub fn url_by_user_specific(remote: &RemoteInfo, reference: Option<&ResourceReference>) -> String {
    match reference {
        Some(reference) => resource_url(remote, reference),
        None => repository_url(remote),
    }
}

/// Branch scoped page for a repository relative path; `""` is the branch top.
pub fn path_url(remote: &RemoteInfo, branch: &str, relative: &str, is_dir: bool) -> String {
    if relative.is_empty() {
        branch_url(remote, branch)
    } else if is_dir {
        tree_url(remote, branch, relative)
    } else {
        blob_url(remote, branch, relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote() -> RemoteInfo {
        RemoteInfo {
            name: "origin".to_string(),
            domain: "domain".to_string(),
            group: "group".to_string(),
            repository: "repository".to_string(),
        }
    }

    fn reference(kind: ResourceKind, number: Option<u64>) -> ResourceReference {
        ResourceReference { kind, number }
    }

    #[test]
    fn test_issue_pages() {
        let r = remote();
        assert_eq!(
            url_by_remote(&r, Some(&reference(ResourceKind::Issue, None)), "master"),
            "https://domain/group/repository/issues"
        );
        assert_eq!(
            url_by_remote(&r, Some(&reference(ResourceKind::Issue, Some(12))), "master"),
            "https://domain/group/repository/issues/12"
        );
    }

    #[test]
    fn test_merge_request_and_pipeline_pages() {
        let r = remote();
        assert_eq!(
            resource_url(&r, &reference(ResourceKind::MergeRequest, None)),
            "https://domain/group/repository/merge_requests"
        );
        assert_eq!(
            resource_url(&r, &reference(ResourceKind::MergeRequest, Some(5))),
            "https://domain/group/repository/merge_requests/5"
        );
        assert_eq!(
            resource_url(&r, &reference(ResourceKind::Pipeline, None)),
            "https://domain/group/repository/pipelines"
        );
        assert_eq!(
            resource_url(&r, &reference(ResourceKind::Pipeline, Some(99))),
            "https://domain/group/repository/pipelines/99"
        );
    }

    #[test]
    fn test_top_page_depends_on_branch() {
        let r = remote();
        assert_eq!(url_by_remote(&r, None, "master"), "https://domain/group/repository");
        assert_eq!(
            url_by_remote(&r, None, "feature-x"),
            "https://domain/group/repository/tree/feature-x"
        );
    }

    #[test]
    fn test_user_specific_ignores_branch() {
        let r = remote();
        assert_eq!(url_by_user_specific(&r, None), "https://domain/group/repository");
        assert_eq!(
            url_by_user_specific(&r, Some(&reference(ResourceKind::Issue, Some(3)))),
            "https://domain/group/repository/issues/3"
        );
    }

    #[test]
    fn test_path_urls() {
        let r = remote();
        assert_eq!(
            path_url(&r, "dev", "sub/file.go", false),
            "https://domain/group/repository/blob/dev/sub/file.go"
        );
        assert_eq!(
            path_url(&r, "dev", "sub", true),
            "https://domain/group/repository/tree/dev/sub"
        );
        assert_eq!(path_url(&r, "dev", "", true), "https://domain/group/repository/tree/dev");
    }

    #[test]
    fn test_domain_url() {
        assert_eq!(domain_url("gitlab.com"), "https://gitlab.com");
    }
}

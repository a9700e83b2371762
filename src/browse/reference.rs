use super::LocatorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Issue,
    MergeRequest,
    Pipeline,
}

/// Short reference prefixes, tested in order. Several prefixes alias one kind.
pub const REFERENCE_PREFIXES: &[(&str, ResourceKind)] = &[
    ("#", ResourceKind::Issue),
    ("i", ResourceKind::Issue),
    ("I", ResourceKind::Issue),
    ("!", ResourceKind::MergeRequest),
    ("m", ResourceKind::MergeRequest),
    ("M", ResourceKind::MergeRequest),
    ("p", ResourceKind::Pipeline),
    ("P", ResourceKind::Pipeline),
];

/// An issue, merge request or pipeline; `number: None` is the list page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceReference {
    pub kind: ResourceKind,
    pub number: Option<u64>,
}

impl ResourceReference {
    /// Parse `#12`, `!3`, `p`, `I7` and friends.
    pub fn parse(arg: &str) -> Result<Self, LocatorError> {
        let (kind, rest) = REFERENCE_PREFIXES
            .iter()
            .find_map(|(prefix, kind)| arg.strip_prefix(prefix).map(|rest| (*kind, rest)))
            .ok_or_else(|| LocatorError::InvalidArgument(arg.to_string()))?;

        if rest.is_empty() {
            return Ok(ResourceReference { kind, number: None });
        }

        let number: u64 = rest
            .parse()
            .map_err(|_| LocatorError::InvalidNumber(rest.to_string()))?;

        // GitLab numbers from 1, so #0 is the list page
        let number = if number == 0 { None } else { Some(number) };
        Ok(ResourceReference { kind, number })
    }
}

impl std::str::FromStr for ResourceReference {
    type Err = LocatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceReference::parse(s)
    }
}

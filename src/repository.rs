use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static GITHUB_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:https|git)://github\.com/(?P<owner>[^/]+)/(?P<name>[^./]+)")
        .expect("GitHub URL pattern should compile")
});

/// Owner and name of a repository hosted on GitHub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubRepository {
    pub owner: String,
    pub name: String,
}

impl GitHubRepository {
    /// Extracts owner and name from an `https://` or `git://` GitHub URL.
    ///
    /// Only the prefix has to match: trailing `.git` suffixes and extra path
    /// segments are ignored. Returns `None` for any other host or scheme.
    pub fn parse(url: &str) -> Option<Self> {
        let captures = GITHUB_URL_RE.captures(url)?;

        Some(Self {
            owner: captures["owner"].to_string(),
            name: captures["name"].to_string(),
        })
    }
}

impl fmt::Display for GitHubRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

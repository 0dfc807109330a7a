use std::io::Write;

use clap::builder::NonEmptyStringValueParser;
use clap::Parser;
use log::info;

use crate::error::Result;
use crate::providers::travis::{
    TravisProvider, DEFAULT_API_URL, DEFAULT_DOCS_URL, DEFAULT_WEB_URL,
};
use crate::providers::BranchStatusProvider;
use crate::repository::GitHubRepository;
use crate::status::BranchStatus;

/// Check a git branch status against Travis CI.
///
/// Prints a single line starting with SKIP, OK, WARNING or ERROR and, for
/// builds, the URL of the build.
#[derive(Parser, Debug)]
#[command(name = "check-branch-status")]
#[command(author, version)]
pub struct Cli {
    /// Git repository URL
    #[arg(short, long, value_parser = NonEmptyStringValueParser::new())]
    repository: String,

    /// Git branch
    #[arg(short, long, value_parser = NonEmptyStringValueParser::new())]
    branch: String,

    /// Travis API base URL
    #[arg(long, env = "TRAVIS_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Travis web base URL used for build links
    #[arg(long, env = "TRAVIS_WEB_URL", default_value = DEFAULT_WEB_URL)]
    web_url: String,

    /// Page linked when the Travis integration is not set up
    #[arg(long, default_value = DEFAULT_DOCS_URL)]
    docs_url: String,

    /// Exit with status 1 when the build failed
    #[arg(long, env = "TRAVIS_FAIL_ON_ERROR", default_value_t = false)]
    pub fail_on_error: bool,
}

impl Cli {
    /// Resolves the branch status and writes it to `out` as a single line.
    pub async fn execute(&self, out: &mut impl Write) -> Result<BranchStatus> {
        let status = match GitHubRepository::parse(&self.repository) {
            Some(repository) => {
                let provider = TravisProvider::new(&self.api_url, &self.web_url, &self.docs_url)?;
                provider.check_branch(&repository, &self.branch).await?
            }
            None => {
                info!("{} is not a GitHub repository", self.repository);
                BranchStatus::Skipped {
                    repository: self.repository.clone(),
                }
            }
        };

        writeln!(out, "{status}")?;
        Ok(status)
    }
}

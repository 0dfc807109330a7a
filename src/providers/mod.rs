pub mod travis;

use async_trait::async_trait;

use crate::error::Result;
use crate::repository::GitHubRepository;
use crate::status::BranchStatus;

#[async_trait]
pub trait BranchStatusProvider {
    async fn check_branch(
        &self,
        repository: &GitHubRepository,
        branch: &str,
    ) -> Result<BranchStatus>;
}

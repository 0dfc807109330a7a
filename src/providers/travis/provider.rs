use async_trait::async_trait;
use log::{info, warn};

use super::client::{TravisApi, TravisClient};
use crate::error::Result;
use crate::providers::BranchStatusProvider;
use crate::repository::GitHubRepository;
use crate::status::BranchStatus;

pub const DEFAULT_WEB_URL: &str = "https://travis-ci.org";
pub const DEFAULT_DOCS_URL: &str = "https://docs.moodle.org/dev/Travis_Integration";

pub struct TravisProvider<C = TravisClient> {
    pub client: C,
    pub web_url: String,
    pub docs_url: String,
}

impl TravisProvider {
    pub fn new(api_url: &str, web_url: &str, docs_url: &str) -> Result<Self> {
        let client = TravisClient::new(api_url)?;
        Ok(Self::with_client(client, web_url, docs_url))
    }
}

impl<C: TravisApi> TravisProvider<C> {
    pub fn with_client(client: C, web_url: &str, docs_url: &str) -> Self {
        Self {
            client,
            web_url: web_url.trim_end_matches('/').to_string(),
            docs_url: docs_url.to_string(),
        }
    }

    fn build_url(&self, repository: &GitHubRepository, build_id: &str) -> String {
        format!(
            "{}/{}/{}/builds/{build_id}",
            self.web_url, repository.owner, repository.name
        )
    }
}

#[async_trait]
impl<C: TravisApi + Sync> BranchStatusProvider for TravisProvider<C> {
    async fn check_branch(
        &self,
        repository: &GitHubRepository,
        branch: &str,
    ) -> Result<BranchStatus> {
        info!("Checking Travis status of {repository} branch {branch}");

        let repo = self
            .client
            .fetch_repository(&repository.owner, &repository.name)
            .await?;
        if !repo.is_active() {
            warn!("Travis integration is not active for {repository}");
            return Ok(BranchStatus::IntegrationInactive {
                docs_url: self.docs_url.clone(),
            });
        }

        let response = self
            .client
            .fetch_branch(&repository.owner, &repository.name, branch)
            .await?;

        let Some((state, id)) = response
            .branch
            .and_then(|branch| branch.state.map(|state| (state, branch.id)))
        else {
            info!("No build state reported for {repository}/{branch}");
            return Ok(BranchStatus::Unknown {
                slug: repository.to_string(),
                branch: branch.to_string(),
            });
        };

        let build_id = id.map(|id| id.to_string()).unwrap_or_default();
        let build_url = self.build_url(repository, &build_id);
        info!("Latest build of {repository}/{branch} is {state}");

        Ok(BranchStatus::from_state(&state, build_url))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::Value;

    use super::*;
    use crate::error::BranchStatusError;
    use crate::providers::travis::client::{
        BranchDto, BranchResponse, BuildId, RepositoryDto, RepositoryResponse,
    };

    /// In-memory Travis API that records which endpoints were hit.
    struct FakeTravis {
        active: Option<bool>,
        branch: Option<BranchDto>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeTravis {
        fn new(active: Option<bool>, branch: Option<BranchDto>) -> Self {
            Self {
                active,
                branch,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TravisApi for FakeTravis {
        async fn fetch_repository(&self, owner: &str, name: &str) -> Result<RepositoryResponse> {
            self.calls.lock().unwrap().push(format!("{owner}/{name}"));
            Ok(RepositoryResponse {
                repo: Some(RepositoryDto {
                    active: self.active.map(Value::Bool),
                }),
            })
        }

        async fn fetch_branch(
            &self,
            owner: &str,
            name: &str,
            branch: &str,
        ) -> Result<BranchResponse> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("{owner}/{name}/branches/{branch}"));
            Ok(BranchResponse {
                branch: self.branch.as_ref().map(|b| BranchDto {
                    id: b.id.clone(),
                    state: b.state.clone(),
                }),
            })
        }
    }

    struct FailingTravis;

    #[async_trait]
    impl TravisApi for FailingTravis {
        async fn fetch_repository(&self, _owner: &str, _name: &str) -> Result<RepositoryResponse> {
            Err(BranchStatusError::Api("connection reset".to_string()))
        }

        async fn fetch_branch(
            &self,
            _owner: &str,
            _name: &str,
            _branch: &str,
        ) -> Result<BranchResponse> {
            unreachable!("branch must not be fetched after a failed repository lookup")
        }
    }

    fn moodle() -> GitHubRepository {
        GitHubRepository {
            owner: "moodle".to_string(),
            name: "moodle".to_string(),
        }
    }

    fn branch(state: Option<&str>, id: Option<u64>) -> Option<BranchDto> {
        Some(BranchDto {
            id: id.map(|id| BuildId::Number(id.into())),
            state: state.map(str::to_string),
        })
    }

    fn provider(fake: FakeTravis) -> TravisProvider<FakeTravis> {
        TravisProvider::with_client(fake, DEFAULT_WEB_URL, DEFAULT_DOCS_URL)
    }

    #[tokio::test]
    async fn test_failed_build_is_error() {
        let provider = provider(FakeTravis::new(Some(true), branch(Some("failed"), Some(42))));

        let status = provider.check_branch(&moodle(), "main").await.unwrap();

        assert_eq!(
            status.to_string(),
            "ERROR: Build failed, see https://travis-ci.org/moodle/moodle/builds/42"
        );
    }

    #[tokio::test]
    async fn test_canceled_build_is_warning() {
        let provider = provider(FakeTravis::new(Some(true), branch(Some("canceled"), Some(7))));

        let status = provider.check_branch(&moodle(), "main").await.unwrap();

        assert_eq!(
            status.to_string(),
            "WARNING: Build canceled, see https://travis-ci.org/moodle/moodle/builds/7"
        );
    }

    #[tokio::test]
    async fn test_other_state_is_ok() {
        let provider = provider(FakeTravis::new(Some(true), branch(Some("passed"), Some(9))));

        let status = provider.check_branch(&moodle(), "main").await.unwrap();

        assert_eq!(
            status.to_string(),
            "OK: Build status was passed, see https://travis-ci.org/moodle/moodle/builds/9"
        );
    }

    #[tokio::test]
    async fn test_inactive_integration_skips_branch_lookup() {
        let fake = FakeTravis::new(Some(false), branch(Some("failed"), Some(1)));
        let provider = provider(fake);

        let status = provider.check_branch(&moodle(), "main").await.unwrap();

        assert_eq!(
            status.to_string(),
            "WARNING: Travis integration not setup. See https://docs.moodle.org/dev/Travis_Integration"
        );
        assert_eq!(provider.client.calls(), vec!["moodle/moodle"]);
    }

    #[tokio::test]
    async fn test_missing_active_flag_is_inactive() {
        let provider = provider(FakeTravis::new(None, branch(Some("passed"), Some(1))));

        let status = provider.check_branch(&moodle(), "main").await.unwrap();

        assert!(matches!(status, BranchStatus::IntegrationInactive { .. }));
    }

    #[tokio::test]
    async fn test_missing_branch_is_unknown() {
        let provider = provider(FakeTravis::new(Some(true), None));

        let status = provider
            .check_branch(&moodle(), "MDL-12345-master")
            .await
            .unwrap();

        assert_eq!(
            status.to_string(),
            "OK: Unknown state of moodle/moodle/MDL-12345-master"
        );
        assert_eq!(
            provider.client.calls(),
            vec!["moodle/moodle", "moodle/moodle/branches/MDL-12345-master"]
        );
    }

    #[tokio::test]
    async fn test_missing_state_is_unknown() {
        let provider = provider(FakeTravis::new(Some(true), branch(None, Some(3))));

        let status = provider.check_branch(&moodle(), "main").await.unwrap();

        assert_eq!(status.to_string(), "OK: Unknown state of moodle/moodle/main");
    }

    #[tokio::test]
    async fn test_missing_build_id_leaves_url_open() {
        let provider = provider(FakeTravis::new(Some(true), branch(Some("passed"), None)));

        let status = provider.check_branch(&moodle(), "main").await.unwrap();

        assert_eq!(
            status.to_string(),
            "OK: Build status was passed, see https://travis-ci.org/moodle/moodle/builds/"
        );
    }

    #[tokio::test]
    async fn test_custom_web_url() {
        let fake = FakeTravis::new(Some(true), branch(Some("failed"), Some(5)));
        let provider =
            TravisProvider::with_client(fake, "https://travis.example.com/", DEFAULT_DOCS_URL);

        let status = provider.check_branch(&moodle(), "main").await.unwrap();

        assert_eq!(
            status.to_string(),
            "ERROR: Build failed, see https://travis.example.com/moodle/moodle/builds/5"
        );
    }

    #[tokio::test]
    async fn test_api_errors_propagate() {
        let provider =
            TravisProvider::with_client(FailingTravis, DEFAULT_WEB_URL, DEFAULT_DOCS_URL);

        let result = provider.check_branch(&moodle(), "main").await;

        assert!(matches!(result, Err(BranchStatusError::Api(_))));
    }

    #[tokio::test]
    async fn test_fractional_build_id_still_reports_failure() {
        let fake = FakeTravis::new(
            Some(true),
            Some(BranchDto {
                id: serde_json::Number::from_f64(42.0).map(BuildId::Number),
                state: Some("failed".to_string()),
            }),
        );
        let provider = provider(fake);

        let status = provider.check_branch(&moodle(), "main").await.unwrap();

        assert_eq!(
            status.to_string(),
            "ERROR: Build failed, see https://travis-ci.org/moodle/moodle/builds/42.0"
        );
    }
}

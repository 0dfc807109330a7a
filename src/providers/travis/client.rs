use std::fmt;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Number, Value};
use url::Url;

use crate::error::{BranchStatusError, Result};

pub const DEFAULT_API_URL: &str = "https://api.travis-ci.org";

const TRAVIS_MEDIA_TYPE: &str = "application/vnd.travis-ci.2+json";

#[derive(Debug, Default, Deserialize)]
pub struct RepositoryResponse {
    pub repo: Option<RepositoryDto>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RepositoryDto {
    pub active: Option<Value>,
}

impl RepositoryResponse {
    /// A missing `repo` object or `active` flag counts as inactive. Non-boolean
    /// flags follow loose truthiness: `0`, `""`, `"0"` and `[]` are inactive.
    pub fn is_active(&self) -> bool {
        self.repo
            .as_ref()
            .and_then(|repo| repo.active.as_ref())
            .is_some_and(is_truthy)
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty() && text != "0",
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct BranchResponse {
    pub branch: Option<BranchDto>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BranchDto {
    pub id: Option<BuildId>,
    pub state: Option<String>,
}

/// Build identifiers are numeric in practice but any JSON number or string is
/// accepted and rendered as-is.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum BuildId {
    Number(Number),
    Text(String),
}

impl fmt::Display for BuildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

#[async_trait]
pub trait TravisApi {
    async fn fetch_repository(&self, owner: &str, name: &str) -> Result<RepositoryResponse>;

    async fn fetch_branch(&self, owner: &str, name: &str, branch: &str)
        -> Result<BranchResponse>;
}

pub struct TravisClient {
    client: Client,
    api_url: Url,
}

impl TravisClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(TRAVIS_MEDIA_TYPE));

        let client = Client::builder()
            .user_agent(concat!("travis-branch-status/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| BranchStatusError::Config(format!("Failed to create HTTP client: {e}")))?;

        let api_url = Url::parse(base_url)
            .map_err(|e| BranchStatusError::Config(format!("Invalid API base URL: {e}")))?;
        if api_url.cannot_be_a_base() {
            return Err(BranchStatusError::Config(format!(
                "Invalid API base URL: {base_url}"
            )));
        }

        Ok(Self { client, api_url })
    }

    /// Appends path segments to the API base URL, percent-encoding each one.
    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                BranchStatusError::Config(format!("Invalid API base URL: {}", self.api_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET a JSON document.
    ///
    /// A `null` document decodes as empty. Client errors are not fatal: Travis
    /// answers unknown repositories and branches with a 404 whose body simply
    /// lacks the expected fields, so an undecodable 4xx body is treated as an
    /// empty document too.
    async fn get_json<T: DeserializeOwned + Default + Send>(&self, url: Url) -> Result<T> {
        debug!("GET {url}");

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if status.is_server_error() {
            return Err(BranchStatusError::Api(format!("{url} returned {status}")));
        }

        let body = response.text().await?;
        match serde_json::from_str::<Option<T>>(&body) {
            Ok(document) => Ok(document.unwrap_or_default()),
            Err(e) if status.is_client_error() => {
                warn!("Ignoring undecodable {status} response from {url}: {e}");
                Ok(T::default())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl TravisApi for TravisClient {
    async fn fetch_repository(&self, owner: &str, name: &str) -> Result<RepositoryResponse> {
        let url = self.endpoint(["repos", owner, name])?;
        self.get_json(url).await
    }

    async fn fetch_branch(
        &self,
        owner: &str,
        name: &str,
        branch: &str,
    ) -> Result<BranchResponse> {
        // Slashes in branch names stay path separators.
        let segments = ["repos", owner, name, "branches"]
            .into_iter()
            .chain(branch.split('/'));
        let url = self.endpoint(segments)?;
        self.get_json(url).await
    }
}

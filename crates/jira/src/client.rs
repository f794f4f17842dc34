use std::fmt;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::trace;
use url::Url;

use common::{Comment, DataSource, Issue, Project};

use crate::error::ApiError;
use crate::wire::{CommentWire, IssueWire, ProjectWire, SearchResults};

/// Basic auth credentials. The password is never printed.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Client for a Jira REST v2 API rooted at e.g.
/// `https://jira.example.com/rest/api/2`.
#[derive(Debug, Clone)]
pub struct JiraClient {
    api_root: Url,
    client: Client,
    auth: Option<Credentials>,
}

impl JiraClient {
    pub fn new(api_root: &Url) -> Result<Self, ApiError> {
        if api_root.cannot_be_a_base() {
            return Err(ApiError::BaseUrl(api_root.to_string()));
        }
        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder().default_headers(default_headers).build()?;

        Ok(Self {
            api_root: api_root.clone(),
            client,
            auth: None,
        })
    }

    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = Some(Credentials {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    pub fn api_root(&self) -> &Url {
        &self.api_root
    }

    /// API URL for a sequence of path segments below the root.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut u = self.api_root.clone();
        u.path_segments_mut()
            .map_err(|_| ApiError::BaseUrl(self.api_root.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(u)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        trace!(%method, %url, "jira request");
        let builder = self.client.request(method, url);
        match &self.auth {
            Some(auth) => builder.basic_auth(&auth.username, Some(&auth.password)),
            None => builder,
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let response = self.request(Method::GET, url).send().await?;
        if response.status().is_success() {
            Ok(response.json::<T>().await?)
        } else {
            Err(ApiError::HttpStatus(
                response.status(),
                response.text().await?,
            ))
        }
    }

    /// Whether a resource exists, without fetching it.
    async fn exists(&self, url: Url) -> Result<bool, ApiError> {
        let response = self.request(Method::HEAD, url).send().await?;
        match response.status() {
            s if s.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            s => Err(ApiError::HttpStatus(s, String::new())),
        }
    }

    /// Run a JQL query. Only the first page of results is returned.
    pub async fn search(&self, jql: &str) -> Result<Vec<Issue>, ApiError> {
        let mut u = self.endpoint(&["search"])?;
        u.query_pairs_mut().append_pair("jql", jql);
        let results: SearchResults = self.get(u).await?;
        results.issues.into_iter().map(Issue::try_from).collect()
    }
}

#[async_trait]
impl DataSource for JiraClient {
    type Error = ApiError;

    async fn projects(&self) -> Result<Vec<Project>, Self::Error> {
        let projects: Vec<ProjectWire> = self.get(self.endpoint(&["project"])?).await?;
        Ok(projects.into_iter().map(Project::from).collect())
    }

    async fn project(&self, key: &str) -> Result<Project, Self::Error> {
        let project: ProjectWire = self.get(self.endpoint(&["project", key])?).await?;
        Ok(project.into())
    }

    async fn issues(&self, project: &str) -> Result<Vec<Issue>, Self::Error> {
        self.search(&format!("project = \"{}\"", project)).await
    }

    async fn issue_exists(&self, key: &str) -> Result<bool, Self::Error> {
        self.exists(self.endpoint(&["issue", key])?).await
    }

    async fn issue(&self, key: &str) -> Result<Issue, Self::Error> {
        let issue: IssueWire = self.get(self.endpoint(&["issue", key])?).await?;
        issue.try_into()
    }

    async fn comment_exists(&self, issue: &str, id: &str) -> Result<bool, Self::Error> {
        self.exists(self.endpoint(&["issue", issue, "comment", id])?)
            .await
    }

    async fn comment(&self, issue: &str, id: &str) -> Result<Comment, Self::Error> {
        let comment: CommentWire = self
            .get(self.endpoint(&["issue", issue, "comment", id])?)
            .await?;
        comment.try_into()
    }
}

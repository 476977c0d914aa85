//! GitHub platform service implementation

use crate::error::{Error, Result};
use crate::platform::{ReviewPlatform, clean_pr_body};
use crate::types::{Notification, PrState, PullRequest};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use octocrab::Octocrab;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

/// Public GitHub REST endpoint
const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Notifications page size
const NOTIFICATIONS_PER_PAGE: u8 = 50;

// GraphQL response types for the auto-merge mutation

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnableAutoMergeData {
    enable_pull_request_auto_merge: Option<serde_json::Value>,
}

/// GitHub service using octocrab
pub struct GitHubService {
    client: Octocrab,
    /// Token for raw HTTP requests (compare, update-branch)
    token: String,
    /// HTTP client for raw requests
    http_client: Client,
    /// REST base URL, without trailing slash
    api_base: String,
    /// How far back the notification feed is read
    lookback: Duration,
}

impl GitHubService {
    /// Create a service for github.com or a GitHub Enterprise host
    pub fn new(token: &str, host: Option<&str>, lookback_days: u32) -> Result<Self> {
        let api_base = host.map_or_else(
            || DEFAULT_API_BASE.to_string(),
            |h| format!("https://{h}/api/v3"),
        );
        Self::with_api_base(token, &api_base, lookback_days)
    }

    /// Create a service against an explicit REST base URL
    pub fn with_api_base(token: &str, api_base: &str, lookback_days: u32) -> Result<Self> {
        let api_base = api_base.trim_end_matches('/').to_string();

        let client = Octocrab::builder()
            .personal_token(token.to_string())
            .base_uri(api_base.as_str())
            .map_err(|e| Error::GitHubApi(e.to_string()))?
            .build()
            .map_err(|e| Error::GitHubApi(e.to_string()))?;

        let http_client = Client::builder()
            .user_agent("hunk-review")
            .build()
            .map_err(|e| Error::GitHubApi(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            token: token.to_string(),
            http_client,
            api_base,
            lookback: Duration::days(i64::from(lookback_days)),
        })
    }

    fn repo_url(&self, owner: &str, repo: &str, rest: &str) -> String {
        format!("{}/repos/{owner}/{repo}/{rest}", self.api_base)
    }
}

/// Helper to convert an octocrab PR into our `PullRequest`
///
/// `owner`/`repo` are fallbacks for when the payload omits the base repository.
fn pr_from_octocrab(
    pr: &octocrab::models::pulls::PullRequest,
    owner: &str,
    repo: &str,
) -> PullRequest {
    let state = match pr.state {
        Some(octocrab::models::IssueState::Open) => PrState::Open,
        Some(octocrab::models::IssueState::Closed) if pr.merged_at.is_some() => PrState::Merged,
        // IssueState is non-exhaustive, so use wildcard for Closed and any future variants
        Some(_) | None => PrState::Closed,
    };

    let base_repo = pr.base.repo.as_ref();

    PullRequest {
        number: pr.number,
        html_url: pr
            .html_url
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
        owner: base_repo
            .and_then(|r| r.owner.as_ref())
            .map_or_else(|| owner.to_string(), |o| o.login.clone()),
        repo: base_repo.map_or_else(|| repo.to_string(), |r| r.name.clone()),
        title: pr.title.clone().unwrap_or_default(),
        body: pr.body.clone(),
        node_id: pr.node_id.clone(),
        base_ref: pr.base.ref_field.clone(),
        head_ref: pr.head.ref_field.clone(),
        author: pr
            .user
            .as_ref()
            .map(|u| u.login.clone())
            .unwrap_or_default(),
        state,
    }
}

fn notification_from_octocrab(n: octocrab::models::activity::Notification) -> Notification {
    Notification {
        id: n.id.0.to_string(),
        reason: n.reason,
        owner: n
            .repository
            .owner
            .map(|o| o.login)
            .unwrap_or_default(),
        repo: n.repository.name,
        subject_title: n.subject.title,
        subject_type: n.subject.r#type,
        subject_url: n.subject.url.map(|u| u.to_string()),
        updated_at: n.updated_at,
    }
}

#[async_trait]
impl ReviewPlatform for GitHubService {
    async fn list_review_notifications(&self) -> Result<Vec<Notification>> {
        let since = Utc::now() - self.lookback;
        debug!(%since, "listing notifications");

        let first_page = self
            .client
            .activity()
            .notifications()
            .list()
            .all(true)
            .since(since)
            .per_page(NOTIFICATIONS_PER_PAGE)
            .send()
            .await
            .map_err(|e| Error::Notifications(e.to_string()))?;

        let all = self
            .client
            .all_pages(first_page)
            .await
            .map_err(|e| Error::Notifications(e.to_string()))?;

        let result: Vec<Notification> = all.into_iter().map(notification_from_octocrab).collect();
        debug!(count = result.len(), "listed notifications");
        Ok(result)
    }

    async fn get_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Option<PullRequest>> {
        debug!(owner, repo, number, "getting PR");
        match self.client.pulls(owner, repo).get(number).await {
            Ok(pr) => Ok(Some(pr_from_octocrab(&pr, owner, repo))),
            Err(octocrab::Error::GitHub { source, .. }) if source.status_code.as_u16() == 404 => {
                debug!(owner, repo, number, "PR not found");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_diff(&self, pr: &PullRequest) -> Result<String> {
        debug!(pr = %pr.html_url, "fetching diff");
        let diff = self
            .client
            .pulls(&pr.owner, &pr.repo)
            .get_diff(pr.number)
            .await?;
        debug!(pr = %pr.html_url, bytes = diff.len(), "fetched diff");
        Ok(diff)
    }

    async fn get_pr_comment(&self, pr: &PullRequest) -> Result<String> {
        debug!(pr = %pr.html_url, "fetching PR description");
        let fresh = self
            .client
            .pulls(&pr.owner, &pr.repo)
            .get(pr.number)
            .await?;

        let body = fresh.body.unwrap_or_default();
        if body.trim().is_empty() {
            return Err(Error::GitHubApi(format!(
                "no description found for PR {}",
                pr.html_url
            )));
        }
        Ok(clean_pr_body(body.trim()))
    }

    async fn is_branch_behind(
        &self,
        owner: &str,
        repo: &str,
        base_ref: &str,
        head_ref: &str,
    ) -> Result<bool> {
        #[derive(Deserialize)]
        struct Comparison {
            status: String,
        }

        let url = self.repo_url(
            owner,
            repo,
            &format!(
                "compare/{}...{}",
                urlencoding::encode(base_ref),
                urlencoding::encode(head_ref)
            ),
        );

        let response = self
            .http_client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .send()
            .await
            .map_err(|e| Error::GitHubApi(format!("Failed to compare branches: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::GitHubApi(format!(
                "compare {base_ref}...{head_ref} in {owner}/{repo} returned {status}: {body}"
            )));
        }

        let comparison: Comparison = response
            .json()
            .await
            .map_err(|e| Error::GitHubApi(format!("Failed to parse comparison: {e}")))?;

        // "identical", "ahead", "behind" or "diverged"
        debug!(owner, repo, base_ref, head_ref, status = %comparison.status, "compared branches");
        Ok(comparison.status == "behind")
    }

    async fn update_branch(&self, owner: &str, repo: &str, number: u64) -> Result<()> {
        debug!(owner, repo, number, "updating branch");
        let url = self.repo_url(owner, repo, &format!("pulls/{number}/update-branch"));

        let response = self
            .http_client
            .put(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| Error::GitHubApi(format!("Failed to update branch: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::GitHubApi(format!(
                "update-branch for {owner}/{repo}#{number} returned {status}: {body}"
            )));
        }

        debug!(owner, repo, number, "updated branch");
        Ok(())
    }

    async fn create_approving_review(&self, owner: &str, repo: &str, number: u64) -> Result<()> {
        debug!(owner, repo, number, "creating approving review");
        let _review: serde_json::Value = self
            .client
            .post(
                format!("/repos/{owner}/{repo}/pulls/{number}/reviews"),
                Some(&serde_json::json!({ "event": "APPROVE" })),
            )
            .await?;
        debug!(owner, repo, number, "created approving review");
        Ok(())
    }

    async fn enable_auto_merge(&self, node_id: &str) -> Result<()> {
        debug!(node_id, "enabling auto-merge");
        let response: GraphQlResponse<EnableAutoMergeData> = self
            .client
            .graphql(&serde_json::json!({
                "query": r"
                    mutation EnableAutoMerge($pullId: ID!, $mergeMethod: PullRequestMergeMethod!) {
                        enablePullRequestAutoMerge(input: { pullRequestId: $pullId, mergeMethod: $mergeMethod }) {
                            pullRequest { id }
                        }
                    }
                ",
                "variables": {
                    "pullId": node_id,
                    "mergeMethod": "SQUASH"
                }
            }))
            .await
            .map_err(|e| Error::GitHubApi(format!("GraphQL mutation failed: {e}")))?;

        // Check for GraphQL errors
        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            let messages: Vec<_> = errors.into_iter().map(|e| e.message).collect();
            return Err(Error::GitHubApi(format!(
                "GraphQL error: {}",
                messages.join(", ")
            )));
        }

        if response
            .data
            .and_then(|d| d.enable_pull_request_auto_merge)
            .is_none()
        {
            return Err(Error::GitHubApi("No data in GraphQL response".to_string()));
        }

        debug!(node_id, "enabled auto-merge");
        Ok(())
    }

    async fn squash_merge(&self, pr: &PullRequest) -> Result<()> {
        debug!(pr = %pr.html_url, "squash merging");
        let pulls = self.client.pulls(&pr.owner, &pr.repo);

        let mut builder = pulls
            .merge(pr.number)
            .method(octocrab::params::pulls::MergeMethod::Squash)
            .title(format!("{} (#{})", pr.title, pr.number));
        if let Some(ref body) = pr.body {
            builder = builder.message(body);
        }

        let result = builder
            .send()
            .await
            .map_err(|e| Error::GitHubApi(format!("Merge failed: {e}")))?;

        if !result.merged {
            return Err(Error::GitHubApi(format!(
                "Merge not performed: {}",
                result.message.unwrap_or_default()
            )));
        }

        debug!(pr = %pr.html_url, sha = ?result.sha, "squash merged");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(server: &mockito::Server) -> GitHubService {
        GitHubService::with_api_base("test-token", &server.url(), 3).unwrap()
    }

    #[tokio::test]
    async fn test_branch_behind_when_compare_says_behind() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/repos/octo/widgets/compare/main...dependabot%2Fcargo%2Fserde")
            .match_header("authorization", "Bearer test-token")
            .with_status(200)
            .with_body(r#"{"status":"behind","ahead_by":0,"behind_by":3}"#)
            .create_async()
            .await;

        let behind = service(&server)
            .is_branch_behind("octo", "widgets", "main", "dependabot/cargo/serde")
            .await
            .unwrap();

        assert!(behind);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_branch_not_behind_when_identical_or_ahead() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/repos/octo/widgets/compare/main...feature")
            .with_status(200)
            .with_body(r#"{"status":"ahead"}"#)
            .create_async()
            .await;

        let behind = service(&server)
            .is_branch_behind("octo", "widgets", "main", "feature")
            .await
            .unwrap();
        assert!(!behind);
    }

    #[tokio::test]
    async fn test_compare_failure_names_repo() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/repos/octo/widgets/compare/main...gone")
            .with_status(404)
            .with_body(r#"{"message":"Not Found"}"#)
            .create_async()
            .await;

        let err = service(&server)
            .is_branch_behind("octo", "widgets", "main", "gone")
            .await
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("octo/widgets"), "{msg}");
        assert!(msg.contains("404"), "{msg}");
    }

    #[tokio::test]
    async fn test_update_branch_uses_put() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/repos/octo/widgets/pulls/7/update-branch")
            .with_status(202)
            .with_body(r#"{"message":"Updating pull request branch."}"#)
            .create_async()
            .await;

        service(&server)
            .update_branch("octo", "widgets", 7)
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_update_branch_failure_is_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PUT", "/repos/octo/widgets/pulls/7/update-branch")
            .with_status(422)
            .with_body(r#"{"message":"merge conflict"}"#)
            .create_async()
            .await;

        let err = service(&server)
            .update_branch("octo", "widgets", 7)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("octo/widgets#7"));
    }
}

//! GitLab Registry Implementation
//!
//! Talks to the GitLab v4 REST API for listing and merge requests, and
//! shells out to `git` with a token-authenticated URL for clone and push.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use super::{ProjectCandidate, ProjectRegistry};
use crate::config::BatchConfig;
use crate::constants::network;
use crate::repo::git;
use crate::types::{DocError, Result};

/// GitLab-backed project registry
pub struct GitLabRegistry {
    base_url: Url,
    token: SecretString,
    client: reqwest::Client,
}

impl std::fmt::Debug for GitLabRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitLabRegistry")
            .field("base_url", &self.base_url.as_str())
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl GitLabRegistry {
    pub fn new(config: &BatchConfig) -> Result<Self> {
        let base_url = Url::parse(&config.registry_url)
            .map_err(|e| DocError::Config(format!("invalid registry_url: {}", e)))?;

        let token = config.registry_token.clone().ok_or_else(|| {
            DocError::Config("batch registry_token is required for registry access".to_string())
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(network::REGISTRY_TIMEOUT_SECS))
            .build()
            .map_err(|e| DocError::Registry(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            token: SecretString::from(token),
            client,
        })
    }

    fn api_url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(&format!("/api/v4/{}", path))
            .map_err(|e| DocError::Registry(format!("invalid API path '{}': {}", path, e)))
    }

    /// Clone URL with the token injected as credentials, so clone and push
    /// authenticate without touching the user's git config.
    fn authenticated_url(&self, candidate: &ProjectCandidate) -> Result<Url> {
        let mut url = Url::parse(&candidate.http_url_to_repo).map_err(|e| {
            DocError::Registry(format!(
                "candidate '{}' has invalid clone URL: {}",
                candidate.path_with_namespace, e
            ))
        })?;

        url.set_username("oauth2").map_err(|_| {
            DocError::Registry("clone URL does not accept credentials".to_string())
        })?;
        url.set_password(Some(self.token.expose_secret()))
            .map_err(|_| {
                DocError::Registry("clone URL does not accept credentials".to_string())
            })?;

        Ok(url)
    }
}

#[async_trait]
impl ProjectRegistry for GitLabRegistry {
    async fn list_candidates(&self, group_id: u64) -> Result<Vec<ProjectCandidate>> {
        let url = self.api_url(&format!("groups/{}/projects", group_id))?;

        let mut candidates = Vec::new();
        let mut page: u32 = 1;

        // GitLab caps per_page at 100 and signals the next page in a header
        loop {
            debug!("Listing candidates for group {} (page {})", group_id, page);
            let page_str = page.to_string();
            let response = self
                .client
                .get(url.clone())
                .header("PRIVATE-TOKEN", self.token.expose_secret())
                .query(&[
                    ("include_subgroups", "true"),
                    ("archived", "false"),
                    ("order_by", "last_activity_at"),
                    ("sort", "desc"),
                    ("per_page", "100"),
                    ("page", page_str.as_str()),
                ])
                .send()
                .await
                .map_err(|e| DocError::Registry(format!("candidate listing failed: {}", e)))?;

            let status = response.status();
            if !status.is_success() {
                return Err(DocError::Registry(format!(
                    "candidate listing returned {}",
                    status
                )));
            }

            let next_page = response
                .headers()
                .get("x-next-page")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u32>().ok());

            let mut batch: Vec<ProjectCandidate> = response.json().await.map_err(|e| {
                DocError::Registry(format!("failed to parse candidate list: {}", e))
            })?;
            candidates.append(&mut batch);

            match next_page {
                Some(next) => page = next,
                None => break,
            }
        }

        info!(
            "Registry returned {} candidates for group {}",
            candidates.len(),
            group_id
        );
        Ok(candidates)
    }

    async fn clone_repo(&self, candidate: &ProjectCandidate, dest: &Path) -> Result<()> {
        let url = self.authenticated_url(candidate)?;
        let parent = dest
            .parent()
            .ok_or_else(|| DocError::Acquisition("clone destination has no parent".to_string()))?;

        let mut args = vec!["clone", "--depth", "1"];
        if let Some(branch) = candidate.default_branch.as_deref() {
            args.extend(["--branch", branch]);
        }
        let url_str = url.to_string();
        let dest_str = dest.to_string_lossy().into_owned();
        args.push(&url_str);
        args.push(&dest_str);

        git::run(parent, &args)
            .await
            .map_err(DocError::Acquisition)?;

        Ok(())
    }

    async fn push(&self, local: &Path, branch: &str) -> Result<()> {
        git::run(local, &["push", "--set-upstream", "origin", branch])
            .await
            .map_err(DocError::Publication)?;
        Ok(())
    }

    async fn open_merge_request(
        &self,
        candidate: &ProjectCandidate,
        branch: &str,
        title: &str,
        description: &str,
    ) -> Result<()> {
        let url = self.api_url(&format!("projects/{}/merge_requests", candidate.id))?;
        let target = candidate.default_branch.as_deref().unwrap_or("main");

        let body = json!({
            "source_branch": branch,
            "target_branch": target,
            "title": title,
            "description": description,
            "remove_source_branch": true,
        });

        let response = self
            .client
            .post(url)
            .header("PRIVATE-TOKEN", self.token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| DocError::Publication(format!("merge request creation failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DocError::Publication(format!(
                "merge request creation returned {}: {}",
                status,
                body.chars().take(300).collect::<String>()
            )));
        }

        info!(
            candidate = %candidate.path_with_namespace,
            "Opened merge request for branch {}",
            branch
        );
        Ok(())
    }
}

//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use anyhow::anyhow;
use anyhow::Context;
use anyhow::Result;
use getset::Getters;
use serde::Deserialize;
use serde::Serialize;
use tracing::{debug, trace};
use url::Url;

use crate::remote::endpoint;

/// A branch in a fork, written as "username:branch"
#[derive(Clone, Debug, Eq, PartialEq, Getters)]
pub struct GitHubOrigin {
    #[getset(get = "pub")]
    username: String,

    #[getset(get = "pub")]
    branch: String,
}

impl std::str::FromStr for GitHubOrigin {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once(':') {
            Some((username, branch)) if !username.is_empty() && !branch.is_empty() => {
                Ok(GitHubOrigin {
                    username: username.to_string(),
                    branch: branch.to_string(),
                })
            }
            _ => Err(anyhow!("Invalid GitHub origin: {}", s)),
        }
    }
}

impl std::fmt::Display for GitHubOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.username, self.branch)
    }
}

/// The owner of a fork, from the URL of the `origin` remote
///
/// Only `https://github.com/<owner>/...` URLs are recognized.
pub fn fork_owner(origin_url: &str, github_url: &Url) -> Option<String> {
    let url = Url::parse(origin_url).ok()?;
    if url.scheme() != "https" || url.host_str() != github_url.host_str() {
        return None;
    }

    url.path_segments()?
        .next()
        .filter(|owner| !owner.is_empty())
        .map(String::from)
}

/// The parts of a GitHub user we care about
#[derive(Clone, Debug, Deserialize, Getters)]
pub struct GitHubUser {
    #[getset(get = "pub")]
    login: String,

    #[serde(default)]
    #[getset(get = "pub")]
    name: Option<String>,

    #[serde(default)]
    #[getset(get = "pub")]
    company: Option<String>,
}

#[derive(Debug, Serialize, Eq, PartialEq)]
pub struct PullRequest {
    title: String,
    body: String,
    head: String,
    base: String,
}

impl PullRequest {
    /// Pull request of `origin` ("username:branch") against master, pointing back to the code
    /// review it belongs to
    pub fn for_review(
        codereview_url: &Url,
        issue_number: u64,
        origin: &str,
        description: &str,
    ) -> Self {
        let review_url = format!(
            "{}/{}/",
            codereview_url.as_str().trim_end_matches('/'),
            issue_number
        );

        PullRequest {
            title: format!("{}: {}", issue_number, description),
            body: format!(
                "[Code review: {}: {}]({})",
                issue_number, description, review_url
            ),
            head: origin.to_string(),
            base: String::from("master"),
        }
    }
}

pub struct GitHubHelper {
    organization: String,
    project: String,
    web_url: Url,
    api_url: Url,
    client: reqwest::Client,
}

impl GitHubHelper {
    pub fn new(
        organization: String,
        project: String,
        web_url: Url,
        api_url: Url,
        client: reqwest::Client,
    ) -> Self {
        GitHubHelper {
            organization,
            project,
            web_url,
            api_url,
            client,
        }
    }

    pub async fn create_pull_request(
        &self,
        access_token: &str,
        pull_request: &PullRequest,
    ) -> Result<()> {
        let url = endpoint(
            &self.api_url,
            &["repos", self.organization.as_str(), self.project.as_str(), "pulls"],
        )?;
        debug!("Creating pull request at {}: {:?}", url, pull_request);

        let response = self
            .client
            .post(url.clone())
            .header(reqwest::header::AUTHORIZATION, format!("token {}", access_token))
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .json(pull_request)
            .send()
            .await
            .with_context(|| anyhow!("Sending pull request to {}", url))?;

        let status = response.status();
        trace!("Pull request creation returned {}", status);
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Creating pull request failed with {}: {}", status, text));
        }

        Ok(())
    }

    /// Git URL of the fork of this project owned by `username`
    pub fn fork_git_repo_url(&self, username: &str) -> String {
        format!(
            "{}/{}/{}.git",
            self.web_url.as_str().trim_end_matches('/'),
            username,
            self.project
        )
    }

    /// Query a user, `None` if there is no such user
    pub async fn query_user(&self, username: &str) -> Result<Option<GitHubUser>> {
        let url = endpoint(&self.api_url, &["users", username])?;
        debug!("Querying GitHub user at {}", url);

        let response = self
            .client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .with_context(|| anyhow!("Querying {}", url))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        response
            .error_for_status()
            .with_context(|| anyhow!("Querying {}", url))?
            .json::<GitHubUser>()
            .await
            .with_context(|| anyhow!("Parsing GitHub user {}", username))
            .map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::remote::tests::StubServer;

    fn helper(api: &str) -> GitHubHelper {
        GitHubHelper::new(
            String::from("log2timeline"),
            String::from("plaso"),
            Url::parse("https://github.com").unwrap(),
            Url::parse(api).unwrap(),
            reqwest::Client::new(),
        )
    }

    #[test]
    fn test_parse_origin() {
        let o = "jane:feature".parse::<GitHubOrigin>().unwrap();
        assert_eq!(o.username(), "jane");
        assert_eq!(o.branch(), "feature");
        assert_eq!(o.to_string(), "jane:feature");

        assert!("jane".parse::<GitHubOrigin>().is_err());
        assert!(":feature".parse::<GitHubOrigin>().is_err());
        assert!("jane:".parse::<GitHubOrigin>().is_err());
    }

    #[test]
    fn test_fork_owner() {
        let gh = Url::parse("https://github.com").unwrap();
        assert_eq!(
            fork_owner("https://github.com/jane/plaso.git", &gh).as_deref(),
            Some("jane")
        );
        assert_eq!(fork_owner("git@github.com:jane/plaso.git", &gh), None);
        assert_eq!(fork_owner("https://gitlab.com/jane/plaso.git", &gh), None);
    }

    #[test]
    fn test_fork_git_repo_url() {
        let h = helper("https://api.github.com");
        assert_eq!(
            h.fork_git_repo_url("jane"),
            "https://github.com/jane/plaso.git"
        );
    }

    #[test]
    fn test_pull_request_for_review() {
        let cr = Url::parse("https://codereview.appspot.com").unwrap();
        let pr = PullRequest::for_review(&cr, 291860043, "jane:feature", "Added parser");
        let json = serde_json::to_value(&pr).unwrap();

        assert_eq!(json["title"], "291860043: Added parser");
        assert_eq!(
            json["body"],
            "[Code review: 291860043: Added parser](https://codereview.appspot.com/291860043/)"
        );
        assert_eq!(json["head"], "jane:feature");
        assert_eq!(json["base"], "master");
    }

    #[test]
    fn test_description_with_quotes_is_escaped() {
        let cr = Url::parse("https://codereview.appspot.com").unwrap();
        let pr = PullRequest::for_review(&cr, 1, "jane:f", "Fixed \"quoted\" name");
        let s = serde_json::to_string(&pr).unwrap();
        assert!(s.contains(r#"1: Fixed \"quoted\" name"#));
    }

    #[test]
    fn test_parse_user() {
        let user: GitHubUser = serde_json::from_str(
            r#"{"login": "jane", "id": 1, "name": null, "company": "ACME"}"#,
        )
        .unwrap();
        assert_eq!(user.login(), "jane");
        assert_eq!(*user.name(), None);
        assert_eq!(user.company().as_deref(), Some("ACME"));
    }

    #[tokio::test]
    async fn test_create_pull_request() {
        let server = StubServer::start(&[("POST /repos/log2timeline/plaso/pulls", 201, "{}")]).await;
        let h = helper(server.url().as_str());
        let cr = Url::parse("https://codereview.appspot.com").unwrap();
        let pr = PullRequest::for_review(&cr, 42, "jane:feature", "Added parser");

        h.create_pull_request("ghtoken", &pr).await.unwrap();

        let request = server
            .request("POST /repos/log2timeline/plaso/pulls")
            .unwrap();
        assert_eq!(request.header("authorization"), Some("token ghtoken"));
        let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
        assert_eq!(body["title"], "42: Added parser");
        assert_eq!(body["head"], "jane:feature");
        assert_eq!(body["base"], "master");
    }

    #[tokio::test]
    async fn test_create_pull_request_rejected() {
        let server = StubServer::start(&[(
            "POST /repos/log2timeline/plaso/pulls",
            422,
            r#"{"message": "Validation Failed"}"#,
        )])
        .await;
        let h = helper(server.url().as_str());
        let cr = Url::parse("https://codereview.appspot.com").unwrap();
        let pr = PullRequest::for_review(&cr, 42, "jane:feature", "Added parser");

        let e = h.create_pull_request("ghtoken", &pr).await.unwrap_err();
        assert!(e.to_string().contains("422"), "{}", e);
    }

    #[tokio::test]
    async fn test_query_user() {
        let server = StubServer::start(&[(
            "GET /users/jane",
            200,
            r#"{"login": "jane", "name": "Jane Doe", "company": null}"#,
        )])
        .await;
        let h = helper(server.url().as_str());

        let user = h.query_user("jane").await.unwrap().unwrap();
        assert_eq!(user.login(), "jane");
        assert_eq!(user.name().as_deref(), Some("Jane Doe"));
        assert_eq!(*user.company(), None);

        assert!(h.query_user("nobody").await.unwrap().is_none());
        assert_eq!(server.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_query_user_unreachable() {
        let h = helper("http://127.0.0.1:1");
        assert!(h.query_user("jane").await.is_err());
    }
}

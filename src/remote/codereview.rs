//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

//! Talking to the codereview server
//!
//! Creating and updating issues is done by the external upload tool (it computes and uploads the
//! diff). Querying, closing and commenting on issues is done over HTTP.

use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::anyhow;
use anyhow::Context;
use anyhow::Result;
use getset::Getters;
use itertools::Itertools;
use rand::seq::IteratorRandom;
use rand::Rng;
use serde::Deserialize;
use tracing::{debug, error, trace};
use url::Url;

use crate::remote::endpoint;
use crate::util::executor::Executor;

const ISSUE_CREATED_MARKER: &str = "Issue created. URL: ";

/// An issue as returned by the `api/<issue>` endpoint
#[derive(Clone, Debug, Deserialize, Getters)]
pub struct CodeReviewIssue {
    #[getset(get = "pub")]
    issue: u64,

    #[serde(default)]
    #[getset(get = "pub")]
    subject: Option<String>,

    #[serde(default)]
    #[getset(get = "pub")]
    owner: Option<String>,

    #[serde(default)]
    #[getset(get = "pub")]
    owner_email: Option<String>,

    #[serde(default)]
    #[getset(get = "pub")]
    closed: bool,

    /// Formatted as "YYYY-MM-DD hh:mm:ss.######"
    #[serde(default)]
    created: Option<String>,

    #[serde(default)]
    modified: Option<String>,
}

impl CodeReviewIssue {
    pub fn created(&self) -> Option<chrono::NaiveDateTime> {
        self.created.as_deref().and_then(parse_timestamp)
    }

    pub fn modified(&self) -> Option<chrono::NaiveDateTime> {
        self.modified.as_deref().and_then(parse_timestamp)
    }
}

fn parse_timestamp(s: &str) -> Option<chrono::NaiveDateTime> {
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").ok()
}

/// Pick one reviewer from `candidates` at random, never the user themselves
pub fn select_reviewer<R: Rng>(
    candidates: &BTreeSet<String>,
    own_address: Option<&str>,
    rng: &mut R,
) -> Option<String> {
    candidates
        .iter()
        .filter(|c| Some(c.as_str()) != own_address)
        .choose(rng)
        .cloned()
}

/// Comma separated CC list: all candidates and the always-CC addresses, except the reviewer and
/// the user themselves
pub fn reviewers_on_cc(
    candidates: &BTreeSet<String>,
    always_cc: &BTreeSet<String>,
    reviewer: &str,
    own_address: Option<&str>,
) -> String {
    candidates
        .union(always_cc)
        .filter(|c| c.as_str() != reviewer)
        .filter(|c| Some(c.as_str()) != own_address)
        .join(",")
}

/// Find the issue number in the output of the upload tool
pub fn parse_issue_number(output: &str) -> Option<u64> {
    output
        .lines()
        .filter_map(|line| line.split_once(ISSUE_CREATED_MARKER))
        .filter_map(|(_, url)| {
            url.trim()
                .trim_end_matches('/')
                .rsplit('/')
                .next()
                .and_then(|n| n.parse::<u64>().ok())
        })
        .next()
}

pub struct CodeReviewHelper {
    server: Url,
    upload_tool: Vec<String>,
    email_address: Option<String>,
    no_browser: bool,
    reviewers: BTreeSet<String>,
    always_cc: BTreeSet<String>,
    client: reqwest::Client,
    executor: Arc<dyn Executor>,
    access_token: Option<String>,
    xsrf_token: Option<String>,
}

impl CodeReviewHelper {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        server: Url,
        upload_tool: Vec<String>,
        email_address: Option<String>,
        no_browser: bool,
        reviewers: BTreeSet<String>,
        always_cc: BTreeSet<String>,
        client: reqwest::Client,
        executor: Arc<dyn Executor>,
    ) -> Self {
        CodeReviewHelper {
            server,
            upload_tool,
            email_address,
            no_browser,
            reviewers,
            always_cc,
            client,
            executor,
            access_token: None,
            xsrf_token: None,
        }
    }

    /// Use `token` instead of asking the user for one
    pub fn set_access_token(&mut self, token: String) {
        self.access_token = Some(token);
    }

    pub fn issue_url(&self, issue_number: u64) -> String {
        format!(
            "{}/{}",
            self.server.as_str().trim_end_matches('/'),
            issue_number
        )
    }

    fn host(&self) -> &str {
        self.server.host_str().unwrap_or("codereview")
    }

    fn print_access_token_instructions(&self) {
        println!(
            "Upload server: {} (change with -s/--server)\n\
             Go to the following link in your browser:\n\
             \n    {}/get-access-token\n\
             \n\
             and copy the access token.\n",
            self.host(),
            self.server.as_str().trim_end_matches('/')
        );
    }

    fn upload_args(&self) -> Vec<String> {
        let mut args = self.upload_tool.iter().skip(1).cloned().collect::<Vec<_>>();
        args.push(String::from("--oauth2"));
        if self.no_browser {
            args.push(String::from("--no_oauth2_webbrowser"));
        }
        args
    }

    pub fn create_issue_args(
        &self,
        reviewer: &str,
        cc: &str,
        description: &str,
        diffbase: &str,
    ) -> Vec<String> {
        let mut args = self.upload_args();
        args.extend(
            [
                "--send_mail",
                "-r",
                reviewer,
                "--cc",
                cc,
                "-t",
                description,
                "-y",
                "--",
                diffbase,
            ]
            .iter()
            .map(|s| s.to_string()),
        );
        args
    }

    pub fn update_issue_args(
        &self,
        issue_number: u64,
        description: &str,
        diffbase: &str,
    ) -> Vec<String> {
        let mut args = self.upload_args();
        args.extend([
            String::from("-i"),
            issue_number.to_string(),
            String::from("-m"),
            String::from("Code updated."),
            String::from("-t"),
            description.to_string(),
            String::from("-y"),
            String::from("--"),
            diffbase.to_string(),
        ]);
        args
    }

    async fn run_upload_tool(&self, args: &[String]) -> Result<(bool, String)> {
        if self.no_browser {
            self.print_access_token_instructions();
            println!("Enter access token:");
        }

        let program = self
            .upload_tool
            .first()
            .ok_or_else(|| anyhow!("Upload tool not configured"))?;
        let args = args.iter().map(String::as_str).collect::<Vec<_>>();
        let out = self.executor.output(program, &args).await?;
        println!("{}", out.stdout);
        if !out.success() {
            debug!("Upload tool failed ({}): {}", out.code, out.stderr.trim());
        }

        Ok((out.success(), out.stdout))
    }

    /// Create an issue for the changes relative to `diffbase`, returns the issue number
    pub async fn create_issue(&self, diffbase: &str, description: &str) -> Result<Option<u64>> {
        let own = self.email_address.as_deref();
        let reviewer = select_reviewer(&self.reviewers, own, &mut rand::thread_rng())
            .ok_or_else(|| anyhow!("No reviewer available other than {}", own.unwrap_or("you")))?;
        let cc = reviewers_on_cc(&self.reviewers, &self.always_cc, &reviewer, own);
        trace!("Reviewer: {}, CC: {}", reviewer, cc);

        let args = self.create_issue_args(&reviewer, &cc, description, diffbase);
        let (ok, output) = self.run_upload_tool(&args).await?;
        if !ok {
            return Ok(None);
        }

        Ok(parse_issue_number(&output))
    }

    pub async fn update_issue(
        &self,
        issue_number: u64,
        diffbase: &str,
        description: &str,
    ) -> Result<bool> {
        let args = self.update_issue_args(issue_number, description, diffbase);
        self.run_upload_tool(&args).await.map(|(ok, _)| ok)
    }

    pub async fn query_issue(&self, issue_number: u64) -> Result<CodeReviewIssue> {
        let issue = issue_number.to_string();
        let url = endpoint(&self.server, &["api", issue.as_str()])?;
        debug!("Querying code review issue at {}", url);

        self.client
            .get(url.clone())
            .send()
            .await
            .with_context(|| anyhow!("Querying {}", url))?
            .error_for_status()
            .with_context(|| anyhow!("Querying code review issue {}", issue_number))?
            .json::<CodeReviewIssue>()
            .await
            .with_context(|| anyhow!("Parsing code review issue {}", issue_number))
    }

    /// The OAuth access token for the server, asking the user if none is known yet
    pub fn access_token(&mut self) -> Result<String> {
        if let Some(token) = self.access_token.as_ref() {
            return Ok(token.clone());
        }

        if !atty::is(atty::Stream::Stdin) {
            return Err(anyhow!("No access token for {} and not running interactively", self.host()));
        }

        self.print_access_token_instructions();
        let token = dialoguer::Password::new()
            .with_prompt("Enter access token")
            .interact()
            .context("Reading access token")?;

        self.access_token = Some(token.clone());
        Ok(token)
    }

    pub async fn xsrf_token(&mut self) -> Result<String> {
        if let Some(token) = self.xsrf_token.as_ref() {
            return Ok(token.clone());
        }

        let access_token = self.access_token()?;
        let url = endpoint(&self.server, &["xsrf_token"])?;
        let response = self
            .client
            .get(url.clone())
            .header(reqwest::header::AUTHORIZATION, format!("OAuth {}", access_token))
            .header("X-Requesting-XSRF-Token", "1")
            .send()
            .await
            .with_context(|| anyhow!("Requesting XSRF token from {}", url))?;

        if response.status() != reqwest::StatusCode::OK {
            error!("Failed retrieving codereview XSRF token with status code: {}", response.status());
            return Err(anyhow!("Retrieving XSRF token failed with {}", response.status()));
        }

        let token = response.text().await.context("Reading XSRF token")?;
        let token = token.trim().to_string();
        self.xsrf_token = Some(token.clone());
        Ok(token)
    }

    async fn post_form(&mut self, url: Url, form: &[(&str, &str)], accepted: &[u16]) -> Result<()> {
        let access_token = self.access_token()?;
        let response = self
            .client
            .post(url.clone())
            .header(reqwest::header::AUTHORIZATION, format!("OAuth {}", access_token))
            .form(form)
            .send()
            .await
            .with_context(|| anyhow!("Posting to {}", url))?;

        let status = response.status();
        if !accepted.contains(&status.as_u16()) {
            return Err(anyhow!("Posting to {} failed with status code: {}", url, status));
        }

        Ok(())
    }

    pub async fn close_issue(&mut self, issue_number: u64) -> Result<()> {
        let xsrf_token = self.xsrf_token().await?;
        let issue = issue_number.to_string();
        let url = endpoint(&self.server, &[issue.as_str(), "close"])?;

        self.post_form(url, &[("xsrf_token", xsrf_token.as_str())], &[200])
            .await
            .with_context(|| anyhow!("Closing codereview issue: {}", issue_number))
    }

    /// Publish `message` on the issue, notifying the participants by mail
    pub async fn add_merge_message(&mut self, issue_number: u64, message: &str) -> Result<()> {
        let xsrf_token = self.xsrf_token().await?;
        let issue = issue_number.to_string();
        let url = endpoint(&self.server, &[issue.as_str(), "publish"])?;
        let form = [
            ("add_as_reviewer", "False"),
            ("message", message),
            ("message_only", "True"),
            ("no_redirect", "True"),
            ("send_mail", "True"),
            ("xsrf_token", xsrf_token.as_str()),
        ];

        self.post_form(url, &form, &[200, 201])
            .await
            .with_context(|| anyhow!("Publishing to codereview issue: {}", issue_number))
    }
}

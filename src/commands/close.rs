//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//


use anyhow::Result;
use tracing::{debug, error, info, warn};

use crate::review::ReviewHelper;

/// Implementation of the "close" command
///
/// Removes the feature branch and the review file and closes the code review. Nothing in here
/// fails the command, problems are only reported.
pub async fn close(helper: &mut ReviewHelper) -> Result<()> {
    let branch = helper.feature_branch()?.to_string();

    if helper.git.has_branch(&branch)? {
        if !helper.git.remove_feature_branch(&branch).await? {
            warn!("Unable to remove feature branch: {}", branch);
        }
    } else {
        println!("No such feature branch: {}", branch);
    }

    let review_file = helper.review_file(&branch);
    if !review_file.exists() {
        println!("Review file missing for branch: {}", branch);
        return Ok(());
    }

    let issue_number = review_file.issue_number();
    review_file.remove()?;

    let issue_number = match issue_number {
        Ok(n) => n,
        Err(e) => {
            warn!("{:?}", e);
            return Ok(());
        }
    };
    debug!("Closing code review {}", issue_number);

    let codereview = helper.codereview()?;
    match codereview.close_issue(issue_number).await {
        Ok(()) => info!("Closed code review {}", issue_number),
        Err(e) => {
            error!("{:?}", e);
            println!("Unable to close code review: {}", issue_number);
            println!("Close it manually on: {}", codereview.issue_url(issue_number));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use crate::remote::tests::StubServer;
    use crate::review::tests::{checkout, helper, helper_with_config, netrc_path, stub_config};
    use crate::review::ReviewCommand;
    use crate::review::ReviewOptions;
    use crate::review::REVIEW_DIR;
    use crate::util::executor::tests::ScriptedExecutor;

    fn options(branch: &str) -> ReviewOptions {
        ReviewOptions::builder()
            .command(ReviewCommand::Close)
            .feature_branch(Some(branch.to_string()))
            .build()
    }

    #[tokio::test]
    async fn test_close_without_branch_and_review_file() {
        let (_dir, repo) = checkout("master");
        let exec = Arc::new(ScriptedExecutor::new());
        let mut h = helper(&repo, options("feature"), exec.clone());

        close(&mut h).await.unwrap();
        assert!(exec.calls().is_empty());
    }

    #[tokio::test]
    async fn test_close_removes_branch_and_review_file() {
        let (_dir, repo) = checkout("master");
        let head = repo.head().unwrap().peel_to_commit().unwrap();
        repo.branch("feature", &head, false).unwrap();

        let exec = Arc::new(ScriptedExecutor::new());
        let mut h = helper(&repo, options("feature"), exec.clone());
        let review_dir = h.project.root().join(REVIEW_DIR);
        std::fs::create_dir_all(&review_dir).unwrap();
        std::fs::write(review_dir.join("feature"), "not a number").unwrap();
        let review_file = h.review_file("feature");

        close(&mut h).await.unwrap();
        assert_eq!(exec.calls(), vec!["git branch -D feature"]);
        assert!(!review_file.exists());
    }

    async fn close_review(routes: &[(&str, u16, &str)]) -> StubServer {
        let (_dir, repo) = checkout("master");
        std::fs::write(netrc_path(&repo), "machine 127.0.0.1 password crtoken\n").unwrap();

        let server = StubServer::start(routes).await;
        let mut h = helper_with_config(
            &repo,
            options("feature"),
            Arc::new(ScriptedExecutor::new()),
            stub_config(&server, ""),
        );
        h.load_credentials().unwrap();
        h.review_file("feature").create(42).unwrap();

        close(&mut h).await.unwrap();
        assert!(!h.review_file("feature").exists());
        server
    }

    #[tokio::test]
    async fn test_close_code_review() {
        let server = close_review(&[
            ("GET /xsrf_token", 200, "xsrftok"),
            ("POST /42/close", 200, ""),
        ])
        .await;

        let request = server.request("POST /42/close").unwrap();
        assert_eq!(request.header("authorization"), Some("OAuth crtoken"));
        assert_eq!(request.form()["xsrf_token"], "xsrftok");
    }

    #[tokio::test]
    async fn test_failed_close_is_not_an_error() {
        let server = close_review(&[("GET /xsrf_token", 200, "xsrftok")]).await;

        assert!(server.request("POST /42/close").is_some());
    }
}

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
use tracing::info;

use crate::review::ReviewError;
use crate::review::ReviewHelper;

/// Implementation of the "open" command
///
/// Checks out an existing review branch from origin and records its code review issue, so the
/// review can be updated and closed from this checkout.
pub async fn open(helper: &mut ReviewHelper) -> Result<()> {
    let branch = helper.feature_branch()?.to_string();
    let issue_number = helper.issue_number()?;

    if helper.git.has_branch(&branch)? {
        return Err(ReviewError::Failed(format!("Feature branch already exists: {}", branch)).into());
    }

    let review_file = helper.review_file(&branch);
    if review_file.exists() {
        return Err(ReviewError::Failed(format!(
            "Review file already exists for branch: {}",
            branch
        ))
        .into());
    }

    if !helper.git.checkout_branch_from_origin(&branch).await? {
        return Err(helper.abort(format!("unable to check out origin/{}", branch)));
    }

    review_file.create(issue_number)?;
    info!("Opened code review {} on branch {}", issue_number, branch);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use crate::review::tests::{checkout, helper};
    use crate::review::ReviewCommand;
    use crate::review::ReviewOptions;
    use crate::util::executor::tests::ScriptedExecutor;

    fn options(branch: &str) -> ReviewOptions {
        ReviewOptions::builder()
            .command(ReviewCommand::Open)
            .feature_branch(Some(branch.to_string()))
            .issue_number(Some(1234))
            .build()
    }

    #[tokio::test]
    async fn test_open() {
        let (_dir, repo) = checkout("master");
        let exec = Arc::new(ScriptedExecutor::new());
        let mut h = helper(&repo, options("feature"), exec.clone());

        open(&mut h).await.unwrap();
        assert_eq!(
            exec.calls(),
            vec![
                "git fetch origin feature",
                "git checkout -b feature --track origin/feature",
            ]
        );
        assert_eq!(h.review_file("feature").issue_number().unwrap(), 1234);
    }

    #[tokio::test]
    async fn test_open_existing_branch() {
        let (_dir, repo) = checkout("master");
        let head = repo.head().unwrap().peel_to_commit().unwrap();
        repo.branch("feature", &head, false).unwrap();
        let mut h = helper(&repo, options("feature"), Arc::new(ScriptedExecutor::new()));

        let e = open(&mut h).await.unwrap_err();
        assert_eq!(e.to_string(), "Feature branch already exists: feature");
    }

    #[tokio::test]
    async fn test_open_fetch_failure() {
        let (_dir, repo) = checkout("master");
        let exec = Arc::new(ScriptedExecutor::new().on("git fetch origin feature", 128, ""));
        let mut h = helper(&repo, options("feature"), exec);

        let e = open(&mut h).await.unwrap_err();
        assert_eq!(e.to_string(), "Open aborted - unable to check out origin/feature.");
        assert!(!h.review_file("feature").exists());
    }
}

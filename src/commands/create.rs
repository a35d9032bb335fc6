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
use tracing::{debug, error, info};

use crate::remote::fork_owner;
use crate::remote::PullRequest;
use crate::review::ReviewError;
use crate::review::ReviewHelper;

/// Implementation of the "create" command
pub async fn create(helper: &mut ReviewHelper) -> Result<()> {
    let branch = helper.active_branch()?.to_string();
    let review_file = helper.review_file(&branch);
    if review_file.exists() {
        return Err(ReviewError::Failed(format!(
            "Review file already exists for branch: {}",
            branch
        ))
        .into());
    }

    let origin = helper.git.remote_origin()?.unwrap_or_default();
    let owner = match fork_owner(&origin, helper.config.github_url()) {
        Some(owner) => owner,
        None => {
            return Err(helper.abort_with_hint(
                format!("unsupported git remote origin: {}", origin),
                "Make sure the git remote origin is hosted on github.com",
            ))
        }
    };
    debug!("Fork owner: {}", owner);

    let access_token = match helper.github_access_token() {
        Some(token) => token.to_string(),
        None => {
            return Err(helper.abort_with_hint(
                "unable to determine github access token",
                "Make sure .netrc is configured with a github access token.",
            ))
        }
    };

    let description = helper.description("code review")?;
    // prefixed to tell reviews of different projects apart
    let codereview_description = format!("[{}] {}", helper.project.name(), description);
    let diffbase = helper.options.diffbase().clone();

    let created = helper
        .codereview()?
        .create_issue(&diffbase, &codereview_description)
        .await;
    let issue_number = match created {
        Ok(Some(n)) => n,
        Ok(None) => return Err(helper.abort("unable to create codereview issue")),
        Err(e) => {
            error!("{:?}", e);
            return Err(helper.abort("unable to create codereview issue"));
        }
    };
    info!("Created code review {}", issue_number);

    review_file.create(issue_number)?;

    let pull_request = PullRequest::for_review(
        helper.config.codereview_url(),
        issue_number,
        &format!("{}:{}", owner, branch),
        &description,
    );
    if let Err(e) = helper
        .github
        .create_pull_request(&access_token, &pull_request)
        .await
    {
        error!("{:?}", e);
        println!("Unable to create pull request.");
    }

    Ok(())
}

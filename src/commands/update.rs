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

/// Implementation of the "update" command
pub async fn update(helper: &mut ReviewHelper) -> Result<()> {
    let branch = helper.active_branch()?.to_string();
    let review_file = helper.review_file(&branch);
    if !review_file.exists() {
        return Err(ReviewError::Failed(format!("Review file missing for branch: {}", branch)).into());
    }

    let issue_number = review_file.issue_number()?;
    let description = helper.description("the update")?;
    let diffbase = helper.options.diffbase().clone();

    if !helper
        .codereview()?
        .update_issue(issue_number, &diffbase, &description)
        .await?
    {
        return Err(ReviewError::Failed(format!(
            "Unable to update code review: {}",
            issue_number
        ))
        .into());
    }

    info!("Updated code review {}", issue_number);
    Ok(())
}

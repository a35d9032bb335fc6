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
use tracing::{debug, error};

use crate::review::ReviewError;
use crate::review::ReviewHelper;

/// Implementation of the "update-authors" command
pub fn update_authors(helper: &ReviewHelper) -> Result<()> {
    if helper.is_documentation_project() {
        debug!("{} has no authors file", helper.project.name());
        return Ok(());
    }

    let authors = helper.git.authors()?;
    helper
        .project
        .update_authors_file(&authors)
        .map_err(|e| {
            error!("{:?}", e);
            anyhow::Error::from(ReviewError::Failed(String::from(
                "Unable to update authors file.",
            )))
        })
}

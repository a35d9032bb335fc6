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
use chrono::DateTime;
use chrono::FixedOffset;
use chrono::Local;
use tracing::error;

use crate::project::ChangelogEntry;
use crate::review::ReviewError;
use crate::review::ReviewHelper;

/// Stamp the project with the date of `now`: version file and dpkg changelog
///
/// Returns the failure message for the user on error.
pub(super) fn update_version_files(helper: &ReviewHelper, now: DateTime<Local>) -> Result<String, ReviewError> {
    let version = helper
        .project
        .update_version_file(now.date_naive())
        .map_err(|e| {
            error!("{:?}", e);
            ReviewError::Failed(String::from("Unable to update version file."))
        })?;

    let entry = ChangelogEntry::new(
        helper.project.name().clone(),
        version.clone(),
        helper.config.changelog_distribution().clone(),
        helper.config.changelog_urgency().clone(),
        helper.config.changelog_maintainer().clone(),
        DateTime::<FixedOffset>::from(now),
    );

    helper
        .project
        .update_dpkg_changelog_file(&entry)
        .map_err(|e| {
            error!("{:?}", e);
            ReviewError::Failed(String::from("Unable to update dpkg changelog file."))
        })?;

    Ok(version)
}

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
use tracing::{debug, info};

use crate::commands::util::update_version_files;
use crate::review::ReviewHelper;

/// Implementation of the "update-version" command
pub fn update_version(helper: &ReviewHelper) -> Result<()> {
    if helper.is_documentation_project() {
        debug!("{} is not versioned", helper.project.name());
        return Ok(());
    }

    let version = update_version_files(helper, chrono::Local::now())?;
    info!("Updated {} to version {}", helper.project.name(), version);
    Ok(())
}

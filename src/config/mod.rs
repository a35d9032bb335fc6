//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

//! Configuration of the review tool
//!
//! Every setting has a default, so no configuration file is required. Settings are layered:
//! `$XDG_CONFIG_HOME/reviewtools/review.toml`, then the file passed with `--config`, then
//! environment variables prefixed with `REVIEWTOOLS_`.

use std::path::Path;

use anyhow::anyhow;
use anyhow::Context;
use anyhow::Result;
use tracing::debug;

mod configuration;
pub use configuration::*;

mod not_validated;
pub use not_validated::*;

mod util;

pub const CONFIG_FILE_NAME: &str = "review.toml";
pub const ENV_PREFIX: &str = "REVIEWTOOLS";

pub fn load(explicit: Option<&Path>) -> Result<Configuration> {
    let mut config = ::config::Config::default();

    let xdg = xdg::BaseDirectories::with_prefix("reviewtools")
        .context("Loading XDG base directories")?;
    if let Some(path) = xdg.find_config_file(CONFIG_FILE_NAME) {
        debug!("Loading configuration from {}", path.display());
        config
            .merge(::config::File::from(path.clone()).required(false))
            .with_context(|| anyhow!("Loading configuration from {}", path.display()))?;
    }

    if let Some(path) = explicit {
        debug!("Loading configuration from {}", path.display());
        config
            .merge(::config::File::from(path.to_path_buf()).required(true))
            .with_context(|| anyhow!("Loading configuration from {}", path.display()))?;
    }

    config
        .merge(::config::Environment::with_prefix(ENV_PREFIX))
        .context("Loading configuration from environment")?;

    config
        .try_into::<NotValidatedConfiguration>()
        .context("Failed to load configuration")?
        .validate()
        .context("Failed to validate configuration")
}

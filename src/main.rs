//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use colored::Colorize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod project;
mod remote;
mod review;
mod tool;
mod util;

use crate::review::ReviewError;
use crate::review::ReviewHelper;
use crate::review::ReviewOptions;
use crate::util::netrc::NetrcFile;

#[tokio::main]
async fn main() -> Result<()> {
    human_panic::setup_panic!();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    debug!("Debugging enabled");

    if crate::util::stdout_is_pipe() {
        colored::control::set_override(false);
    }

    let mut app = cli::cli();
    let matches = app.clone().get_matches();

    let options = match cli::review_options(&matches) {
        Ok(options) => options,
        Err(e) => {
            println!("{}", e);
            println!();
            app.print_help()?;
            println!();
            std::process::exit(1)
        }
    };
    debug!("Options: {:?}", options);

    let config_path = matches.get_one::<PathBuf>("config").map(PathBuf::as_path);
    if let Err(e) = review(options, config_path).await {
        match e.downcast_ref::<ReviewError>() {
            Some(review_error) => println!("{}", review_error),
            None => eprintln!("{}: {:?}", "Error".red(), e),
        }
        std::process::exit(1)
    }

    Ok(())
}

async fn review(options: ReviewOptions, config_path: Option<&Path>) -> Result<()> {
    let netrc = match NetrcFile::find() {
        Some(netrc) => {
            debug!("Credentials from {}", netrc.path().display());
            netrc
        }
        None => {
            return Err(ReviewError::aborted(options.command().title(), "unable to find .netrc").into())
        }
    };

    let config = crate::config::load(config_path)?;
    let cwd = std::env::current_dir().context("Getting current directory")?;

    let mut helper = ReviewHelper::initialize_helpers(options, config, netrc, &cwd).await?;
    helper.run().await
}

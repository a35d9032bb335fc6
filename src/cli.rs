//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//


use std::path::PathBuf;

use anyhow::anyhow;
use anyhow::Result;
use clap::crate_authors;
use clap::crate_version;
use clap::Arg;
use clap::ArgMatches;
use clap::Command;
use const_format::concatcp;

use crate::remote::GitHubOrigin;
use crate::review::ReviewCommand;
use crate::review::ReviewOptions;
use crate::review::DEFAULT_DIFFBASE;

const GIT_DESCRIBE: &str = match option_env!("VERGEN_GIT_DESCRIBE") {
    Some(v) => v,
    None => "unknown",
};

const BUILD_TIMESTAMP: &str = match option_env!("VERGEN_BUILD_TIMESTAMP") {
    Some(v) => v,
    None => "unknown",
};

const LONG_VERSION: &str = concatcp!(
    crate_version!(),
    " (",
    GIT_DESCRIBE,
    ", built ",
    BUILD_TIMESTAMP,
    ")"
);

fn arg_branch() -> Arg<'static> {
    Arg::new("branch")
        .required(true)
        .takes_value(true)
        .value_name("BRANCH")
        .help("Name of the corresponding feature branch, \"username:branch\" is accepted")
}

fn arg_issue_number(help: &'static str) -> Arg<'static> {
    Arg::new("codereview_issue_number")
        .required(true)
        .takes_value(true)
        .value_name("CODEREVIEW_ISSUE_NUMBER")
        .help(help)
}

fn arg_github_origin() -> Arg<'static> {
    Arg::new("github_origin")
        .required(true)
        .takes_value(true)
        .value_name("GITHUB_ORIGIN")
        .help("The GitHub origin to merge, e.g. username:feature")
}

pub fn cli() -> Command<'static> {
    Command::new("review")
        .author(crate_authors!())
        .version(crate_version!())
        .long_version(LONG_VERSION)
        .about("Manage code reviews")
        .subcommand_required(true)
        .arg_required_else_help(true)

        .arg(Arg::new("all_files")
            .global(true)
            .long("all-files")
            .aliases(&["allfiles", "all_files"])
            .help("Apply command to all files, currently only affects linting")
        )
        .arg(Arg::new("diffbase")
            .global(true)
            .long("diffbase")
            .takes_value(true)
            .value_name("DIFFBASE")
            .default_value(DEFAULT_DIFFBASE)
            .help("What the code changes are relative to, can be used to chain code reviews")
        )
        .arg(Arg::new("no_browser")
            .global(true)
            .long("no-browser")
            .aliases(&["nobrowser", "no_browser"])
            .help("Do not use the web browser to get the OAuth access token")
        )
        .arg(Arg::new("no_confirm")
            .global(true)
            .long("no-confirm")
            .aliases(&["noconfirm", "no_confirm"])
            .help("Do not ask for confirmation, apply defaults")
            .long_help(indoc::indoc!(r#"
                Do not ask for confirmation, apply defaults.

                Only use this when you are familiar with the defaults.
            "#))
        )
        .arg(Arg::new("offline")
            .global(true)
            .long("offline")
            .help("Skip every online check, only lint, lint-test and test can run offline")
        )
        .arg(Arg::new("config")
            .global(true)
            .long("config")
            .takes_value(true)
            .value_name("FILE")
            .value_parser(clap::value_parser!(PathBuf))
            .help("Configuration file, read after the user configuration")
        )

        .subcommand(Command::new("close")
            .about("Close a code review and remove its feature branch")
            .arg(arg_branch())
        )
        .subcommand(Command::new("create")
            .about("Create a code review for the active branch")
        )
        .subcommand(Command::new("lint")
            .about("Lint the changed files")
        )
        .subcommand(Command::new("lint-test")
            .alias("lint_test")
            .about("Lint the changed files and run the tests")
        )
        .subcommand(Command::new("merge")
            .about("Merge a code review from a fork into master")
            .arg(arg_issue_number("The codereview issue number to merge"))
            .arg(arg_github_origin())
        )
        .subcommand(Command::new("merge-edit")
            .alias("merge_edit")
            .about("Pull the changes of a fork for editing before a merge")
            .arg(arg_github_origin())
        )
        .subcommand(Command::new("open")
            .about("Check out the feature branch of an existing code review")
            .arg(arg_issue_number("The codereview issue number to open"))
            .arg(arg_branch())
        )
        .subcommand(Command::new("test")
            .about("Run the tests of the project")
        )
        .subcommand(Command::new("update")
            .about("Upload the changes of the active branch to its code review")
        )
        .subcommand(Command::new("update-authors")
            .alias("update_authors")
            .about("Regenerate the AUTHORS file from the commit history")
        )
        .subcommand(Command::new("update-version")
            .alias("update_version")
            .about("Set the version of the project to today")
        )
}

/// Turn the matches into options, the error is a message for the user
pub fn review_options(matches: &ArgMatches) -> Result<ReviewOptions> {
    let (name, sub) = matches
        .subcommand()
        .ok_or_else(|| anyhow!("Command value is missing."))?;
    let command = name.parse::<ReviewCommand>()?;

    let feature_branch = match command {
        ReviewCommand::Close | ReviewCommand::Open => {
            let branch = sub
                .get_one::<String>("branch")
                .map(|b| b.rsplit(':').next().unwrap_or(b).to_string())
                .filter(|b| !b.is_empty())
                .ok_or_else(|| anyhow!("Feature branch value is missing."))?;
            Some(branch)
        }
        _ => None,
    };

    let issue_number = match command {
        ReviewCommand::Merge | ReviewCommand::Open => {
            let issue = sub
                .get_one::<String>("codereview_issue_number")
                .and_then(|n| n.parse::<u64>().ok())
                .filter(|n| *n > 0)
                .ok_or_else(|| anyhow!("Codereview issue number value is missing or invalid."))?;
            Some(issue)
        }
        _ => None,
    };

    let fork = match command {
        ReviewCommand::Merge | ReviewCommand::MergeEdit => {
            let origin = sub
                .get_one::<String>("github_origin")
                .and_then(|o| o.parse::<GitHubOrigin>().ok())
                .ok_or_else(|| anyhow!("Github origin value is missing or invalid."))?;
            Some(origin)
        }
        _ => None,
    };

    let offline = matches.is_present("offline");
    if offline && !command.allowed_offline() {
        return Err(anyhow!("Cannot run: {} in offline mode.", command));
    }

    let diffbase = matches
        .get_one::<String>("diffbase")
        .cloned()
        .unwrap_or_else(|| String::from(DEFAULT_DIFFBASE));

    Ok(ReviewOptions::builder()
        .command(command)
        .feature_branch(feature_branch)
        .issue_number(issue_number)
        .fork(fork)
        .diffbase(diffbase)
        .all_files(matches.is_present("all_files"))
        .no_browser(matches.is_present("no_browser"))
        .no_confirm(matches.is_present("no_confirm"))
        .offline(offline)
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(args: &[&str]) -> Result<ReviewOptions> {
        let matches = cli().try_get_matches_from(args)?;
        review_options(&matches)
    }

    #[test]
    fn verify_cli() {
        cli().debug_assert();
    }

    #[test]
    fn test_close_strips_username() {
        let o = options(&["review", "close", "jane:feature"]).unwrap();
        assert_eq!(o.command(), ReviewCommand::Close);
        assert_eq!(o.feature_branch().as_deref(), Some("feature"));
    }

    #[test]
    fn test_merge() {
        let o = options(&["review", "merge", "1234", "jane:feature"]).unwrap();
        assert_eq!(o.issue_number(), Some(1234));
        assert_eq!(o.fork().as_ref().unwrap().username(), "jane");
        assert_eq!(o.diffbase(), "upstream/master");
    }

    #[test]
    fn test_merge_invalid_values() {
        let e = options(&["review", "merge", "abc", "jane:feature"]).unwrap_err();
        assert_eq!(e.to_string(), "Codereview issue number value is missing or invalid.");

        let e = options(&["review", "merge", "0", "jane:feature"]).unwrap_err();
        assert_eq!(e.to_string(), "Codereview issue number value is missing or invalid.");

        let e = options(&["review", "merge-edit", "jane"]).unwrap_err();
        assert_eq!(e.to_string(), "Github origin value is missing or invalid.");
    }

    #[test]
    fn test_aliases() {
        let o = options(&["review", "--allfiles", "lint_test"]).unwrap();
        assert_eq!(o.command(), ReviewCommand::LintTest);
        assert!(o.all_files());

        let o = options(&["review", "update_version", "--no_confirm"]).unwrap();
        assert_eq!(o.command(), ReviewCommand::UpdateVersion);
        assert!(o.no_confirm());
    }

    #[test]
    fn test_offline() {
        let o = options(&["review", "--offline", "test"]).unwrap();
        assert!(o.offline());

        let e = options(&["review", "--offline", "create"]).unwrap_err();
        assert_eq!(e.to_string(), "Cannot run: create in offline mode.");
    }

    #[test]
    fn test_diffbase() {
        let o = options(&["review", "update", "--diffbase", "origin/previous"]).unwrap();
        assert_eq!(o.diffbase(), "origin/previous");
    }
}

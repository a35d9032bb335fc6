//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//


use anyhow::anyhow;
use anyhow::Result;
use tracing::{debug, error, info, warn};

use crate::commands::util::update_version_files;
use crate::review::ReviewError;
use crate::review::ReviewHelper;

/// Implementation of the "merge" command
///
/// The changes of the fork are already pulled, linted and tested at this point. Stamps the new
/// version, regenerates the API docs, commits in the name of the author of the code review and
/// tells the author how to clean up.
pub async fn merge(helper: &mut ReviewHelper) -> Result<()> {
    let issue_number = helper.issue_number()?;
    let details = helper
        .merge
        .clone()
        .ok_or_else(|| anyhow!("Merge of {} was not prepared", issue_number))?;

    if let Err(e) = update_version_files(helper, chrono::Local::now()) {
        helper.git.drop_uncommitted_changes().await?;
        return Err(e.into());
    }

    if helper.project.apidoc_config_file().exists() {
        if let Some(apidoc) = helper.apidoc.as_ref() {
            if let Err(e) = apidoc.update_api_docs().await {
                warn!("Unable to update API docs: {:?}", e);
            }
        }

        if !helper.git.add_path(helper.config.apidoc_output_dir()).await? {
            warn!("Unable to add {} to the commit", helper.config.apidoc_output_dir());
        }

        // the docs live in the project, readthedocs is not triggered by a webhook
        if let Err(e) = helper.readthedocs.trigger_build().await {
            warn!("Unable to trigger readthedocs build: {:?}", e);
        }
    }

    debug!("Committing as {}", details.author());
    if !helper
        .git
        .commit_to_origin_in_name_of(issue_number, details.author(), details.description())
        .await?
    {
        helper.git.drop_uncommitted_changes().await?;
        return Err(ReviewError::Failed(String::from("Unable to commit changes.")).into());
    }
    info!("Merged code review {}", issue_number);

    let message = format!(
        "Changes have been merged with master branch. \
         To close the review and clean up the feature branch you can run: review close {}",
        helper.fork()?.branch()
    );
    if let Err(e) = helper
        .codereview()?
        .add_merge_message(issue_number, &message)
        .await
    {
        error!("{:?}", e);
        println!("Unable to publish merge message on code review: {}", issue_number);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use crate::remote::tests::StubServer;
    use crate::review::tests::{checkout, commit_file, helper, helper_with_config, netrc_path, stub_config};
    use crate::review::MergeDetails;
    use crate::review::ReviewCommand;
    use crate::review::ReviewOptions;
    use crate::util::executor::tests::ScriptedExecutor;

    fn options() -> ReviewOptions {
        ReviewOptions::builder()
            .command(ReviewCommand::Merge)
            .issue_number(Some(42))
            .fork(Some("jane:feature".parse().unwrap()))
            .build()
    }

    #[tokio::test]
    async fn test_unprepared_merge() {
        let (_dir, repo) = checkout("master");
        let mut h = helper(&repo, options(), Arc::new(ScriptedExecutor::new()));
        assert!(merge(&mut h).await.is_err());
    }

    #[tokio::test]
    async fn test_failed_commit_drops_changes() {
        let (dir, repo) = checkout("master");
        let exec = Arc::new(ScriptedExecutor::new().on(
            "git commit -a --author=Jane Doe <jane@example.com> -m Code review: 42: Added parser",
            1,
            "",
        ));
        let mut h = helper(&repo, options(), exec.clone());
        h.merge = Some(MergeDetails::new(
            String::from("Jane Doe <jane@example.com>"),
            String::from("Added parser"),
        ));

        let e = merge(&mut h).await.unwrap_err();
        assert_eq!(e.to_string(), "Unable to commit changes.");
        assert_eq!(
            exec.calls(),
            vec![
                "git commit -a --author=Jane Doe <jane@example.com> -m Code review: 42: Added parser",
                "git stash",
                "git stash drop",
            ]
        );

        let version = std::fs::read_to_string(dir.path().join("plaso").join("plaso").join("__init__.py"))
            .unwrap();
        assert!(!version.contains("20160101"));
    }

    #[tokio::test]
    async fn test_missing_version_file_drops_changes() {
        let (dir, repo) = checkout("master");
        std::fs::remove_file(dir.path().join("plaso").join("plaso").join("__init__.py")).unwrap();
        let exec = Arc::new(ScriptedExecutor::new());
        let mut h = helper(&repo, options(), exec.clone());
        h.merge = Some(MergeDetails::new(String::from("a <a@b>"), String::from("d")));

        let e = merge(&mut h).await.unwrap_err();
        assert_eq!(e.to_string(), "Unable to update version file.");
        assert_eq!(exec.calls(), vec!["git stash", "git stash drop"]);
    }

    #[tokio::test]
    async fn test_merge() {
        let (dir, repo) = checkout("master");
        commit_file(&repo, "docs/conf.py", "project = 'plaso'\n");
        std::fs::write(netrc_path(&repo), "machine 127.0.0.1 password crtoken\n").unwrap();

        let server = StubServer::start(&[
            ("POST /build/plaso", 200, ""),
            ("GET /xsrf_token", 200, "xsrftok"),
            ("POST /42/publish", 200, ""),
        ])
        .await;
        let exec = Arc::new(ScriptedExecutor::new());
        let mut h = helper_with_config(&repo, options(), exec.clone(), stub_config(&server, ""));
        h.load_credentials().unwrap();
        h.merge = Some(MergeDetails::new(
            String::from("Jane Doe <jane@example.com>"),
            String::from("Added parser"),
        ));

        merge(&mut h).await.unwrap();

        assert_eq!(
            exec.calls(),
            vec![
                "sphinx-apidoc -f -o docs plaso",
                "git add -A docs",
                "git commit -a --author=Jane Doe <jane@example.com> -m Code review: 42: Added parser",
                "git push origin master",
            ]
        );

        let version = std::fs::read_to_string(dir.path().join("plaso").join("plaso").join("__init__.py"))
            .unwrap();
        assert!(!version.contains("20160101"));

        assert!(server.request("POST /build/plaso").is_some());
        let publish = server.request("POST /42/publish").unwrap();
        assert_eq!(publish.header("authorization"), Some("OAuth crtoken"));
        assert!(publish.form()["message"].ends_with("you can run: review close feature"));
    }

    #[tokio::test]
    async fn test_merge_without_docs_or_publish() {
        let (_dir, repo) = checkout("master");
        std::fs::write(netrc_path(&repo), "machine 127.0.0.1 password crtoken\n").unwrap();

        let server = StubServer::start(&[("GET /xsrf_token", 200, "xsrftok")]).await;
        let exec = Arc::new(ScriptedExecutor::new());
        let mut h = helper_with_config(&repo, options(), exec.clone(), stub_config(&server, ""));
        h.load_credentials().unwrap();
        h.merge = Some(MergeDetails::new(String::from("a <a@b>"), String::from("d")));

        // a failed merge message does not fail the merge
        merge(&mut h).await.unwrap();

        assert_eq!(
            exec.calls(),
            vec!["git commit -a --author=a <a@b> -m Code review: 42: d", "git push origin master"]
        );
        assert!(server.request("POST /build/plaso").is_none());
        assert!(server.request("POST /42/publish").is_some());
    }
}

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
use anyhow::Context;
use anyhow::Result;
use tracing::debug;
use url::Url;

use crate::remote::endpoint;

pub struct ReadTheDocsHelper {
    project: String,
    base_url: Url,
    client: reqwest::Client,
}

impl ReadTheDocsHelper {
    pub fn new(project: String, base_url: Url, client: reqwest::Client) -> Self {
        ReadTheDocsHelper {
            project,
            base_url,
            client,
        }
    }

    pub fn build_url(&self) -> Result<Url> {
        endpoint(&self.base_url, &["build", self.project.as_str()])
    }

    /// Ask readthedocs to rebuild the documentation of the project
    pub async fn trigger_build(&self) -> Result<()> {
        let url = self.build_url()?;
        debug!("Triggering documentation build at {}", url);

        self.client
            .post(url.clone())
            .body("")
            .send()
            .await
            .with_context(|| anyhow!("Triggering build at {}", url))?
            .error_for_status()
            .with_context(|| anyhow!("Triggering build at {}", url))
            .map(|_| ())
    }
}

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
use tracing::info;

use crate::project::ProjectHelper;

const DEFAULT_AUTHORS_HEADER: &str = "# Names should be added to this file with this pattern:\n\
                                      #\n\
                                      #   Name <email address>\n";

/// Keep the comment block at the top of `existing` and list `authors` below it
pub fn render_authors(existing: &str, authors: &[String]) -> String {
    let header = existing
        .lines()
        .take_while(|line| line.starts_with('#'))
        .collect::<Vec<_>>();

    let mut out = String::new();
    if header.is_empty() {
        out.push_str(DEFAULT_AUTHORS_HEADER);
    } else {
        for line in header {
            out.push_str(line);
            out.push('\n');
        }
    }

    out.push('\n');
    for author in authors {
        out.push_str(author);
        out.push('\n');
    }
    out
}

impl ProjectHelper {
    pub fn update_authors_file(&self, authors: &[String]) -> Result<()> {
        let path = self.authors_file();
        let existing = if path.exists() {
            std::fs::read_to_string(&path).with_context(|| anyhow!("Reading {}", path.display()))?
        } else {
            String::new()
        };

        std::fs::write(&path, render_authors(&existing, authors))
            .with_context(|| anyhow!("Writing {}", path.display()))?;
        info!("Wrote {} authors to {}", authors.len(), path.display());
        Ok(())
    }
}

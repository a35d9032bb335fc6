//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

//! Date based project versions
//!
//! A merge stamps the project with the date of the merge: `__version__ = 'YYYYMMDD'` in the
//! package `__init__.py` and a matching entry in the Debian changelog.

use anyhow::anyhow;
use anyhow::Context;
use anyhow::Result;
use chrono::DateTime;
use chrono::FixedOffset;
use chrono::NaiveDate;
use getset::Getters;
use regex::Regex;
use tracing::{debug, info};

use crate::project::ProjectHelper;

const VERSION_ASSIGNMENT: &str = r#"(?m)^__version__\s*=\s*['"]([^'"]*)['"]"#;

fn version_regex() -> Result<Regex> {
    Regex::new(VERSION_ASSIGNMENT).map_err(anyhow::Error::from)
}

pub fn version_for_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Replace the version assignment in `content`, `None` if there is none
pub fn replace_version(content: &str, version: &str) -> Result<Option<String>> {
    let regex = version_regex()?;
    if !regex.is_match(content) {
        return Ok(None);
    }

    let replacement = format!("__version__ = '{}'", version);
    Ok(Some(regex.replace(content, replacement.as_str()).into_owned()))
}

#[derive(Debug, Getters)]
pub struct ChangelogEntry {
    #[getset(get = "pub")]
    project: String,

    #[getset(get = "pub")]
    version: String,

    distribution: String,
    urgency: String,
    maintainer: String,
    date: DateTime<FixedOffset>,
}

impl ChangelogEntry {
    pub fn new(
        project: String,
        version: String,
        distribution: String,
        urgency: String,
        maintainer: String,
        date: DateTime<FixedOffset>,
    ) -> Self {
        ChangelogEntry {
            project,
            version,
            distribution,
            urgency,
            maintainer,
            date,
        }
    }
}

impl std::fmt::Display for ChangelogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{} ({}-1) {}; urgency={}",
            self.project, self.version, self.distribution, self.urgency
        )?;
        writeln!(f)?;
        writeln!(f, "  * Auto-generated")?;
        writeln!(f)?;
        writeln!(
            f,
            " -- {}  {}",
            self.maintainer,
            self.date.format("%a, %d %b %Y %H:%M:%S %z")
        )
    }
}

impl ProjectHelper {
    /// Set the version to `date`, returns the new version
    pub fn update_version_file(&self, date: NaiveDate) -> Result<String> {
        let path = self.version_file();
        let content = std::fs::read_to_string(&path)
            .with_context(|| anyhow!("Reading {}", path.display()))?;

        let version = version_for_date(date);
        let updated = replace_version(&content, &version)?
            .ok_or_else(|| anyhow!("No __version__ in {}", path.display()))?;

        std::fs::write(&path, updated).with_context(|| anyhow!("Writing {}", path.display()))?;
        info!("Set version of {} to {}", self.name(), version);
        Ok(version)
    }

    /// Replace the dpkg changelog with an entry for `entry`
    ///
    /// Projects without `config/dpkg` are not packaged for Debian; nothing is written for them and
    /// `false` is returned.
    pub fn update_dpkg_changelog_file(&self, entry: &ChangelogEntry) -> Result<bool> {
        let path = self.dpkg_changelog_file();
        let dpkg_dir = path
            .parent()
            .ok_or_else(|| anyhow!("No parent directory for {}", path.display()))?;

        if !dpkg_dir.is_dir() {
            debug!("No {}, not writing changelog", dpkg_dir.display());
            return Ok(false);
        }

        std::fs::write(&path, entry.to_string())
            .with_context(|| anyhow!("Writing {}", path.display()))?;
        info!("Updated {} for version {}", path.display(), entry.version());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    fn project(dir: &std::path::Path) -> ProjectHelper {
        std::fs::create_dir_all(dir.join("plaso")).unwrap();
        ProjectHelper::new(dir.to_path_buf(), String::from("plaso"))
    }

    fn date() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2016, 4, 2, 10, 11, 12)
            .unwrap()
    }

    #[test]
    fn test_replace_version() {
        let content = "# -*- coding: utf-8 -*-\n\n__version__ = '20160101'\n";
        assert_eq!(
            replace_version(content, "20160402").unwrap().unwrap(),
            "# -*- coding: utf-8 -*-\n\n__version__ = '20160402'\n"
        );

        let content = "__version__ = \"1.4.0\"\nVERSION = __version__\n";
        assert_eq!(
            replace_version(content, "20160402").unwrap().unwrap(),
            "__version__ = '20160402'\nVERSION = __version__\n"
        );

        assert_eq!(replace_version("version = '1'\n", "20160402").unwrap(), None);
    }

    #[test]
    fn test_update_version_file() {
        let dir = tempfile::tempdir().unwrap();
        let p = project(dir.path());
        std::fs::write(p.version_file(), "__version__ = '20151230'\n").unwrap();

        let v = p
            .update_version_file(NaiveDate::from_ymd_opt(2016, 4, 2).unwrap())
            .unwrap();
        assert_eq!(v, "20160402");
        assert_eq!(
            std::fs::read_to_string(p.version_file()).unwrap(),
            "__version__ = '20160402'\n"
        );
    }

    #[test]
    fn test_update_version_file_without_assignment() {
        let dir = tempfile::tempdir().unwrap();
        let p = project(dir.path());
        std::fs::write(p.version_file(), "\"\"\"Nothing here.\"\"\"\n").unwrap();

        assert!(p
            .update_version_file(NaiveDate::from_ymd_opt(2016, 4, 2).unwrap())
            .is_err());
    }

    #[test]
    fn test_changelog_entry() {
        let entry = ChangelogEntry::new(
            String::from("plaso"),
            String::from("20160402"),
            String::from("unstable"),
            String::from("low"),
            String::from("Log2Timeline maintainers <log2timeline-maintainers@googlegroups.com>"),
            date(),
        );

        let expected = indoc::indoc!(
            "
            plaso (20160402-1) unstable; urgency=low

              * Auto-generated

             -- Log2Timeline maintainers <log2timeline-maintainers@googlegroups.com>  Sat, 02 Apr 2016 10:11:12 +0100
            "
        );
        assert_eq!(entry.to_string(), expected);
    }

    #[test]
    fn test_update_dpkg_changelog_file() {
        let dir = tempfile::tempdir().unwrap();
        let p = project(dir.path());
        let entry = ChangelogEntry::new(
            String::from("plaso"),
            String::from("20160402"),
            String::from("unstable"),
            String::from("low"),
            String::from("Jane Doe <jane@example.com>"),
            date(),
        );

        assert!(!p.update_dpkg_changelog_file(&entry).unwrap());

        std::fs::create_dir_all(dir.path().join("config").join("dpkg")).unwrap();
        assert!(p.update_dpkg_changelog_file(&entry).unwrap());

        let written = std::fs::read_to_string(p.dpkg_changelog_file()).unwrap();
        assert!(written.starts_with("plaso (20160402-1) unstable; urgency=low\n"));
    }
}

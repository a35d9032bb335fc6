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

use assert_cmd::Command;

/// A sandbox with a home directory, a user configuration directory and a plaso checkout
pub struct Sandbox {
    pub dir: tempfile::TempDir,
}

impl Sandbox {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        std::fs::create_dir(dir.path().join("home"))?;
        std::fs::create_dir(dir.path().join("xdg"))?;

        let checkout = dir.path().join("plaso");
        std::fs::create_dir_all(checkout.join("plaso"))?;
        std::fs::write(checkout.join("plaso").join("__init__.py"), "__version__ = '20160101'\n")?;
        git2::Repository::init(&checkout)?;

        Ok(Sandbox { dir })
    }

    pub fn home(&self) -> PathBuf {
        self.dir.path().join("home")
    }

    pub fn checkout(&self) -> PathBuf {
        self.dir.path().join("plaso")
    }

    pub fn write_netrc(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.write_netrc_content("machine github.com login jane password secret\n")
    }

    pub fn write_netrc_content(&self, content: &str) -> Result<(), Box<dyn std::error::Error>> {
        std::fs::write(self.home().join(".netrc"), content)?;
        Ok(())
    }

    /// Write a configuration file running `test_command` as test runner
    pub fn write_config(&self, test_command: &[&str]) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let mut table = toml::value::Table::new();
        table.insert(
            String::from("test_command"),
            toml::Value::Array(
                test_command
                    .iter()
                    .map(|s| toml::Value::String(s.to_string()))
                    .collect(),
            ),
        );

        let path = self.dir.path().join("review.toml");
        std::fs::write(&path, toml::to_string_pretty(&toml::Value::Table(table))?)?;
        Ok(path)
    }

    pub fn review(&self, cwd: &Path) -> Result<Command, Box<dyn std::error::Error>> {
        let mut cmd = Command::cargo_bin("review")?;
        cmd.current_dir(cwd)
            .env("HOME", self.home())
            .env("XDG_CONFIG_HOME", self.dir.path().join("xdg"))
            .env_remove("RUST_LOG");
        Ok(cmd)
    }
}

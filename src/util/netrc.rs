//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

//! Reading credentials from the user's `.netrc`

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use anyhow::anyhow;
use anyhow::Context;
use anyhow::Result;
use getset::Getters;
use tracing::trace;

pub const GITHUB_MACHINE: &str = "github.com";

#[derive(Clone, Debug, Default, Eq, PartialEq, Getters)]
pub struct NetrcEntry {
    #[getset(get = "pub")]
    login: Option<String>,

    #[getset(get = "pub")]
    password: Option<String>,
}

impl NetrcEntry {
    /// The secret of the entry: the password, or the login if no password is set
    ///
    /// Access tokens are commonly stored as `login <token>` only.
    pub fn token(&self) -> Option<&str> {
        self.password()
            .as_deref()
            .or(self.login().as_deref())
            .filter(|s| !s.is_empty())
    }
}

/// The `.netrc` file of the user
///
/// Only its existence is checked up front. It is parsed once a command needs credentials.
#[derive(Clone, Debug, Getters)]
pub struct NetrcFile {
    #[getset(get = "pub")]
    path: PathBuf,
}

impl NetrcFile {
    pub fn new(path: PathBuf) -> Self {
        NetrcFile { path }
    }

    /// The `.netrc` in the home directory of the user, `None` if there is none
    pub fn find() -> Option<Self> {
        dirs::home_dir()
            .map(|home| home.join(".netrc"))
            .filter(|path| path.is_file())
            .map(NetrcFile::new)
    }

    pub fn load(&self) -> Result<Netrc> {
        Netrc::load(&self.path)
    }
}

/// Split `content` into tokens, leaving out comments and macro definitions
///
/// Entries may span several lines, so tokens are not bound to a line. A macro definition runs
/// until the next empty line.
fn tokenize(content: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut lines = content.lines();

    while let Some(line) = lines.next() {
        for word in line.split_whitespace() {
            if word.starts_with('#') {
                break;
            }

            if word == "macdef" {
                trace!("Skipping macro definition");
                for body in lines.by_ref() {
                    if body.trim().is_empty() {
                        break;
                    }
                }
                break;
            }

            tokens.push(word);
        }
    }

    tokens
}

#[derive(Debug, Default)]
pub struct Netrc {
    machines: BTreeMap<String, NetrcEntry>,
    default: Option<NetrcEntry>,
}

impl Netrc {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| anyhow!("Reading {}", path.display()))?;
        Self::parse(&content).with_context(|| anyhow!("Parsing {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut netrc = Netrc::default();
        let mut current: Option<(Option<String>, NetrcEntry)> = None;
        let mut tokens = tokenize(content).into_iter();

        while let Some(token) = tokens.next() {
            match token {
                "machine" => {
                    let name = tokens
                        .next()
                        .ok_or_else(|| anyhow!("'machine' without name"))?;
                    netrc.finish(current.take());
                    current = Some((Some(name.to_string()), NetrcEntry::default()));
                }
                "default" => {
                    netrc.finish(current.take());
                    current = Some((None, NetrcEntry::default()));
                }
                "login" | "password" | "account" => {
                    let value = tokens
                        .next()
                        .ok_or_else(|| anyhow!("'{}' without value", token))?;
                    let (_, entry) = current
                        .as_mut()
                        .ok_or_else(|| anyhow!("'{}' outside of a machine entry", token))?;
                    match token {
                        "login" => entry.login = Some(value.to_string()),
                        "password" => entry.password = Some(value.to_string()),
                        _ => trace!("Ignoring account of netrc entry"),
                    }
                }
                other => trace!("Ignoring unknown netrc token: {}", other),
            }
        }

        netrc.finish(current.take());
        Ok(netrc)
    }

    fn finish(&mut self, entry: Option<(Option<String>, NetrcEntry)>) {
        match entry {
            Some((Some(machine), entry)) => {
                self.machines.entry(machine).or_insert(entry);
            }
            Some((None, entry)) => self.default = Some(entry),
            None => {}
        }
    }

    /// Entry for `machine`, falling back to the `default` entry
    pub fn machine(&self, machine: &str) -> Option<&NetrcEntry> {
        self.machines.get(machine).or(self.default.as_ref())
    }

    pub fn github_access_token(&self) -> Option<&str> {
        self.machines.get(GITHUB_MACHINE).and_then(NetrcEntry::token)
    }
}

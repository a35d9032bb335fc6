//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

//! Default values for configuration settings

use std::collections::BTreeMap;

use url::Url;

fn strings(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn parse_url(s: &str) -> Url {
    // only called with the constant URLs below
    Url::parse(s).unwrap_or_else(|e| panic!("Invalid builtin URL {}: {}", s, e))
}

pub fn default_organization() -> String {
    String::from("log2timeline")
}

pub fn default_supported_projects() -> Vec<String> {
    strings(&[
        "artifacts",
        "dfdatetime",
        "dfkinds",
        "dftimewolf",
        "dfvfs",
        "dfwinreg",
        "eccemotus",
        "l2tdevtools",
        "l2tdocs",
        "l2tpreg",
        "l2treviewtools",
        "plaso",
    ])
}

pub fn default_documentation_projects() -> Vec<String> {
    strings(&["l2tdocs"])
}

pub fn default_github_url() -> Url {
    parse_url("https://github.com")
}

pub fn default_github_api_url() -> Url {
    parse_url("https://api.github.com")
}

pub fn default_codereview_url() -> Url {
    parse_url("https://codereview.appspot.com")
}

pub fn default_readthedocs_url() -> Url {
    parse_url("https://readthedocs.org")
}

pub fn default_upload_tool() -> Vec<String> {
    strings(&["python", "utils/upload.py"])
}

pub fn default_test_command() -> Vec<String> {
    strings(&["python", "run_tests.py"])
}

pub fn default_linter() -> String {
    String::from("pylint")
}

pub fn default_linter_rcfile() -> String {
    String::from("utils/pylintrc")
}

pub fn default_linter_minimum_version() -> String {
    String::from("1.5.0")
}

pub fn default_apidoc() -> String {
    String::from("sphinx-apidoc")
}

pub fn default_apidoc_minimum_version() -> String {
    String::from("1.2.0")
}

pub fn default_apidoc_output_dir() -> String {
    String::from("docs")
}

pub fn default_changelog_maintainer() -> String {
    String::from("Log2Timeline maintainers <log2timeline-maintainers@googlegroups.com>")
}

pub fn default_changelog_distribution() -> String {
    String::from("unstable")
}

pub fn default_changelog_urgency() -> String {
    String::from("low")
}

pub fn default_reviewers() -> Vec<String> {
    strings(&[
        "jberggren@gmail.com",
        "joachim.metz@gmail.com",
        "onager@deerpie.com",
    ])
}

pub fn default_cc_reviewers() -> Vec<String> {
    strings(&["kiddi@kiddaland.net", "log2timeline-dev@googlegroups.com"])
}

pub fn default_project_reviewers() -> BTreeMap<String, Vec<String>> {
    let dfvfs_team = &["joachim.metz@gmail.com", "onager@deerpie.com"];

    let mut map = BTreeMap::new();
    for project in ["dfdatetime", "dfkinds", "dfvfs", "dfwinreg", "l2tpreg"] {
        map.insert(project.to_string(), strings(dfvfs_team));
    }

    map.insert(
        String::from("dftimewolf"),
        strings(&[
            "jberggren@gmail.com",
            "someguyiknow@google.com",
            "tomchop@gmail.com",
        ]),
    );

    map.insert(
        String::from("plaso"),
        strings(&[
            "aaronp@gmail.com",
            "jberggren@gmail.com",
            "joachim.metz@gmail.com",
            "onager@deerpie.com",
            "romaing@google.com",
        ]),
    );

    map
}

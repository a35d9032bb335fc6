//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//


use thiserror::Error as ThisError;

/// A review step refused to continue
///
/// The message is meant for the user and printed as is, without the error chain. An abort can
/// carry a hint on how to fix the problem, printed on the line after the abort.
#[derive(ThisError, Debug, Eq, PartialEq)]
pub enum ReviewError {
    #[error("{command} aborted - {reason}.{}", hint_line(.hint))]
    Aborted {
        command: String,
        reason: String,
        hint: Option<String>,
    },

    #[error("{0}")]
    Failed(String),
}

fn hint_line(hint: &Option<String>) -> String {
    hint.as_ref().map(|h| format!("\n{}", h)).unwrap_or_default()
}

impl ReviewError {
    pub fn aborted<C: Into<String>, R: Into<String>>(command: C, reason: R) -> Self {
        ReviewError::Aborted {
            command: command.into(),
            reason: reason.into(),
            hint: None,
        }
    }

    pub fn with_hint<H: Into<String>>(self, hint: H) -> Self {
        match self {
            ReviewError::Aborted { command, reason, .. } => ReviewError::Aborted {
                command,
                reason,
                hint: Some(hint.into()),
            },
            failed => failed,
        }
    }
}

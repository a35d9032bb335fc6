//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//


//! The actions of the commands, run once all checks of the review pipeline passed

mod close;
pub use close::close;

mod create;
pub use create::create;

mod merge;
pub use merge::merge;

mod open;
pub use open::open;

mod update;
pub use update::update;

mod update_authors;
pub use update_authors::update_authors;

mod update_version;
pub use update_version::update_version;

mod util;

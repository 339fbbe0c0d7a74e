// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod command;
mod construction;
mod raised;
mod validation;

pub use command::{CommandError, CommandResult, WrappedError};
pub use construction::ConstructionError;
pub use raised::{BoxError, Raised};
pub use validation::{ValidationError, Violation};

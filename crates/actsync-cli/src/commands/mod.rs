//! Command implementations for actsync-cli

pub mod add;
pub mod check;
pub mod list;
pub mod output;
pub mod regenerate;
pub mod remove;
pub mod update;

pub use add::run_add;
pub use check::run_check;
pub use list::run_list;
pub use regenerate::run_regenerate;
pub use remove::run_remove;
pub use update::run_update;

use actsync_core::{ActionKey, ActionReference};

use crate::error::{CliError, Result};

/// Whether a command fully succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Failure,
}

impl Status {
    pub fn from_success(ok: bool) -> Self {
        if ok { Self::Success } else { Self::Failure }
    }
}

/// Parse a reference naming an already tracked action.
///
/// An `@ref` suffix is accepted and ignored when `allow_ref` is set.
pub(crate) fn tracked_key(input: &str, allow_ref: bool) -> Result<ActionKey> {
    let reference = ActionReference::parse(input)?;
    if !allow_ref && let Some(requested) = reference.requested_ref() {
        return Err(CliError::user(format!(
            "'{input}' pins '@{requested}'; use `actsync add` to change the requested ref"
        )));
    }
    Ok(reference.key())
}

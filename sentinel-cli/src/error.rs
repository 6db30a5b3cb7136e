use anyhow::Error;
use sentinel_links::prelude::*;

/// Process exit code for an error.
///
/// - 2: configuration (missing key or setting)
/// - 3: rejected input (missing fields, unknown link id)
/// - 1: anything else
pub fn exit_code(err: &Error) -> i32 {
    match err.downcast_ref::<LinksError>() {
        Some(LinksError::Config { .. }) => 2,
        Some(LinksError::Validation { .. } | LinksError::NotFound { .. }) => 3,
        _ => 1,
    }
}

use std::error::Error;
use std::fmt::Write as _;

use super::error::AgentError;

/// Multi-line report of a failed run: error code, message and the cause chain.
pub fn dump(err: &AgentError) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "AgentError [{}]", err.code());
    let _ = write!(out, "  message: {}", err);
    let mut source = err.source();
    while let Some(cause) = source {
        let _ = write!(out, "\n  caused by: {}", cause);
        source = cause.source();
    }
    out
}

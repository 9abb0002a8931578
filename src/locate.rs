//! Source locator: map runtime routines back to (file, line)
//!
//! A location miss is not an error: callers either omit the record (route
//! handlers) or fall back to the declaring type's line (resource-controller
//! actions).

use crate::host::{Callable, SourceLocation};

/// Reduce a decorated routine to the innermost identity-preserving layer.
///
/// Unwinding stops at the first wrapper that did not preserve identity
/// metadata; that layer is then treated as the real object and its own
/// generic location is reported. Documented limitation, kept on purpose.
pub fn unwrap_callable(callable: &Callable) -> &Callable {
    let mut current = callable;
    while let Some(wrapper) = &current.wraps {
        if !wrapper.preserves_identity {
            break;
        }
        current = &wrapper.inner;
    }
    current
}

/// Resolve a routine's defining file and starting line, unwinding any
/// transparent decorator layers first. `None` when no source is
/// retrievable.
pub fn locate(callable: &Callable) -> Option<&SourceLocation> {
    unwrap_callable(callable).location.as_ref()
}

//! Guarded invocation of user callbacks
//!
//! Payload hooks and completion continuations are user code. A failure in
//! one of them, either an `Err` or a panic, is logged and contained so the
//! rest of the tick keeps running.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Result returned by user callbacks
pub type ActionResult = anyhow::Result<()>;

/// Run `f`, logging any error or panic under `label`
///
/// Returns true if the callback completed successfully.
pub fn run_guarded(label: &str, f: impl FnOnce() -> ActionResult) -> bool {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(())) => true,
        Ok(Err(err)) => {
            tracing::error!(callback = label, error = %err, "tween callback failed");
            false
        }
        Err(payload) => {
            tracing::error!(
                callback = label,
                panic = panic_message(payload.as_ref()),
                "tween callback panicked"
            );
            false
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "<non-string panic>"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success() {
        assert!(run_guarded("ok", || Ok(())));
    }

    #[test]
    fn test_error_is_contained() {
        assert!(!run_guarded("err", || Err(anyhow::anyhow!("boom"))));
    }

    #[test]
    fn test_panic_is_contained() {
        assert!(!run_guarded("panic", || panic!("boom")));
    }
}

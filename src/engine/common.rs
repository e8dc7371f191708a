// src/engine/common.rs
//
// Shared codec plumbing. mozjpeg surfaces fatal libjpeg errors by
// panicking, so every FFI-backed codec call runs under catch_unwind and
// is reported as a normal decode/encode error instead.

use crate::error::{OptipixError, Result};
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Run a codec stage, converting panics into stage-tagged errors.
/// Stage names follow the "decode:mozjpeg" / "encode:webp" convention;
/// the prefix decides which error kind a panic maps to.
pub(crate) fn run_with_panic_policy<T>(
    stage: &'static str,
    f: impl FnOnce() -> Result<T>,
) -> Result<T> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(panic) => {
            let message = panic_message(&panic);
            if let Some(format) = stage.strip_prefix("encode:") {
                Err(OptipixError::encode_failed(
                    format.to_string(),
                    format!("codec panicked: {message}"),
                ))
            } else {
                Err(OptipixError::decode_failed(format!(
                    "{stage}: codec panicked: {message}"
                )))
            }
        }
    }
}

fn panic_message(panic: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

//! Bridge from the launcher's blocking orchestration into async HTTP clients.
//!
//! The orchestrator runs strictly sequentially, while the HTTP clients are
//! async `reqwest` clients. Every network call goes through
//! [`block_on_future`], which reuses an ambient Tokio runtime when one exists.

use std::future::Future;
use std::io;

use tokio::{runtime::Handle, task};

/// Drive an async future to completion from synchronous code.
///
/// # Arguments
/// - `future`: The future to run to completion.
///
/// # Returns
/// The future's own result. Failure to build a fallback runtime is converted
/// into the caller's error type through `From<io::Error>`.
///
/// # Notes
/// - Inside a multi-threaded Tokio runtime the current worker is parked with
///   `block_in_place`, so this must not be called from a current-thread
///   runtime.
/// - Outside Tokio a single-threaded runtime is built for the call.
pub fn block_on_future<F, T, E>(future: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: From<io::Error>,
{
    if let Ok(handle) = Handle::try_current() {
        task::block_in_place(|| handle.block_on(future))
    } else {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?
            .block_on(future)
    }
}

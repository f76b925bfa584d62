//! Sync/async bridge.
//!
//! Producing or consuming messages can happen from synchronous call sites
//! while the registry client is asynchronous. [`block_on`] drives a future
//! to completion from synchronous code without re-entering or deadlocking a
//! runtime that is already running on the calling thread: if one is active,
//! the future runs on a dedicated thread with its own runtime; otherwise a
//! lazily-built process-wide runtime drives it directly.

use std::future::Future;
use std::sync::OnceLock;

use tokio::runtime::{Builder, Handle, Runtime};

fn shared_runtime() -> &'static Runtime {
    static RUNTIME: OnceLock<Runtime> = OnceLock::new();
    RUNTIME.get_or_init(|| {
        Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("failed to build bridge runtime")
    })
}

/// Run `future` to completion from synchronous code.
pub fn block_on<F>(future: F) -> F::Output
where
    F: Future + Send,
    F::Output: Send,
{
    match Handle::try_current() {
        // No runtime on this thread: drive the future directly.
        Err(_) => shared_runtime().block_on(future),
        // Already inside a runtime: blocking here would deadlock the
        // executor, so hand the future to a dedicated thread with its own
        // single-threaded runtime and wait for it.
        Ok(_) => std::thread::scope(|scope| {
            scope
                .spawn(|| {
                    Builder::new_current_thread()
                        .enable_all()
                        .build()
                        .expect("failed to build bridge runtime")
                        .block_on(future)
                })
                .join()
                .expect("bridge thread panicked")
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_on_outside_runtime() {
        let result = block_on(async { 40 + 2 });
        assert_eq!(result, 42);
    }

    #[tokio::test]
    async fn test_block_on_inside_runtime() {
        // Must not deadlock the test runtime.
        let result = block_on(async {
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
            "done"
        });
        assert_eq!(result, "done");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_block_on_inside_multi_thread_runtime() {
        let result = tokio::task::spawn_blocking(|| block_on(async { 7 }))
            .await
            .unwrap();
        assert_eq!(result, 7);
    }
}

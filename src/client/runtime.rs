//! Process-wide execution resources shared by every client.
//!
//! The first client constructed in a process builds one multi-threaded tokio runtime whose
//! blocking pool runs the transfers. Later clients, including ones created concurrently, reuse
//! it. The runtime lives until process exit; there is no explicit teardown.

use lazy_static::lazy_static;
use tokio::runtime::{Builder, Handle, Runtime};

use crate::errors::LocoError;

const THREAD_NAME: &str = "locosync-worker";

lazy_static! {
    static ref SHARED_RUNTIME: Result<Runtime, String> = {
        log::debug!("initializing shared request runtime");
        Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name(THREAD_NAME)
            .enable_all()
            .build()
            .map_err(|e| e.to_string())
    };
}

/// Runs the one-time initialization (if it has not run yet) and returns a handle to the
/// shared runtime. Safe to call from any number of threads at once.
pub(crate) fn global_init() -> Result<Handle, LocoError> {
    match &*SHARED_RUNTIME {
        Ok(runtime) => Ok(runtime.handle().clone()),
        Err(e) => Err(LocoError::Runtime(e.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn concurrent_initialization_succeeds_everywhere() {
        let threads: Vec<_> = (0..8).map(|_| thread::spawn(|| global_init().is_ok())).collect();
        for t in threads {
            assert!(t.join().unwrap());
        }
    }

    #[test]
    fn work_runs_on_named_pool_threads() {
        let handle = global_init().unwrap();
        let name = pollster::block_on(handle.spawn_blocking(|| thread::current().name().map(str::to_owned)))
            .unwrap();
        assert_eq!(name.as_deref(), Some(THREAD_NAME));
    }
}

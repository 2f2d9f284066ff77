//! Bounded parallel execution of blocking work.
//!
//! Resolutions block on `aws` subprocesses, so each item runs on the
//! blocking pool while a semaphore caps how many run at once.

use std::sync::Arc;
use tokio::sync::Semaphore;

/// Run `work` over `items` with at most `max_concurrent` in flight.
///
/// Results keep the order of `items`. A panicking item yields `Err` with the
/// panic message instead of taking the whole batch down.
pub async fn execute_parallel<T, R, F>(
    items: Vec<T>,
    max_concurrent: usize,
    work: F,
) -> Vec<Result<R, String>>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> R + Send + Sync + 'static,
{
    let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));
    let work = Arc::new(work);

    let handles: Vec<_> = items
        .into_iter()
        .map(|item| {
            let semaphore = Arc::clone(&semaphore);
            let work = Arc::clone(&work);

            tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| format!("Semaphore closed: {}", e))?;

                tokio::task::spawn_blocking(move || work(item))
                    .await
                    .map_err(|e| format!("Task panicked: {}", e))
            })
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        let result = handle
            .await
            .unwrap_or_else(|e| Err(format!("Task panicked: {}", e)));
        results.push(result);
    }

    results
}

/// Run `execute_parallel` to completion on a fresh runtime
pub fn run_parallel<T, R, F>(
    items: Vec<T>,
    max_concurrent: usize,
    work: F,
) -> anyhow::Result<Vec<Result<R, String>>>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> R + Send + Sync + 'static,
{
    use anyhow::Context;

    let runtime = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    Ok(runtime.block_on(execute_parallel(items, max_concurrent, work)))
}

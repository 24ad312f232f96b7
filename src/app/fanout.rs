//! Bounded concurrent fan-out whose results are ordered by input index

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinHandle, JoinSet};

/// Aborts the wrapped task when dropped, so cancelling the outer set reaches it
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Run `task` for every item with at most `limit` in flight.
///
/// Results come back in input order no matter which task finishes first.
/// The first failure to complete aborts every task still running and is
/// returned; a panicking task is turned into an error by `on_panic`.
pub async fn run_indexed<I, T, E, F, Fut, P>(
    items: Vec<I>,
    limit: usize,
    task: F,
    on_panic: P,
) -> Result<Vec<T>, E>
where
    I: Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
    F: Fn(usize, I) -> Fut,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    P: Fn(usize, JoinError) -> E,
{
    let count = items.len();
    let semaphore = Arc::new(Semaphore::new(limit.max(1)));
    let mut set = JoinSet::new();

    for (index, item) in items.into_iter().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let work = task(index, item);

        let inner = tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok();
            work.await
        });
        set.spawn(async move {
            let mut guard = AbortOnDrop(inner);
            (index, (&mut guard.0).await)
        });
    }

    let mut results: Vec<Option<T>> = (0..count).map(|_| None).collect();
    while let Some(joined) = set.join_next().await {
        let (index, outcome) = match joined {
            Ok(done) => done,
            // The outer task only awaits the inner one; it is never aborted here.
            Err(join_error) => {
                set.abort_all();
                return Err(on_panic(usize::MAX, join_error));
            }
        };

        match outcome {
            Ok(Ok(value)) => results[index] = Some(value),
            Ok(Err(error)) => {
                set.abort_all();
                return Err(error);
            }
            Err(join_error) => {
                set.abort_all();
                return Err(on_panic(index, join_error));
            }
        }
    }

    Ok(results.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_results_follow_input_order() {
        // Later items finish first.
        let results = run_indexed(
            vec![30u64, 20, 10, 0],
            4,
            |index, delay| async move {
                tokio::time::sleep(Duration::from_millis(delay)).await;
                Ok::<_, String>(index)
            },
            |index, e| format!("{}: {}", index, e),
        )
        .await
        .unwrap();

        assert_eq!(results, vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn test_limit_bounds_concurrency() {
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        run_indexed(
            (0..8).collect::<Vec<usize>>(),
            2,
            |_, item| {
                let running = Arc::clone(&running);
                let peak = Arc::clone(&peak);
                async move {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    running.fetch_sub(1, Ordering::SeqCst);
                    Ok::<_, String>(item)
                }
            },
            |_, e| e.to_string(),
        )
        .await
        .unwrap();

        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_first_failure_is_returned() {
        let result = run_indexed(
            vec![0usize, 1, 2],
            3,
            |index, _| async move {
                if index == 1 {
                    Err(format!("item {} failed", index))
                } else {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Ok(index)
                }
            },
            |_, e| e.to_string(),
        )
        .await;

        assert_eq!(result, Err("item 1 failed".to_string()));
    }

    #[tokio::test]
    async fn test_panic_is_mapped_with_index() {
        let result = run_indexed(
            vec![0usize, 1],
            2,
            |index, _| async move {
                if index == 1 {
                    panic!("boom");
                }
                Ok::<_, String>(index)
            },
            |index, _| format!("panic in {}", index),
        )
        .await;

        assert_eq!(result, Err("panic in 1".to_string()));
    }

    #[tokio::test]
    async fn test_empty_input() {
        let result: Result<Vec<usize>, String> =
            run_indexed(Vec::<usize>::new(), 4, |i, _| async move { Ok(i) }, |_, e| {
                e.to_string()
            })
            .await;
        assert!(result.unwrap().is_empty());
    }
}

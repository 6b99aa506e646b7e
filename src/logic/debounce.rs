use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Runs only the most recently scheduled task, once the delay has passed
/// without another call.
///
/// Each call or cancel bumps a generation counter. A pending task that wakes
/// to find a newer generation exits without running. Tasks that already
/// started are not interrupted.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    generation: Arc<AtomicU64>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn call<F>(&self, task: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let generation = Arc::clone(&self.generation);
        let delay = self.delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if generation.load(Ordering::SeqCst) != ticket {
                return;
            }
            task.await;
        })
    }

    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recorder() -> Arc<Mutex<Vec<&'static str>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_calls_collapse_to_last() {
        let debouncer = Debouncer::new(Duration::from_millis(2500));
        let seen = recorder();

        let mut handles = Vec::new();
        for value in ["Dav", "Davi", "Davis"] {
            let seen = Arc::clone(&seen);
            handles.push(debouncer.call(async move {
                seen.lock().unwrap().push(value);
            }));
            tokio::time::sleep(Duration::from_millis(500)).await;
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(*seen.lock().unwrap(), vec!["Davis"]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_pending_call() {
        let debouncer = Debouncer::new(Duration::from_millis(2500));
        let seen = recorder();

        let inner = Arc::clone(&seen);
        let handle = debouncer.call(async move {
            inner.lock().unwrap().push("fired");
        });
        tokio::time::sleep(Duration::from_millis(1000)).await;
        debouncer.cancel();
        handle.await.unwrap();

        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn spaced_calls_all_fire() {
        let debouncer = Debouncer::new(Duration::from_millis(100));
        let seen = recorder();

        for value in ["first", "second"] {
            let inner = Arc::clone(&seen);
            debouncer.call(async move {
                inner.lock().unwrap().push(value);
            })
            .await
            .unwrap();
        }

        assert_eq!(*seen.lock().unwrap(), vec!["first", "second"]);
    }
}

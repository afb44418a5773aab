//! Periodic redispatch of the retry queue

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::resolver::Resolver;
use crate::types::RedispatchInterval;

/// Drives the retry queue's scheduled redispatch passes.
///
/// One independent timer task per periodic [`RedispatchInterval`]; a
/// slow pass on one interval never delays another's firing. The
/// trigger-only intervals (`AtStart`, `Immediately`) get no timer and
/// are drained through [`Resolver::drain_startup`]. Missed ticks are
/// skipped, not bursted: a laptop waking from sleep runs one pass per
/// interval, not a backlog.
///
/// Dropping the scheduler aborts all timer tasks.
pub struct Scheduler {
    tasks: Vec<JoinHandle<()>>,
}

impl Scheduler {
    /// Start one timer task per periodic interval.
    ///
    /// Must be called within a tokio runtime. The first pass for each
    /// interval fires one full period after start, not immediately.
    pub fn start(resolver: Resolver) -> Self {
        let tasks = RedispatchInterval::ALL
            .iter()
            .filter_map(|interval| Some((*interval, interval.period()?)))
            .map(|(interval, period)| {
                let resolver = resolver.clone();
                tokio::spawn(async move {
                    let mut ticker = tokio::time::interval(period);
                    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                    // interval's first tick completes immediately
                    ticker.tick().await;
                    loop {
                        ticker.tick().await;
                        let confirmed = resolver.redispatch_due(interval).await;
                        if confirmed > 0 {
                            tracing::debug!(%interval, confirmed, "redispatch pass confirmed entries");
                        }
                    }
                })
            })
            .collect();
        Self { tasks }
    }

    /// Stop all timer tasks. In-flight passes are aborted at their next
    /// suspension point; queue persistence stays consistent because every
    /// mutation persists before returning.
    pub fn shutdown(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn starts_one_task_per_periodic_interval() {
        let engine = crate::Muninn::builder()
            .store(std::sync::Arc::new(crate::cache::NullStore))
            .build()
            .await
            .unwrap();
        let mut scheduler = Scheduler::start(engine);
        let periodic = RedispatchInterval::ALL
            .iter()
            .filter(|interval| interval.period().is_some())
            .count();
        assert_eq!(scheduler.tasks.len(), periodic);
        scheduler.shutdown();
        assert!(scheduler.tasks.is_empty());
    }
}

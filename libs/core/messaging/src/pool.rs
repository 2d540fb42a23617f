//! Worker pool bound to one subject.
//!
//! Two tasks run per pool:
//! - intake: pulls from the [`MessageSource`] into a bounded queue
//! - dispatcher: takes from the queue and spawns handlers under a semaphore
//!
//! The queue is the only buffer. When it is full the intake stops pulling,
//! which leaves further messages with the bus.

use crate::metrics::PoolMetrics;
use crate::source::{InboundMessage, MessageSource};
use crate::{MessageHandler, PoolConfig, PoolError};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, watch, Mutex, Semaphore};
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};

/// Bounded-concurrency consumer for a single subject.
pub struct WorkerPool<H: MessageHandler> {
    config: PoolConfig,
    handler: Arc<H>,
    metrics: PoolMetrics,
    running: Mutex<Option<RunningPool>>,
}

struct RunningPool {
    shutdown_tx: watch::Sender<bool>,
    intake: JoinHandle<()>,
    dispatcher: JoinHandle<()>,
}

impl<H: MessageHandler> WorkerPool<H> {
    /// Create a pool. Nothing is consumed until [`WorkerPool::run`].
    pub fn new(config: PoolConfig, handler: H) -> Result<Self, PoolError> {
        config.validate()?;
        let metrics = PoolMetrics::new(&config.subject, handler.name());

        Ok(Self {
            config,
            handler: Arc::new(handler),
            metrics,
            running: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub async fn is_running(&self) -> bool {
        self.running.lock().await.is_some()
    }

    /// Start consuming from `source` in the background and return immediately.
    pub async fn run<S: MessageSource>(&self, source: S) -> Result<(), PoolError> {
        let mut running = self.running.lock().await;
        if running.is_some() {
            return Err(PoolError::AlreadyRunning(self.config.subject.clone()));
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (queue_tx, queue_rx) = mpsc::channel(self.config.queue_capacity);

        let intake = tokio::spawn(intake_loop(
            source,
            queue_tx,
            shutdown_rx,
            self.metrics.clone(),
        ));
        let dispatcher = tokio::spawn(dispatch_loop(
            queue_rx,
            self.handler.clone(),
            self.config.concurrency,
            self.metrics.clone(),
        ));

        info!(
            subject = %self.config.subject,
            consumer = %self.config.consumer_name,
            handler = self.handler.name(),
            concurrency = self.config.concurrency,
            queue_capacity = self.config.queue_capacity,
            "Worker pool started"
        );

        *running = Some(RunningPool {
            shutdown_tx,
            intake,
            dispatcher,
        });
        Ok(())
    }

    /// Unsubscribe, then wait for queued and in-flight messages to finish.
    pub async fn stop(&self) -> Result<(), PoolError> {
        let pool = self
            .running
            .lock()
            .await
            .take()
            .ok_or_else(|| PoolError::NotRunning(self.config.subject.clone()))?;

        info!(subject = %self.config.subject, "Stopping worker pool");

        // Intake may already have exited on its own when the source closed.
        let _ = pool.shutdown_tx.send(true);

        pool.intake
            .await
            .map_err(|e| PoolError::TaskFailed(e.to_string()))?;
        pool.dispatcher
            .await
            .map_err(|e| PoolError::TaskFailed(e.to_string()))?;

        info!(subject = %self.config.subject, "Worker pool stopped");
        Ok(())
    }
}

async fn intake_loop<S: MessageSource>(
    mut source: S,
    queue: mpsc::Sender<InboundMessage>,
    mut shutdown_rx: watch::Receiver<bool>,
    metrics: PoolMetrics,
) {
    loop {
        tokio::select! {
            biased;

            _ = shutdown_rx.changed() => {
                debug!("Shutdown signal received, closing intake");
                break;
            }

            next = source.next() => {
                let Some(message) = next else {
                    info!("Subscription closed");
                    break;
                };

                metrics.message_received();

                // The dispatcher keeps draining during shutdown, so this send
                // always completes and no pulled message is lost.
                if queue.send(message).await.is_err() {
                    warn!("Dispatcher gone, dropping message");
                    break;
                }
            }
        }
    }

    if let Err(e) = source.unsubscribe().await {
        warn!(error = %e, "Failed to unsubscribe");
    }
}

async fn dispatch_loop<H: MessageHandler>(
    mut queue: mpsc::Receiver<InboundMessage>,
    handler: Arc<H>,
    concurrency: usize,
    metrics: PoolMetrics,
) {
    let semaphore = Arc::new(Semaphore::new(concurrency));
    let mut in_flight = JoinSet::new();

    while let Some(message) = queue.recv().await {
        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            break;
        };

        let handler = handler.clone();
        let task_metrics = metrics.clone();

        in_flight.spawn(async move {
            let start = Instant::now();
            handler.handle(&message).await;
            task_metrics.message_handled(start.elapsed());
            drop(permit);
        });

        while let Some(result) = in_flight.try_join_next() {
            report(result, &metrics);
        }
        metrics.in_flight(in_flight.len());
    }

    while let Some(result) = in_flight.join_next().await {
        report(result, &metrics);
    }
    metrics.in_flight(0);
}

fn report(result: Result<(), JoinError>, metrics: &PoolMetrics) {
    if let Err(e) = result {
        if e.is_panic() {
            metrics.handler_panicked();
        }
        error!(error = %e, "Handler task panicked");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChannelSource;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct Counters {
        current: AtomicUsize,
        peak: AtomicUsize,
        handled: AtomicUsize,
    }

    struct SlowHandler {
        counters: Arc<Counters>,
        delay: Duration,
    }

    #[async_trait]
    impl MessageHandler for SlowHandler {
        async fn handle(&self, _message: &InboundMessage) {
            let now = self.counters.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.counters.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.counters.current.fetch_sub(1, Ordering::SeqCst);
            self.counters.handled.fetch_add(1, Ordering::SeqCst);
        }

        fn name(&self) -> &'static str {
            "slow_handler"
        }
    }

    struct PanickingHandler {
        handled: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl MessageHandler for PanickingHandler {
        async fn handle(&self, message: &InboundMessage) {
            if message.payload == b"boom" {
                panic!("handler blew up");
            }
            self.handled.fetch_add(1, Ordering::SeqCst);
        }

        fn name(&self) -> &'static str {
            "panicking_handler"
        }
    }

    fn slow_pool(concurrency: usize, delay: Duration) -> (WorkerPool<SlowHandler>, Arc<Counters>) {
        let counters = Arc::new(Counters::default());
        let handler = SlowHandler {
            counters: counters.clone(),
            delay,
        };
        let config = PoolConfig::new("test.subject")
            .with_concurrency(concurrency)
            .with_queue_capacity(2);
        (WorkerPool::new(config, handler).unwrap(), counters)
    }

    async fn wait_until(condition: impl Fn() -> bool) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !condition() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("condition not reached in time");
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let handler = SlowHandler {
            counters: Arc::default(),
            delay: Duration::ZERO,
        };
        let result = WorkerPool::new(PoolConfig::new("x").with_concurrency(0), handler);
        assert!(matches!(result, Err(PoolError::InvalidConfig(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrency_never_exceeds_limit() {
        let (pool, counters) = slow_pool(3, Duration::from_millis(20));
        let (tx, source) = ChannelSource::new("test.subject", 16);

        pool.run(source).await.unwrap();
        for i in 0..12u8 {
            tx.send(vec![i]).await.unwrap();
        }
        wait_until(|| counters.handled.load(Ordering::SeqCst) == 12).await;

        pool.stop().await.unwrap();

        assert_eq!(counters.handled.load(Ordering::SeqCst), 12);
        assert!(counters.peak.load(Ordering::SeqCst) <= 3);
        assert!(counters.peak.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_single_worker_processes_sequentially() {
        let (pool, counters) = slow_pool(1, Duration::from_millis(5));
        let (tx, source) = ChannelSource::new("test.subject", 8);

        pool.run(source).await.unwrap();
        for i in 0..5u8 {
            tx.send(vec![i]).await.unwrap();
        }
        wait_until(|| counters.handled.load(Ordering::SeqCst) == 5).await;
        pool.stop().await.unwrap();

        assert_eq!(counters.handled.load(Ordering::SeqCst), 5);
        assert_eq!(counters.peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stop_waits_for_in_flight_handlers() {
        let (pool, counters) = slow_pool(2, Duration::from_millis(100));
        let (tx, source) = ChannelSource::new("test.subject", 4);

        pool.run(source).await.unwrap();
        tx.send(b"payload".to_vec()).await.unwrap();

        while counters.current.load(Ordering::SeqCst) == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        pool.stop().await.unwrap();

        assert_eq!(counters.handled.load(Ordering::SeqCst), 1);
        assert_eq!(counters.current.load(Ordering::SeqCst), 0);
        assert!(!pool.is_running().await);
    }

    #[tokio::test]
    async fn test_stop_stops_intake() {
        let (pool, counters) = slow_pool(1, Duration::ZERO);
        let (tx, source) = ChannelSource::new("test.subject", 4);

        pool.run(source).await.unwrap();
        pool.stop().await.unwrap();

        // The source was unsubscribed, so nothing reaches the handler anymore.
        assert!(tx.send(b"late".to_vec()).await.is_err());
        assert_eq!(counters.handled.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_run_twice_is_rejected() {
        let (pool, _) = slow_pool(1, Duration::ZERO);
        let (_tx1, first) = ChannelSource::new("test.subject", 1);
        let (_tx2, second) = ChannelSource::new("test.subject", 1);

        pool.run(first).await.unwrap();
        let err = pool.run(second).await.unwrap_err();
        assert!(matches!(err, PoolError::AlreadyRunning(ref s) if s == "test.subject"));

        pool.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_stop_without_run_is_rejected() {
        let (pool, _) = slow_pool(1, Duration::ZERO);
        assert!(matches!(pool.stop().await, Err(PoolError::NotRunning(_))));
    }

    #[tokio::test]
    async fn test_pool_can_restart_after_stop() {
        let (pool, counters) = slow_pool(1, Duration::ZERO);

        let (tx, source) = ChannelSource::new("test.subject", 1);
        pool.run(source).await.unwrap();
        tx.send(b"first".to_vec()).await.unwrap();
        wait_until(|| counters.handled.load(Ordering::SeqCst) == 1).await;
        pool.stop().await.unwrap();

        let (tx, source) = ChannelSource::new("test.subject", 1);
        pool.run(source).await.unwrap();
        tx.send(b"second".to_vec()).await.unwrap();
        wait_until(|| counters.handled.load(Ordering::SeqCst) == 2).await;
        pool.stop().await.unwrap();

        assert_eq!(counters.handled.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_handler_panic_does_not_kill_pool() {
        let handled = Arc::new(AtomicUsize::new(0));
        let handler = PanickingHandler {
            handled: handled.clone(),
        };
        let pool = WorkerPool::new(PoolConfig::new("test.subject"), handler).unwrap();
        let (tx, source) = ChannelSource::new("test.subject", 4);

        pool.run(source).await.unwrap();
        tx.send(b"boom".to_vec()).await.unwrap();
        tx.send(b"fine".to_vec()).await.unwrap();
        wait_until(|| handled.load(Ordering::SeqCst) == 1).await;
        pool.stop().await.unwrap();

        assert_eq!(handled.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_built_with_unwinding_panics() {
        assert!(cfg!(panic = "unwind"));
    }
}

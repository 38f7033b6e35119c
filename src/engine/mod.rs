//! The task dispatcher: a bounded pool of workers pulling candidate
//! addresses from a shared FIFO queue, driving classify → resolve → probe →
//! score per address, and publishing verdicts in completion order.

pub mod sink;

pub use sink::{ResultSink, VerdictStore};

use crate::classify::Classifier;
use crate::core::config::{get_random_sleep_duration, Config};
use crate::core::models::{RunEvent, RunStats, Signal, Verdict, NO_MAIL_HOST};
use crate::scoring::DomainProbeResult;
use crate::utils::dns::MailHostResolver;
use crate::utils::smtp::client::RecipientProber;

use futures::FutureExt;
use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// The verification engine. Generic over its resolver and prober so tests
/// can inject canned network behavior through the traits.
pub struct Engine<R, P> {
    config: Arc<Config>,
    classifier: Classifier,
    resolver: Arc<R>,
    prober: Arc<P>,
    store: Option<Arc<dyn VerdictStore>>,
    /// Monotonic run generation. Bumping it is how a new run cancels the
    /// previous one: stale workers see the mismatch and exit.
    run_seq: Arc<AtomicU64>,
}

impl<R, P> Engine<R, P>
where
    R: MailHostResolver,
    P: RecipientProber,
{
    pub fn new(config: Arc<Config>, resolver: Arc<R>, prober: Arc<P>) -> Self {
        Self {
            classifier: Classifier::new(config.clone()),
            config,
            resolver,
            prober,
            store: None,
            run_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Attaches a cache/history collaborator invoked once per verdict.
    pub fn with_store(mut self, store: Arc<dyn VerdictStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Starts a verification run over `addresses` with up to `concurrency`
    /// workers (bounded by the configured maximum). Supersedes any run still
    /// in flight: its workers stop pulling work and their unfinished results
    /// are discarded, never mixed into this run's sink.
    pub fn run(&self, addresses: Vec<String>, concurrency: usize) -> RunHandle {
        let generation = self.run_seq.fetch_add(1, Ordering::SeqCst) + 1;

        let batch = crate::utils::input::normalize_batch(&addresses);
        let total = batch.len() as u64;
        let worker_count = concurrency
            .clamp(1, self.config.max_concurrency)
            .min(batch.len().max(1));

        tracing::info!(target: "verify_task",
            "Starting run {} over {} unique address(es) with {} worker(s).",
            generation, total, worker_count);

        let queue = Arc::new(parking_lot::Mutex::new(VecDeque::from(batch)));
        let sink = Arc::new(ResultSink::new(total, self.store.clone()));
        let (tx, rx) = mpsc::channel::<RunEvent>(256);

        let join = {
            let config = self.config.clone();
            let classifier = self.classifier.clone();
            let resolver = self.resolver.clone();
            let prober = self.prober.clone();
            let run_seq = self.run_seq.clone();
            let sink = sink.clone();

            tokio::spawn(async move {
                // Initial snapshot so consumers can size progress bars
                // before the first verdict lands.
                tx.send(RunEvent::Progress(sink.snapshot())).await.ok();

                let workers: Vec<JoinHandle<()>> = (0..worker_count)
                    .map(|worker_id| {
                        let config = config.clone();
                        let classifier = classifier.clone();
                        let resolver = resolver.clone();
                        let prober = prober.clone();
                        let run_seq = run_seq.clone();
                        let queue = queue.clone();
                        let sink = sink.clone();
                        let tx = tx.clone();

                        tokio::spawn(async move {
                            worker_loop(
                                worker_id, generation, config, classifier, resolver, prober,
                                run_seq, queue, sink, tx,
                            )
                            .await;
                        })
                    })
                    .collect();

                for worker in workers {
                    if let Err(e) = worker.await {
                        tracing::error!(target: "verify_task", "Worker task join error: {}", e);
                    }
                }
                tracing::info!(target: "verify_task", "Run {} drained.", generation);
            })
        };

        RunHandle {
            events: rx,
            sink,
            join,
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn worker_loop<R, P>(
    worker_id: usize,
    generation: u64,
    config: Arc<Config>,
    classifier: Classifier,
    resolver: Arc<R>,
    prober: Arc<P>,
    run_seq: Arc<AtomicU64>,
    queue: Arc<parking_lot::Mutex<VecDeque<String>>>,
    sink: Arc<ResultSink>,
    tx: mpsc::Sender<RunEvent>,
) where
    R: MailHostResolver,
    P: RecipientProber,
{
    loop {
        if run_seq.load(Ordering::SeqCst) != generation {
            tracing::debug!(target: "verify_task",
                "Worker {} observed run supersession; exiting.", worker_id);
            return;
        }
        let Some(address) = queue.lock().pop_front() else {
            tracing::debug!(target: "verify_task", "Worker {} found queue empty; exiting.", worker_id);
            return;
        };

        let outcome = AssertUnwindSafe(verify_one(
            &config,
            &classifier,
            resolver.as_ref(),
            prober.as_ref(),
            &address,
        ))
        .catch_unwind()
        .await;

        let verdict = match outcome {
            Ok(verdict) => verdict,
            Err(_) => {
                tracing::error!(target: "verify_task",
                    "Worker {} panicked while verifying {}; marking inconclusive.",
                    worker_id, address);
                fault_verdict(&config, &address)
            }
        };

        // In-flight results of a superseded run are discarded here, after
        // the probe finished but before they can reach the new run's sink.
        if run_seq.load(Ordering::SeqCst) != generation {
            tracing::debug!(target: "verify_task",
                "Worker {} dropping stale verdict for {} (run superseded).", worker_id, address);
            return;
        }

        let (verdict, stats) = sink.append(verdict);
        tx.send(RunEvent::Result(verdict)).await.ok();
        tx.send(RunEvent::Progress(stats)).await.ok();

        // Per-worker pacing against the target mail infrastructure.
        tokio::time::sleep(get_random_sleep_duration(&config)).await;
    }
}

/// Drives one address through the full pipeline. Malformed input and every
/// network failure still end in a verdict; nothing here aborts the worker.
async fn verify_one<R, P>(
    config: &Config,
    classifier: &Classifier,
    resolver: &R,
    prober: &P,
    address: &str,
) -> Verdict
where
    R: MailHostResolver,
    P: RecipientProber,
{
    let classification = classifier.classify(address);
    let normalized = if classification.domain.is_empty() {
        classification.local_part.clone()
    } else {
        format!("{}@{}", classification.local_part, classification.domain)
    };

    let mut probe_result = DomainProbeResult::default();

    // Malformed and disposable addresses are floored by the scorer either
    // way; skipping resolution avoids pointless network traffic.
    if classification.syntax_ok && !classification.is_disposable_domain {
        probe_result.resolved_hosts = resolver.resolve_mail_hosts(&classification.domain).await;

        if let Some(host) = probe_result.resolved_hosts.first() {
            probe_result.probe = Some(prober.probe(host, &normalized).await);
        } else {
            tracing::debug!(target: "verify_task",
                "No mail host for {}; skipping SMTP probe.", classification.domain);
        }
    }

    let scored = config.scoring.score(&classification, &probe_result);
    tracing::debug!(target: "verify_task",
        "Verified {}: {} (score {}, signals {:?})",
        normalized, scored.disposition, scored.score, scored.signals);

    Verdict {
        address: normalized,
        disposition: scored.disposition,
        score: scored.score,
        signals: scored.signals,
        mail_exchange_host: probe_result
            .resolved_hosts
            .first()
            .cloned()
            .unwrap_or_else(|| NO_MAIL_HOST.to_string()),
        smtp_code: probe_result.probe.as_ref().and_then(|r| r.primary.code()),
        is_catch_all: probe_result
            .probe
            .as_ref()
            .map(|r| r.is_catch_all)
            .unwrap_or(false),
        completed_at: 0,
    }
}

/// Verdict for a task whose worker panicked: marked inconclusive rather than
/// silently lost, per the pool fault policy.
fn fault_verdict(config: &Config, address: &str) -> Verdict {
    let policy = &config.scoring;
    let score = (policy.base_score - policy.inconclusive_penalty).clamp(0, 100) as u8;
    Verdict {
        address: address.trim().to_lowercase(),
        disposition: policy.disposition_for(score),
        score,
        signals: vec![Signal::WorkerFault, Signal::ProbeInconclusive],
        mail_exchange_host: NO_MAIL_HOST.to_string(),
        smtp_code: None,
        is_catch_all: false,
        completed_at: 0,
    }
}

/// Handle to one verification run: the finite event stream plus snapshot
/// access to the run's sink.
pub struct RunHandle {
    events: mpsc::Receiver<RunEvent>,
    sink: Arc<ResultSink>,
    join: JoinHandle<()>,
}

impl RunHandle {
    /// Next event in completion order; `None` when the run has drained.
    pub async fn next_event(&mut self) -> Option<RunEvent> {
        self.events.recv().await
    }

    pub fn stats(&self) -> RunStats {
        self.sink.snapshot()
    }

    /// Drains any remaining events and waits for the run to finish,
    /// returning every verdict in completion order.
    pub async fn wait(mut self) -> Vec<Verdict> {
        while self.events.recv().await.is_some() {}
        if let Err(e) = self.join.await {
            tracing::error!(target: "verify_task", "Run coordinator join error: {}", e);
        }
        self.sink.verdicts()
    }
}

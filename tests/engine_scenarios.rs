//! End-to-end engine behavior against canned DNS and SMTP responses,
//! injected through the resolver/prober traits.

use email_warden_core::utils::smtp::result::ProbeReport;
use email_warden_core::{
    Config, Disposition, Engine, MailHostResolver, RecipientProber, RunEvent, Signal,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
struct MockResolver {
    hosts: HashMap<String, Vec<String>>,
    calls: AtomicUsize,
}

impl MockResolver {
    fn with_host(mut self, domain: &str, host: &str) -> Self {
        self.hosts
            .insert(domain.to_string(), vec![host.to_string()]);
        self
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MailHostResolver for MockResolver {
    async fn resolve_mail_hosts(&self, domain: &str) -> Vec<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.hosts.get(domain).cloned().unwrap_or_default()
    }
}

#[derive(Default)]
struct MockProber {
    replies: HashMap<String, (u16, bool)>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl MockProber {
    fn with_reply(mut self, address: &str, code: u16, is_catch_all: bool) -> Self {
        self.replies
            .insert(address.to_string(), (code, is_catch_all));
        self
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RecipientProber for MockProber {
    async fn probe(&self, _host: &str, address: &str) -> ProbeReport {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.replies.get(address) {
            Some(&(code, is_catch_all)) => ProbeReport::from_code(code, is_catch_all),
            None => ProbeReport::inconclusive("no canned reply"),
        }
    }
}

fn fast_config() -> Arc<Config> {
    let mut config = Config::default();
    config.sleep_between_requests = (0.0, 0.0);
    Arc::new(config)
}

fn engine(
    resolver: MockResolver,
    prober: MockProber,
) -> (Engine<MockResolver, MockProber>, Arc<MockResolver>, Arc<MockProber>) {
    let resolver = Arc::new(resolver);
    let prober = Arc::new(prober);
    (
        Engine::new(fast_config(), resolver.clone(), prober.clone()),
        resolver,
        prober,
    )
}

#[tokio::test]
async fn accepted_probe_on_catch_all_domain_is_risky_not_valid() {
    let (engine, _, _) = engine(
        MockResolver::default().with_host("gmail.com", "mx.gmail.test"),
        MockProber::default().with_reply("john@gmail.com", 250, true),
    );

    let verdicts = engine.run(vec!["john@gmail.com".to_string()], 2).wait().await;
    assert_eq!(verdicts.len(), 1);
    let verdict = &verdicts[0];
    assert_eq!(verdict.disposition, Disposition::Risky);
    assert!(verdict.is_catch_all);
    assert!(verdict.signals.contains(&Signal::CatchAllDomain));
    assert_eq!(verdict.smtp_code, Some(250));
    assert_eq!(verdict.mail_exchange_host, "mx.gmail.test");
}

#[tokio::test]
async fn role_account_with_clean_acceptance_lands_in_risky_band() {
    let (engine, _, _) = engine(
        MockResolver::default().with_host("example.com", "mx.example.test"),
        MockProber::default().with_reply("admin@example.com", 250, false),
    );

    let verdicts = engine
        .run(vec!["admin@example.com".to_string()], 1)
        .wait()
        .await;
    let verdict = &verdicts[0];
    assert_eq!(verdict.disposition, Disposition::Risky);
    assert!(verdict.signals.contains(&Signal::RoleAccount));
    assert!(verdict.signals.contains(&Signal::SmtpAccepted));
}

#[tokio::test]
async fn malformed_address_is_invalid_without_network_calls() {
    let (engine, resolver, prober) =
        engine(MockResolver::default(), MockProber::default());

    let verdicts = engine.run(vec!["bad-address".to_string()], 1).wait().await;
    let verdict = &verdicts[0];
    assert_eq!(verdict.disposition, Disposition::Invalid);
    assert_eq!(verdict.signals, vec![Signal::MalformedAddress]);
    assert_eq!(resolver.call_count(), 0);
    assert_eq!(prober.call_count(), 0);
}

#[tokio::test]
async fn unresolvable_domain_is_invalid_and_skips_smtp() {
    let (engine, resolver, prober) =
        engine(MockResolver::default(), MockProber::default());

    let verdicts = engine
        .run(vec!["user@no-such-domain.example".to_string()], 1)
        .wait()
        .await;
    let verdict = &verdicts[0];
    assert_eq!(verdict.disposition, Disposition::Invalid);
    assert_eq!(verdict.signals, vec![Signal::NoMailHost]);
    assert_eq!(verdict.mail_exchange_host, "-");
    assert_eq!(resolver.call_count(), 1);
    assert_eq!(prober.call_count(), 0);
}

#[tokio::test]
async fn permanent_rejection_floors_regardless_of_other_signals() {
    let (engine, _, _) = engine(
        MockResolver::default().with_host("example.com", "mx.example.test"),
        MockProber::default().with_reply("gone@example.com", 550, false),
    );

    let verdicts = engine
        .run(vec!["gone@example.com".to_string()], 1)
        .wait()
        .await;
    let verdict = &verdicts[0];
    assert_eq!(verdict.disposition, Disposition::Invalid);
    assert_eq!(verdict.signals, vec![Signal::SmtpPermanentReject]);
    assert_eq!(verdict.smtp_code, Some(550));
}

#[tokio::test]
async fn disposable_domain_is_floored_without_probing() {
    let (engine, resolver, prober) =
        engine(MockResolver::default(), MockProber::default());

    let verdicts = engine
        .run(vec!["anyone@mailinator.com".to_string()], 1)
        .wait()
        .await;
    assert_eq!(verdicts[0].disposition, Disposition::Invalid);
    assert_eq!(verdicts[0].signals, vec![Signal::DisposableDomain]);
    assert_eq!(resolver.call_count(), 0);
    assert_eq!(prober.call_count(), 0);
}

#[tokio::test]
async fn every_distinct_input_gets_exactly_one_verdict() {
    let (engine, _, _) = engine(
        MockResolver::default().with_host("example.com", "mx.example.test"),
        MockProber::default()
            .with_reply("a@example.com", 250, false)
            .with_reply("b@example.com", 451, false),
    );

    let batch = vec![
        "a@example.com".to_string(),
        "b@example.com".to_string(),
        "A@Example.com".to_string(), // duplicate of the first after normalization
        "".to_string(),
        "not-an-address".to_string(),
    ];
    let verdicts = engine.run(batch, 3).wait().await;

    assert_eq!(verdicts.len(), 3);
    let mut addresses: Vec<&str> = verdicts.iter().map(|v| v.address.as_str()).collect();
    addresses.sort_unstable();
    assert_eq!(addresses, vec!["a@example.com", "b@example.com", "not-an-address"]);
}

#[tokio::test]
async fn progress_counters_are_monotonic_and_bounded() {
    let (engine, _, _) = engine(
        MockResolver::default().with_host("example.com", "mx.example.test"),
        MockProber::default(),
    );

    let batch: Vec<String> = (0..6).map(|i| format!("user{}@example.com", i)).collect();
    let mut handle = engine.run(batch, 3);

    let mut last_completed = 0;
    let mut results = 0;
    while let Some(event) = handle.next_event().await {
        match event {
            RunEvent::Progress(stats) => {
                assert!(stats.completed >= last_completed);
                assert!(stats.completed <= stats.total);
                assert_eq!(stats.total, 6);
                last_completed = stats.completed;
            }
            RunEvent::Result(_) => results += 1,
        }
    }
    assert_eq!(last_completed, 6);
    assert_eq!(results, 6);

    let stats = handle.stats();
    assert!(stats.is_finished());
    assert_eq!(stats.valid + stats.risky + stats.invalid, 6);
}

#[tokio::test]
async fn catch_all_scores_strictly_below_identical_clean_scenario() {
    let (engine, _, _) = engine(
        MockResolver::default()
            .with_host("clean.example", "mx.clean.example")
            .with_host("lax.example", "mx.lax.example"),
        MockProber::default()
            .with_reply("user@clean.example", 250, false)
            .with_reply("user@lax.example", 250, true),
    );

    let verdicts = engine
        .run(
            vec![
                "user@clean.example".to_string(),
                "user@lax.example".to_string(),
            ],
            1,
        )
        .wait()
        .await;

    let clean = verdicts.iter().find(|v| v.address.contains("clean")).unwrap();
    let lax = verdicts.iter().find(|v| v.address.contains("lax")).unwrap();
    assert!(lax.score < clean.score);
    assert!(lax.is_catch_all);
    assert!(!clean.is_catch_all);
}

#[tokio::test]
async fn superseding_run_stops_the_previous_one() {
    let resolver = Arc::new(MockResolver::default().with_host("example.com", "mx.example.test"));
    let prober = Arc::new(
        MockProber::default().with_delay(Duration::from_millis(100)),
    );
    let engine = Engine::new(fast_config(), resolver, prober);

    let first_batch: Vec<String> = (0..8).map(|i| format!("slow{}@example.com", i)).collect();
    let first = engine.run(first_batch, 1);

    tokio::time::sleep(Duration::from_millis(120)).await;

    let second = engine.run(vec!["fresh@example.com".to_string()], 1);
    let second_verdicts = second.wait().await;

    // The new run is complete and contains only its own addresses.
    assert_eq!(second_verdicts.len(), 1);
    assert_eq!(second_verdicts[0].address, "fresh@example.com");

    // The superseded run stopped early; its workers observed cancellation.
    let first_verdicts = first.wait().await;
    assert!(first_verdicts.len() < 8);
    assert!(first_verdicts
        .iter()
        .all(|v| v.address.starts_with("slow")));
}

#[tokio::test]
async fn total_network_failure_still_terminates_with_verdicts() {
    // Resolver knows nothing, prober would never be reached.
    let (engine, _, _) = engine(MockResolver::default(), MockProber::default());

    let batch: Vec<String> = (0..5).map(|i| format!("user{}@dark.example", i)).collect();
    let verdicts = engine.run(batch, 2).wait().await;

    assert_eq!(verdicts.len(), 5);
    assert!(verdicts
        .iter()
        .all(|v| v.disposition == Disposition::Invalid
            && v.signals == vec![Signal::NoMailHost]));
}

#[tokio::test]
async fn completion_sequence_numbers_are_dense_and_ordered() {
    let (engine, _, _) = engine(
        MockResolver::default().with_host("example.com", "mx.example.test"),
        MockProber::default(),
    );

    let batch: Vec<String> = (0..4).map(|i| format!("user{}@example.com", i)).collect();
    let verdicts = engine.run(batch, 2).wait().await;

    let seq: Vec<u64> = verdicts.iter().map(|v| v.completed_at).collect();
    assert_eq!(seq, vec![0, 1, 2, 3]);
}

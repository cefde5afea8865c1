//! End-to-end exchange tests over an in-memory mailbox

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use blindscore_core::he::backends::{MockBackend, RlweBackend};
use blindscore_core::{
    Context, ContextManager, ContextParams, CoreError, HeBackend, HeError, RiskBand,
    ScoringModel, VectorAdapter, clamp_and_band, codec,
};
use blindscore_exchange::mailbox::{ENCRYPTED_INPUT, ENCRYPTED_SCORE, PUBLIC_CONTEXT};
use blindscore_exchange::*;
use blindscore_storage::{BlobStore, InMemoryBlobStore, StorageError, StorageResult};
use tokio::sync::Mutex;

const TRANSACTIONS: [f64; 6] = [250.0, 13.0, 99.5, 4000.0, 70.0, 1.0];

/// Records requested sleeps without waiting
#[derive(Default)]
struct RecordingSleeper {
    sleeps: std::sync::Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    fn count(&self) -> usize {
        self.sleeps.lock().unwrap().len()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

/// Runs the compute party the first time the owner sleeps
struct ComputeOnSleep<B: HeBackend> {
    compute: Mutex<ComputeParty<B>>,
    sleeps: AtomicU32,
}

#[async_trait]
impl<B: HeBackend + 'static> Sleeper for ComputeOnSleep<B> {
    async fn sleep(&self, _duration: Duration) {
        if self.sleeps.fetch_add(1, Ordering::SeqCst) == 0 {
            self.compute.lock().await.run().await.unwrap();
        }
    }
}

/// Counts reads of each key
struct CountingStore {
    inner: InMemoryBlobStore,
    gets: AtomicU32,
}

#[async_trait]
impl BlobStore for CountingStore {
    async fn put(&self, bucket: &str, key: &str, data: &[u8]) -> StorageResult<()> {
        self.inner.put(bucket, key, data).await
    }

    async fn get(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(bucket, key).await
    }

    async fn exists(&self, bucket: &str, key: &str) -> StorageResult<bool> {
        self.inner.exists(bucket, key).await
    }
}

/// Accepts writes, fails every read
struct BrokenReads;

#[async_trait]
impl BlobStore for BrokenReads {
    async fn put(&self, _bucket: &str, _key: &str, _data: &[u8]) -> StorageResult<()> {
        Ok(())
    }

    async fn get(&self, _bucket: &str, _key: &str) -> StorageResult<Vec<u8>> {
        Err(StorageError::Backend("connection reset".into()))
    }

    async fn exists(&self, _bucket: &str, _key: &str) -> StorageResult<bool> {
        Err(StorageError::Backend("connection reset".into()))
    }
}

fn fast_config(max_attempts: u32) -> ExchangeConfig {
    ExchangeConfig {
        poll: PollPolicy {
            max_attempts,
            interval_secs: 5,
        },
        ..ExchangeConfig::default()
    }
}

/// Store an encrypted score produced under a freshly generated context
async fn seed_foreign_score<B: HeBackend>(backend: B, store: &InMemoryBlobStore) {
    let other = ContextManager::new(backend.clone())
        .generate_context(&ContextParams::insecure_testing())
        .unwrap();
    let adapter = VectorAdapter::new(backend);
    let ct = adapter.encrypt_with_full(&other, &[0.9]).unwrap();
    store
        .put("alice_data", ENCRYPTED_SCORE, adapter.to_text(&ct).as_bytes())
        .await
        .unwrap();
}

/// Decoded ciphertext bytes of a mailbox object, without the backend tag
async fn object_bytes(store: &InMemoryBlobStore, key: &str) -> Vec<u8> {
    let text = String::from_utf8(store.get("alice_data", key).await.unwrap()).unwrap();
    codec::decode(&text).unwrap()[1..].to_vec()
}

fn expected_score() -> blindscore_core::RiskScore {
    clamp_and_band(ScoringModel::builtin().evaluate_plain(&TRANSACTIONS).unwrap())
}

#[tokio::test]
async fn test_stepwise_exchange_mock() {
    let store = Arc::new(InMemoryBlobStore::new());
    let config = fast_config(3);
    let sleeper = Arc::new(RecordingSleeper::default());

    let mut owner = OwnerSession::new(
        MockBackend,
        store.clone(),
        &config,
        ContextParams::insecure_testing(),
    )
    .with_sleeper(sleeper.clone());
    owner.keygen().unwrap();
    owner.encrypt(&TRANSACTIONS).unwrap();
    owner.publish().await.unwrap();
    assert_eq!(
        store.keys("alice_data"),
        vec![ENCRYPTED_INPUT.to_string(), PUBLIC_CONTEXT.to_string()]
    );

    let mut compute =
        ComputeParty::new(MockBackend, store.clone(), &config, ScoringModel::builtin()).unwrap();
    let report = compute.run().await.unwrap();
    assert_eq!(compute.state(), ComputeState::Done);
    assert_eq!(report.model_version, ScoringModel::BUILTIN_VERSION);
    assert_eq!(report.input_slots, 6);
    assert_eq!(report.published_key, ENCRYPTED_SCORE);

    let outcome = owner.await_result().await.unwrap();
    assert_eq!(outcome, OwnerOutcome::Decrypted(expected_score()));
    assert_eq!(owner.state(), &OwnerState::Decrypted(expected_score()));
    assert_eq!(sleeper.count(), 0);
}

#[tokio::test]
async fn test_run_with_rlwe_and_late_compute() {
    let store = Arc::new(InMemoryBlobStore::new());
    let config = fast_config(4);

    let compute =
        ComputeParty::new(RlweBackend, store.clone(), &config, ScoringModel::builtin()).unwrap();
    let sleeper = Arc::new(ComputeOnSleep {
        compute: Mutex::new(compute),
        sleeps: AtomicU32::new(0),
    });

    let mut owner = OwnerSession::new(
        RlweBackend,
        store.clone(),
        &config,
        ContextParams::insecure_testing(),
    )
    .with_sleeper(sleeper.clone());

    let outcome = owner.run(&TRANSACTIONS).await.unwrap();
    let OwnerOutcome::Decrypted(score) = outcome else {
        panic!("expected a score, got {outcome:?}");
    };

    let plain = ScoringModel::builtin().evaluate_plain(&TRANSACTIONS).unwrap();
    assert!((score.raw - plain).abs() < 1e-3, "{} vs {plain}", score.raw);
    assert_eq!(score.value, expected_score().value);
    // Found on the second attempt, after one sleep
    assert_eq!(sleeper.sleeps.load(Ordering::SeqCst), 1);
    assert_eq!(sleeper.compute.lock().await.state(), ComputeState::Done);
}

#[tokio::test]
async fn test_timeout_after_exact_attempts() {
    let store = Arc::new(CountingStore {
        inner: InMemoryBlobStore::new(),
        gets: AtomicU32::new(0),
    });
    let sleeper = Arc::new(RecordingSleeper::default());

    let mut owner = OwnerSession::new(
        MockBackend,
        store.clone(),
        &fast_config(4),
        ContextParams::insecure_testing(),
    )
    .with_sleeper(sleeper.clone());

    let outcome = owner.run(&TRANSACTIONS).await.unwrap();
    assert_eq!(outcome, OwnerOutcome::TimedOut { attempts: 4 });
    assert_eq!(owner.state(), &OwnerState::TimedOut { attempts: 4 });
    assert_eq!(store.gets.load(Ordering::SeqCst), 4);
    assert_eq!(sleeper.count(), 3);
    assert!(
        sleeper
            .sleeps
            .lock()
            .unwrap()
            .iter()
            .all(|d| *d == Duration::from_secs(5))
    );
}

#[tokio::test]
async fn test_storage_failure_propagates_while_waiting() {
    let sleeper = Arc::new(RecordingSleeper::default());
    let mut owner = OwnerSession::new(
        MockBackend,
        Arc::new(BrokenReads),
        &fast_config(10),
        ContextParams::insecure_testing(),
    )
    .with_sleeper(sleeper.clone());

    let result = owner.run(&TRANSACTIONS).await;
    assert!(matches!(
        result,
        Err(ExchangeError::Storage(StorageError::Backend(_)))
    ));
    assert_eq!(owner.state(), &OwnerState::Waiting { attempt: 1 });
    assert_eq!(sleeper.count(), 0);
}

#[tokio::test]
async fn test_compute_missing_objects() {
    let store = Arc::new(InMemoryBlobStore::new());
    let config = ExchangeConfig::default();

    let mut compute =
        ComputeParty::new(MockBackend, store.clone(), &config, ScoringModel::builtin()).unwrap();
    match compute.run().await {
        Err(ExchangeError::ObjectNotFound { bucket, key }) => {
            assert_eq!(bucket, "alice_data");
            assert_eq!(key, PUBLIC_CONTEXT);
        }
        other => panic!("expected ObjectNotFound, got {other:?}"),
    }

    // Public context present, input still missing
    let contexts = ContextManager::new(MockBackend);
    let full = contexts
        .generate_context(&ContextParams::insecure_testing())
        .unwrap();
    store
        .put(
            "alice_data",
            PUBLIC_CONTEXT,
            contexts.to_text(&Context::Full(full), false).as_bytes(),
        )
        .await
        .unwrap();

    let mut compute =
        ComputeParty::new(MockBackend, store.clone(), &config, ScoringModel::builtin()).unwrap();
    assert!(matches!(
        compute.run().await,
        Err(ExchangeError::ObjectNotFound { key, .. }) if key == ENCRYPTED_INPUT
    ));
    assert!(!store.exists("alice_data", ENCRYPTED_SCORE).await.unwrap());
}

#[tokio::test]
async fn test_compute_rejects_full_context_on_channel() {
    let store = Arc::new(InMemoryBlobStore::new());
    let config = ExchangeConfig::default();

    let mut owner = OwnerSession::new(
        MockBackend,
        store.clone(),
        &config,
        ContextParams::insecure_testing(),
    );
    owner.keygen().unwrap();
    owner.encrypt(&TRANSACTIONS).unwrap();
    owner.publish().await.unwrap();

    // Overwrite the public context with the secret one
    let leaked = owner.export_full_context().unwrap();
    store
        .put("alice_data", PUBLIC_CONTEXT, leaked.as_bytes())
        .await
        .unwrap();

    let mut compute =
        ComputeParty::new(MockBackend, store.clone(), &config, ScoringModel::builtin()).unwrap();
    assert!(matches!(
        compute.run().await,
        Err(ExchangeError::Core(CoreError::He(HeError::InvalidContext(_))))
    ));
    assert!(!store.exists("alice_data", ENCRYPTED_SCORE).await.unwrap());
}

#[tokio::test]
async fn test_compute_rejects_input_from_other_context() {
    let store = Arc::new(InMemoryBlobStore::new());
    let config = ExchangeConfig::default();

    let mut alice = OwnerSession::new(
        MockBackend,
        store.clone(),
        &config,
        ContextParams::insecure_testing(),
    );
    alice.keygen().unwrap();
    alice.encrypt(&TRANSACTIONS).unwrap();
    alice.publish().await.unwrap();

    // Someone else's context replaces the published one
    let contexts = ContextManager::new(MockBackend);
    let other = contexts
        .generate_context(&ContextParams::insecure_testing())
        .unwrap();
    store
        .put(
            "alice_data",
            PUBLIC_CONTEXT,
            contexts.to_text(&Context::Full(other), false).as_bytes(),
        )
        .await
        .unwrap();

    let mut compute =
        ComputeParty::new(MockBackend, store.clone(), &config, ScoringModel::builtin()).unwrap();
    let err = compute.run().await.unwrap_err();
    assert!(matches!(err, ExchangeError::Core(ref e) if e.is_context_mismatch()));
    assert!(!store.exists("alice_data", ENCRYPTED_SCORE).await.unwrap());
}

#[tokio::test]
async fn test_resume_after_restart() {
    let store = Arc::new(InMemoryBlobStore::new());
    let config = fast_config(2);

    let saved = {
        let mut owner = OwnerSession::new(
            MockBackend,
            store.clone(),
            &config,
            ContextParams::insecure_testing(),
        );
        owner.keygen().unwrap();
        owner.encrypt(&TRANSACTIONS).unwrap();
        owner.publish().await.unwrap();
        owner.export_full_context().unwrap()
    };

    ComputeParty::new(MockBackend, store.clone(), &config, ScoringModel::builtin())
        .unwrap()
        .run()
        .await
        .unwrap();

    let full = ContextManager::new(MockBackend)
        .from_text(&saved)
        .unwrap()
        .into_full()
        .unwrap();
    let mut owner = OwnerSession::resume(MockBackend, store.clone(), &config, full)
        .with_sleeper(Arc::new(RecordingSleeper::default()));
    assert_eq!(owner.state(), &OwnerState::Publish);

    let outcome = owner.await_result().await.unwrap();
    assert_eq!(outcome, OwnerOutcome::Decrypted(expected_score()));
}

#[tokio::test]
async fn test_key_prefix_namespaces_objects() {
    let store = Arc::new(InMemoryBlobStore::new());
    let config = ExchangeConfig {
        key_prefix: "run-42".into(),
        ..fast_config(1)
    };

    let mut owner = OwnerSession::new(
        MockBackend,
        store.clone(),
        &config,
        ContextParams::insecure_testing(),
    )
    .with_sleeper(Arc::new(RecordingSleeper::default()));
    owner.keygen().unwrap();
    owner.encrypt(&TRANSACTIONS).unwrap();
    owner.publish().await.unwrap();

    let report = ComputeParty::new(MockBackend, store.clone(), &config, ScoringModel::builtin())
        .unwrap()
        .run()
        .await
        .unwrap();
    assert_eq!(report.published_key, "run-42/outputs/encrypted_score");

    assert_eq!(
        store.keys("alice_data"),
        vec![
            "run-42/inputs/encrypted_transactions".to_string(),
            "run-42/keys/public".to_string(),
            "run-42/outputs/encrypted_score".to_string(),
        ]
    );
    assert!(matches!(
        owner.await_result().await.unwrap(),
        OwnerOutcome::Decrypted(score) if score.band == expected_score().band
    ));
}

#[tokio::test]
async fn test_high_risk_band_reachable() {
    let store = Arc::new(InMemoryBlobStore::new());
    let config = fast_config(1);
    // The first input contributes 0.008 per unit
    let values = [20_000.0, 0.0, 0.0, 0.0, 0.0, 0.0];

    let mut owner = OwnerSession::new(
        MockBackend,
        store.clone(),
        &config,
        ContextParams::insecure_testing(),
    );
    owner.keygen().unwrap();
    owner.encrypt(&values).unwrap();
    owner.publish().await.unwrap();
    ComputeParty::new(MockBackend, store.clone(), &config, ScoringModel::builtin())
        .unwrap()
        .run()
        .await
        .unwrap();

    let OwnerOutcome::Decrypted(score) = owner.await_result().await.unwrap() else {
        panic!("expected a score");
    };
    assert_eq!(score.band, RiskBand::High);
    assert_eq!(score.value, 100);
}

#[tokio::test]
async fn test_stale_score_from_other_context_is_skipped() {
    let store = Arc::new(InMemoryBlobStore::new());
    let config = fast_config(3);
    seed_foreign_score(MockBackend, &store).await;

    let compute =
        ComputeParty::new(MockBackend, store.clone(), &config, ScoringModel::builtin()).unwrap();
    let sleeper = Arc::new(ComputeOnSleep {
        compute: Mutex::new(compute),
        sleeps: AtomicU32::new(0),
    });
    let mut owner = OwnerSession::new(
        MockBackend,
        store.clone(),
        &config,
        ContextParams::insecure_testing(),
    )
    .with_sleeper(sleeper.clone());

    let outcome = owner.run(&TRANSACTIONS).await.unwrap();
    assert_eq!(outcome, OwnerOutcome::Decrypted(expected_score()));
    // The stale score counted as not ready on the first attempt
    assert_eq!(sleeper.sleeps.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_stale_score_alone_times_out() {
    let store = Arc::new(InMemoryBlobStore::new());
    seed_foreign_score(RlweBackend, &store).await;
    let sleeper = Arc::new(RecordingSleeper::default());

    let mut owner = OwnerSession::new(
        RlweBackend,
        store.clone(),
        &fast_config(3),
        ContextParams::insecure_testing(),
    )
    .with_sleeper(sleeper.clone());

    let outcome = owner.run(&TRANSACTIONS).await.unwrap();
    assert_eq!(outcome, OwnerOutcome::TimedOut { attempts: 3 });
    assert_eq!(sleeper.count(), 2);
}

/// Run a full RLWE exchange, returning its store and the decrypted raw score
async fn rlwe_exchange(params: ContextParams, values: &[f64]) -> (Arc<InMemoryBlobStore>, f64) {
    let store = Arc::new(InMemoryBlobStore::new());
    let config = fast_config(1);

    let mut owner = OwnerSession::new(RlweBackend, store.clone(), &config, params);
    owner.keygen().unwrap();
    owner.encrypt(values).unwrap();
    owner.publish().await.unwrap();
    ComputeParty::new(RlweBackend, store.clone(), &config, ScoringModel::builtin())
        .unwrap()
        .run()
        .await
        .unwrap();

    let OwnerOutcome::Decrypted(score) = owner.await_result().await.unwrap() else {
        panic!("expected a score");
    };
    (store, score.raw)
}

#[tokio::test]
async fn test_mailbox_objects_do_not_depend_on_values() {
    // magic and version, then the context id, then the value-independent header
    const CONTEXT_ID: std::ops::Range<usize> = 5..37;
    const HEADER_LEN: usize = 78;

    let quiet = [1.0, 0.0, 2.0, 0.5, 0.0, 3.0];
    let (loud_store, _) = rlwe_exchange(ContextParams::insecure_testing(), &TRANSACTIONS).await;
    let (quiet_store, _) = rlwe_exchange(ContextParams::insecure_testing(), &quiet).await;

    for key in [ENCRYPTED_INPUT, ENCRYPTED_SCORE] {
        let loud = object_bytes(&loud_store, key).await;
        let quiet = object_bytes(&quiet_store, key).await;
        assert_eq!(loud.len(), quiet.len(), "{key}");
        assert_eq!(loud[..CONTEXT_ID.start], quiet[..CONTEXT_ID.start], "{key}");
        assert_eq!(
            loud[CONTEXT_ID.end..HEADER_LEN],
            quiet[CONTEXT_ID.end..HEADER_LEN],
            "{key}"
        );

        let scale = 2f64.powi(ContextParams::insecure_testing().scale_bits as i32);
        for value in TRANSACTIONS {
            for needle in [value.to_le_bytes(), (value * scale).to_le_bytes()] {
                assert!(!loud.windows(8).any(|w| w == needle), "{key} leaks {value}");
            }
        }
    }
}

#[tokio::test]
async fn test_builtin_model_at_scale_40() {
    let values = [120.0, 35.0, 800.0, 12.0, 5.0, 64.0];
    let params = ContextParams {
        scale_bits: 40,
        ..ContextParams::insecure_testing()
    };

    let (_, raw) = rlwe_exchange(params, &values).await;
    let plain = ScoringModel::builtin().evaluate_plain(&values).unwrap();
    assert!((raw - plain).abs() < 1e-6, "{raw} vs {plain}");
}

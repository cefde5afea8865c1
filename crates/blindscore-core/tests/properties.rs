//! Property-based tests for the encrypted scoring core
//!
//! Ciphertexts are randomized, so these check behavior rather than bytes.

use blindscore_core::he::backends::{MockBackend, RlweBackend};
use blindscore_core::*;
use proptest::prelude::*;

fn value() -> impl Strategy<Value = f64> {
    -1.0e4..1.0e4
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Property: decrypt(encrypt(v)) ≈ v
    #[test]
    fn prop_rlwe_roundtrip(values in prop::collection::vec(value(), 1..64)) {
        let contexts = ContextManager::new(RlweBackend);
        let adapter = VectorAdapter::new(RlweBackend);
        let full = contexts.generate_context(&ContextParams::insecure_testing()).unwrap();

        let ct = adapter.encrypt_with_full(&full, &values).unwrap();
        let decrypted = adapter.decrypt(&full, &ct).unwrap();

        prop_assert_eq!(decrypted.len(), values.len());
        for (got, want) in decrypted.iter().zip(&values) {
            prop_assert!((got - want).abs() < 1e-6, "{} vs {}", got, want);
        }
    }

    /// Property: decrypt(score(encrypt(v))) ≈ evaluate_plain(v)
    #[test]
    fn prop_rlwe_score_matches_plain(values in prop::collection::vec(value(), 6)) {
        let contexts = ContextManager::new(RlweBackend);
        let adapter = VectorAdapter::new(RlweBackend);
        let engine = ScoringEngine::new(RlweBackend, ScoringModel::builtin()).unwrap();
        let full = contexts.generate_context(&ContextParams::insecure_testing()).unwrap();

        let ct = adapter.encrypt(&contexts.derive_public(&full), &values).unwrap();
        let scored = engine.score(&ct).unwrap();
        let got = adapter.decrypt(&full, &scored).unwrap();

        let expected = engine.model().evaluate_plain(&values).unwrap();
        prop_assert_eq!(got.len(), 1);
        prop_assert!((got[0] - expected).abs() < 1e-3, "{} vs {}", got[0], expected);
    }

    /// Property: the mock backend is exact
    #[test]
    fn prop_mock_roundtrip(values in prop::collection::vec(value(), 1..256)) {
        let adapter = VectorAdapter::new(MockBackend);
        let full = MockBackend.generate_context(&ContextParams::insecure_testing()).unwrap();

        let ct = adapter.from_text(&adapter.to_text(&adapter.encrypt_with_full(&full, &values).unwrap())).unwrap();
        prop_assert_eq!(adapter.decrypt(&full, &ct).unwrap(), values);
    }

    /// Property: clamp_and_band is total and consistent with its bands
    #[test]
    fn prop_clamp_and_band_total(raw in any::<f64>()) {
        let score = clamp_and_band(raw);
        prop_assert!(score.value <= 100);
        prop_assert_eq!(score.band, RiskBand::from_score(score.value));
        if raw.is_finite() && (0.0..=100.0).contains(&raw) {
            prop_assert!((score.value as f64 - raw).abs() <= 0.5);
        }
    }

    /// Property: context text survives a round trip for both kinds
    #[test]
    fn prop_context_text_roundtrip(include_secret in any::<bool>()) {
        let contexts = ContextManager::new(MockBackend);
        let full = contexts.generate_context(&ContextParams::insecure_testing()).unwrap();

        let text = contexts.to_text(&Context::Full(full), include_secret);
        let parsed = contexts.from_text(&text).unwrap();
        prop_assert_eq!(parsed.is_full(), include_secret);
    }
}

//! Compute Party side of the exchange
//!
//! `Triggered -> Fetching -> Computing -> Publishing -> Done`, run once per
//! trigger. Nothing is written unless scoring succeeded.

use std::sync::Arc;

use blindscore_core::{
    ContextManager, CoreError, HeBackend, HeError, ScoringEngine, ScoringModel, VectorAdapter,
};
use blindscore_storage::BlobStore;
use serde::Serialize;

use crate::config::ExchangeConfig;
use crate::error::{ExchangeError, ExchangeResult};
use crate::mailbox::{ENCRYPTED_INPUT, ENCRYPTED_SCORE, Mailbox, PUBLIC_CONTEXT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputeState {
    Triggered,
    Fetching,
    Computing,
    Publishing,
    Done,
}

/// Summary of a completed scoring run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComputeReport {
    pub model_version: String,
    pub input_slots: usize,
    pub bucket: String,
    pub published_key: String,
}

pub struct ComputeParty<B: HeBackend> {
    contexts: ContextManager<B>,
    adapter: VectorAdapter<B>,
    engine: ScoringEngine<B>,
    mailbox: Mailbox,
    state: ComputeState,
}

impl<B: HeBackend> ComputeParty<B> {
    pub fn new(
        backend: B,
        store: Arc<dyn BlobStore>,
        config: &ExchangeConfig,
        model: ScoringModel,
    ) -> ExchangeResult<Self> {
        Ok(Self {
            contexts: ContextManager::new(backend.clone()),
            adapter: VectorAdapter::new(backend.clone()),
            engine: ScoringEngine::new(backend, model)?,
            mailbox: Mailbox::new(store, config),
            state: ComputeState::Triggered,
        })
    }

    pub fn state(&self) -> ComputeState {
        self.state
    }

    pub fn model(&self) -> &ScoringModel {
        self.engine.model()
    }

    pub async fn run(&mut self) -> ExchangeResult<ComputeReport> {
        if self.state != ComputeState::Triggered {
            return Err(ExchangeError::InvalidState(format!(
                "compute already ran (state {:?})",
                self.state
            )));
        }

        self.transition(ComputeState::Fetching);
        let context_text = self.mailbox.get_text(PUBLIC_CONTEXT).await?;
        let input_text = self.mailbox.get_text(ENCRYPTED_INPUT).await?;

        let context = self.contexts.from_text(&context_text)?;
        if context.is_full() {
            tracing::warn!("secret key material found in the mailbox, refusing to score");
            return Err(CoreError::from(HeError::InvalidContext(
                "published context contains a secret key".into(),
            ))
            .into());
        }
        let public = context.to_public(self.contexts.backend());
        let input = self.adapter.from_text(&input_text)?;
        self.adapter.check_context(&public, &input)?;

        self.transition(ComputeState::Computing);
        let input_slots = self.contexts.backend().slot_count(&input);
        let score = self.engine.score(&input)?;
        let score_text = self.adapter.to_text(&score);

        self.transition(ComputeState::Publishing);
        self.mailbox.put_text(ENCRYPTED_SCORE, &score_text).await?;

        self.transition(ComputeState::Done);
        Ok(ComputeReport {
            model_version: self.engine.model().version.clone(),
            input_slots,
            bucket: self.mailbox.bucket().to_string(),
            published_key: self.mailbox.key(ENCRYPTED_SCORE),
        })
    }

    fn transition(&mut self, next: ComputeState) {
        tracing::info!(from = ?self.state, to = ?next, "compute state");
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blindscore_core::he::backends::MockBackend;
    use blindscore_storage::InMemoryBlobStore;

    #[tokio::test]
    async fn test_runs_once() {
        let store = Arc::new(InMemoryBlobStore::new());
        let mut compute = ComputeParty::new(
            MockBackend,
            store,
            &ExchangeConfig::default(),
            ScoringModel::builtin(),
        )
        .unwrap();

        // Nothing published yet
        assert!(compute.run().await.is_err());
        assert_eq!(compute.state(), ComputeState::Fetching);
        assert!(matches!(
            compute.run().await,
            Err(ExchangeError::InvalidState(_))
        ));
    }

    #[test]
    fn test_invalid_model_rejected() {
        let mut model = ScoringModel::builtin();
        model.output_weights.clear();
        assert!(
            ComputeParty::new(
                MockBackend,
                Arc::new(InMemoryBlobStore::new()),
                &ExchangeConfig::default(),
                model,
            )
            .is_err()
        );
    }
}

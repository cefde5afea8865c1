//! Data Owner side of the exchange
//!
//! ```text
//! Init ─keygen─▶ KeyGen ─encrypt─▶ Encrypt ─publish─▶ Publish
//!                                                        │ await_result
//!                                                        ▼
//!                                     Waiting{attempt} ──▶ Decrypted | TimedOut
//! ```
//!
//! Each state names the last completed phase. Steps called out of order fail
//! with [`ExchangeError::InvalidState`] and leave the session untouched.

use std::sync::Arc;

use blindscore_core::{
    Context, ContextManager, ContextParams, HeBackend, RiskScore, VectorAdapter,
};
use blindscore_storage::BlobStore;

use crate::config::{ExchangeConfig, PollPolicy};
use crate::error::{ExchangeError, ExchangeResult};
use crate::mailbox::{ENCRYPTED_INPUT, ENCRYPTED_SCORE, Mailbox, PUBLIC_CONTEXT};
use crate::poll::{Poller, Sleeper, TokioSleeper};

#[derive(Debug, Clone, PartialEq)]
pub enum OwnerState {
    Init,
    KeyGen,
    Encrypt,
    Publish,
    Waiting { attempt: u32 },
    Decrypted(RiskScore),
    TimedOut { attempts: u32 },
}

impl OwnerState {
    fn name(&self) -> &'static str {
        match self {
            OwnerState::Init => "init",
            OwnerState::KeyGen => "keygen",
            OwnerState::Encrypt => "encrypt",
            OwnerState::Publish => "publish",
            OwnerState::Waiting { .. } => "waiting",
            OwnerState::Decrypted(_) => "decrypted",
            OwnerState::TimedOut { .. } => "timed-out",
        }
    }
}

/// How a wait for the score ended
#[derive(Debug, Clone, PartialEq)]
pub enum OwnerOutcome {
    Decrypted(RiskScore),
    /// The score never appeared within the poll budget
    TimedOut { attempts: u32 },
}

pub struct OwnerSession<B: HeBackend> {
    contexts: ContextManager<B>,
    adapter: VectorAdapter<B>,
    mailbox: Mailbox,
    params: ContextParams,
    poll: PollPolicy,
    sleeper: Arc<dyn Sleeper>,
    state: OwnerState,
    full: Option<B::FullContext>,
    input: Option<B::Ciphertext>,
}

impl<B: HeBackend> OwnerSession<B> {
    pub fn new(
        backend: B,
        store: Arc<dyn BlobStore>,
        config: &ExchangeConfig,
        params: ContextParams,
    ) -> Self {
        Self {
            contexts: ContextManager::new(backend.clone()),
            adapter: VectorAdapter::new(backend),
            mailbox: Mailbox::new(store, config),
            params,
            poll: config.poll.clone(),
            sleeper: Arc::new(TokioSleeper),
            state: OwnerState::Init,
            full: None,
            input: None,
        }
    }

    /// Pick up a published exchange with a previously persisted full context
    ///
    /// The session starts in `Publish`, ready for [`await_result`](Self::await_result).
    pub fn resume(
        backend: B,
        store: Arc<dyn BlobStore>,
        config: &ExchangeConfig,
        full: B::FullContext,
    ) -> Self {
        let mut session = Self::new(backend, store, config, ContextParams::default());
        session.full = Some(full);
        session.state = OwnerState::Publish;
        session
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn state(&self) -> &OwnerState {
        &self.state
    }

    /// The full context, once generated; never leaves the Owner
    pub fn full_context(&self) -> Option<&B::FullContext> {
        self.full.as_ref()
    }

    /// Text form of the full context including the secret key
    pub fn export_full_context(&self) -> ExchangeResult<String> {
        let full = self.require_full()?;
        Ok(self.contexts.to_text(&Context::Full(full.clone()), true))
    }

    pub fn keygen(&mut self) -> ExchangeResult<()> {
        self.expect_state(&OwnerState::Init)?;

        let full = self.contexts.generate_context(&self.params)?;
        self.full = Some(full);
        self.transition(OwnerState::KeyGen);
        Ok(())
    }

    pub fn encrypt(&mut self, values: &[f64]) -> ExchangeResult<()> {
        self.expect_state(&OwnerState::KeyGen)?;
        if values.is_empty() {
            return Err(ExchangeError::InvalidInput("no transactions to score".into()));
        }

        let ct = self.adapter.encrypt_with_full(self.require_full()?, values)?;
        self.input = Some(ct);
        self.transition(OwnerState::Encrypt);
        Ok(())
    }

    /// Write the public context and encrypted input to the mailbox
    pub async fn publish(&mut self) -> ExchangeResult<()> {
        self.expect_state(&OwnerState::Encrypt)?;

        let full = self.require_full()?;
        let input = self
            .input
            .as_ref()
            .ok_or_else(|| ExchangeError::InvalidState("no encrypted input".into()))?;

        let public_text = self.contexts.to_text(&Context::Full(full.clone()), false);
        let input_text = self.adapter.to_text(input);

        self.mailbox.put_text(PUBLIC_CONTEXT, &public_text).await?;
        self.mailbox.put_text(ENCRYPTED_INPUT, &input_text).await?;
        self.transition(OwnerState::Publish);
        Ok(())
    }

    /// Poll for the encrypted score and decrypt it
    pub async fn await_result(&mut self) -> ExchangeResult<OwnerOutcome> {
        self.expect_state(&OwnerState::Publish)?;

        let public = self.contexts.derive_public(self.require_full()?);
        let mut poller = Poller::new(self.poll.clone());
        while let Some(attempt) = poller.next_attempt() {
            self.state = OwnerState::Waiting { attempt };
            tracing::debug!(attempt, max = poller.max_attempts(), "fetching encrypted score");

            if let Some(text) = self.mailbox.try_get_text(ENCRYPTED_SCORE).await? {
                let ct = self.adapter.from_text(&text)?;
                // A score left by an exchange under another context counts as not ready
                if self.adapter.check_context(&public, &ct).is_ok() {
                    let score = self.adapter.decrypt_score(self.require_full()?, &ct)?;
                    self.transition(OwnerState::Decrypted(score));
                    return Ok(OwnerOutcome::Decrypted(score));
                }
                tracing::warn!(attempt, "ignoring encrypted score from another context");
            }

            if poller.has_remaining() {
                self.sleeper.sleep(poller.interval()).await;
            }
        }

        let attempts = poller.attempts();
        tracing::warn!(attempts, "no score after exhausting poll budget");
        self.transition(OwnerState::TimedOut { attempts });
        Ok(OwnerOutcome::TimedOut { attempts })
    }

    /// Drive every step from key generation to the final outcome
    pub async fn run(&mut self, values: &[f64]) -> ExchangeResult<OwnerOutcome> {
        self.keygen()?;
        self.encrypt(values)?;
        self.publish().await?;
        self.await_result().await
    }

    fn require_full(&self) -> ExchangeResult<&B::FullContext> {
        self.full
            .as_ref()
            .ok_or_else(|| ExchangeError::InvalidState("no context generated".into()))
    }

    fn expect_state(&self, expected: &OwnerState) -> ExchangeResult<()> {
        if &self.state != expected {
            return Err(ExchangeError::InvalidState(format!(
                "expected {}, owner is in {}",
                expected.name(),
                self.state.name()
            )));
        }
        Ok(())
    }

    fn transition(&mut self, next: OwnerState) {
        tracing::info!(from = self.state.name(), to = next.name(), "owner state");
        self.state = next;
    }
}

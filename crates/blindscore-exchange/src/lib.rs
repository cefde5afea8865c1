//! # blindscore-exchange
//!
//! The two parties of a scoring exchange, driven over a shared blob store.
//!
//! ```text
//! Owner                         mailbox                          Compute
//!   keygen, encrypt
//!   publish ───────────▶ keys/public
//!           ───────────▶ inputs/encrypted_transactions
//!                                            ◀─────────── fetch, score
//!                         outputs/encrypted_score ◀────── publish
//!   poll ◀──────────────
//!   decrypt, band
//! ```
//!
//! Only public material crosses the mailbox. The Owner's wait is bounded by
//! a [`PollPolicy`]; running out of attempts is an outcome, not an error.

pub mod compute;
pub mod config;
pub mod error;
pub mod mailbox;
pub mod owner;
pub mod poll;

pub use compute::{ComputeParty, ComputeReport, ComputeState};
pub use config::{ExchangeConfig, PollPolicy};
pub use error::{ExchangeError, ExchangeResult};
pub use mailbox::Mailbox;
pub use owner::{OwnerOutcome, OwnerSession, OwnerState};
pub use poll::{Poller, Sleeper, TokioSleeper};

//! script::warmup
//!
//! Background construction of an evaluator.
//!
//! Building an embedded engine can take long enough to notice, so the
//! extraction starts it on a separate thread as soon as it knows a format
//! expression is configured, and joins it just before composition. The
//! join happens exactly once and always yields a value: either the ready
//! evaluator or an `EvaluatorError`. It never panics or hangs if the
//! background thread died.

use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use super::traits::{EvaluatorError, ExpressionEvaluator};
use super::{create_evaluator, EngineKind};

type Built = Result<Box<dyn ExpressionEvaluator>, EvaluatorError>;

/// Handle to an evaluator being built.
pub struct EvaluatorWarmup {
    state: State,
}

enum State {
    Pending {
        rx: Receiver<Built>,
        handle: JoinHandle<()>,
    },
    Ready(Built),
}

impl EvaluatorWarmup {
    /// Start building an evaluator for `kind` in the background.
    ///
    /// Falls back to building it on the calling thread if no thread can be
    /// spawned.
    pub fn spawn(kind: EngineKind) -> Self {
        let (tx, rx) = mpsc::sync_channel(1);
        let thread_kind = kind.clone();
        let spawned = thread::Builder::new()
            .name("evaluator-warmup".to_string())
            .spawn(move || {
                let started = Instant::now();
                let built = create_evaluator(&thread_kind);
                tracing::debug!(
                    engine = %thread_kind,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    ok = built.is_ok(),
                    "evaluator initialized"
                );
                // The receiver only goes away if the caller dropped the warm-up.
                let _ = tx.send(built);
            });

        match spawned {
            Ok(handle) => Self {
                state: State::Pending { rx, handle },
            },
            Err(e) => {
                tracing::debug!(error = %e, "cannot spawn warm-up thread, initializing inline");
                Self::ready(create_evaluator(&kind))
            }
        }
    }

    /// Wrap an already built result.
    pub fn ready(built: Built) -> Self {
        Self {
            state: State::Ready(built),
        }
    }

    /// Wait for the evaluator.
    ///
    /// Returns `Unavailable` if the background thread ended without
    /// producing one.
    pub fn join(self) -> Built {
        match self.state {
            State::Ready(built) => built,
            State::Pending { rx, handle } => {
                let received = rx.recv();
                let _ = handle.join();
                received.unwrap_or_else(|_| {
                    Err(EvaluatorError::Unavailable(
                        "evaluator initialization did not complete".to_string(),
                    ))
                })
            }
        }
    }
}

impl std::fmt::Debug for EvaluatorWarmup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self.state {
            State::Pending { .. } => "pending",
            State::Ready(_) => "ready",
        };
        f.debug_struct("EvaluatorWarmup").field("state", &state).finish()
    }
}

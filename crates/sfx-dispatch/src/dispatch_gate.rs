//! Per-message orchestration: prefix → match → admit → load → emit → commit.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use sfx_chat::{ChatError, ChatSubscription};
use sfx_core::Clock;
use tracing::{debug, info, warn};

use crate::dispatch_emitter::{emit_payload, PayloadTransport};
use crate::dispatch_matcher::{has_trigger_prefix, match_command, DEFAULT_TRIGGER_PREFIX};
use crate::dispatch_payload::PayloadLoader;
use crate::dispatch_state::{AdmissionDecision, CommandSpec, CooldownScope, DispatchState};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Static inputs used to build a [`DispatchGate`].
pub struct DispatchGateConfig {
    pub trigger_prefix: String,
    pub global_cooldown_seconds: u64,
    pub commands: Vec<CommandSpec>,
}

impl Default for DispatchGateConfig {
    fn default() -> Self {
        Self {
            trigger_prefix: DEFAULT_TRIGGER_PREFIX.to_string(),
            global_cooldown_seconds: 0,
            commands: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Terminal result of processing one chat message.
pub enum DispatchOutcome {
    Ignored,
    NoMatch,
    CooldownRejected {
        command: String,
        scope: CooldownScope,
    },
    LoadFailed {
        command: String,
        error: String,
    },
    SendFailed {
        command: String,
        error: String,
    },
    Dispatched {
        command: String,
        media_type: String,
        message_bytes: usize,
    },
}

impl DispatchOutcome {
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::Ignored => "dispatch_ignored_no_prefix",
            Self::NoMatch => "dispatch_no_match",
            Self::CooldownRejected {
                scope: CooldownScope::Global,
                ..
            } => "dispatch_global_cooldown",
            Self::CooldownRejected {
                scope: CooldownScope::Command,
                ..
            } => "dispatch_command_cooldown",
            Self::LoadFailed { .. } => "dispatch_load_failed",
            Self::SendFailed { .. } => "dispatch_send_failed",
            Self::Dispatched { .. } => "dispatch_emitted",
        }
    }

    pub fn is_dispatched(&self) -> bool {
        matches!(self, Self::Dispatched { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Read-only view of the cooldown state.
pub struct DispatchSnapshot {
    pub last_dispatch_at: u64,
    pub global_cooldown_seconds: u64,
    pub commands: Vec<CommandSpec>,
}

#[derive(Debug, Clone)]
struct AdmittedCommand {
    name: String,
    file_path: std::path::PathBuf,
}

/// Shared dispatcher. All state mutation happens under one lock that is held
/// only for the admit and commit steps, never across a load or a send.
pub struct DispatchGate {
    trigger_prefix: String,
    state: Mutex<DispatchState>,
    loader: Arc<dyn PayloadLoader>,
}

impl DispatchGate {
    pub fn new(config: DispatchGateConfig, loader: Arc<dyn PayloadLoader>) -> Self {
        Self {
            trigger_prefix: config.trigger_prefix,
            state: Mutex::new(DispatchState::new(
                config.global_cooldown_seconds,
                config.commands,
            )),
            loader,
        }
    }

    pub fn trigger_prefix(&self) -> &str {
        &self.trigger_prefix
    }

    pub fn snapshot(&self) -> DispatchSnapshot {
        let state = self.lock_state();
        DispatchSnapshot {
            last_dispatch_at: state.last_dispatch_at(),
            global_cooldown_seconds: state.global_cooldown_seconds(),
            commands: state.commands().to_vec(),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, DispatchState> {
        // Every mutation is a single field assignment; a poisoned guard is still consistent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn admit(&self, text: &str, now: u64) -> Result<AdmittedCommand, DispatchOutcome> {
        if !has_trigger_prefix(text, &self.trigger_prefix) {
            return Err(DispatchOutcome::Ignored);
        }
        let mut state = self.lock_state();
        let Some(index) = match_command(text, state.commands()) else {
            return Err(DispatchOutcome::NoMatch);
        };
        let decision = state.admit(index, now);
        let Some(command) = state.command(index) else {
            return Err(DispatchOutcome::NoMatch);
        };
        match decision {
            AdmissionDecision::Admitted => Ok(AdmittedCommand {
                name: command.name.clone(),
                file_path: command.file_path.clone(),
            }),
            AdmissionDecision::Rejected(scope) => Err(DispatchOutcome::CooldownRejected {
                command: command.name.clone(),
                scope,
            }),
            AdmissionDecision::UnknownCommand => Err(DispatchOutcome::NoMatch),
        }
    }

    fn commit(&self, now: u64) {
        self.lock_state().commit(now);
    }

    /// Runs one chat message through the gate. `now` is read once by the
    /// caller and reused for every comparison of this message.
    pub async fn handle_message<T>(
        &self,
        text: &str,
        now: u64,
        transport: &mut T,
    ) -> DispatchOutcome
    where
        T: PayloadTransport + ?Sized,
    {
        let admitted = match self.admit(text, now) {
            Ok(admitted) => admitted,
            Err(outcome) => {
                if let DispatchOutcome::CooldownRejected { command, scope } = &outcome {
                    debug!(
                        command = %command,
                        scope = scope.as_str(),
                        now,
                        "trigger rejected by cooldown"
                    );
                }
                return outcome;
            }
        };

        let payload = match self.loader.load(&admitted.file_path).await {
            Ok(payload) => payload,
            Err(error) => {
                warn!(
                    command = %admitted.name,
                    path = %admitted.file_path.display(),
                    error = %error,
                    "failed to load command payload"
                );
                return DispatchOutcome::LoadFailed {
                    command: admitted.name,
                    error: error.to_string(),
                };
            }
        };

        match emit_payload(transport, &payload).await {
            Ok(message_bytes) => {
                self.commit(now);
                info!(
                    command = %admitted.name,
                    media_type = %payload.media_type,
                    message_bytes,
                    now,
                    "dispatched command payload"
                );
                DispatchOutcome::Dispatched {
                    command: admitted.name,
                    media_type: payload.media_type,
                    message_bytes,
                }
            }
            Err(error) => {
                warn!(command = %admitted.name, error = %error, "failed to send command payload");
                DispatchOutcome::SendFailed {
                    command: admitted.name,
                    error: error.to_string(),
                }
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Counters for one subscription's lifetime.
pub struct DispatchSessionReport {
    pub received_messages: usize,
    pub ignored_messages: usize,
    pub unmatched_triggers: usize,
    pub cooldown_rejections: usize,
    pub failed_dispatches: usize,
    pub dispatched: usize,
}

impl DispatchSessionReport {
    fn record(&mut self, outcome: &DispatchOutcome) {
        self.received_messages = self.received_messages.saturating_add(1);
        let counter = match outcome {
            DispatchOutcome::Ignored => &mut self.ignored_messages,
            DispatchOutcome::NoMatch => &mut self.unmatched_triggers,
            DispatchOutcome::CooldownRejected { .. } => &mut self.cooldown_rejections,
            DispatchOutcome::LoadFailed { .. } | DispatchOutcome::SendFailed { .. } => {
                &mut self.failed_dispatches
            }
            DispatchOutcome::Dispatched { .. } => &mut self.dispatched,
        };
        *counter = counter.saturating_add(1);
    }
}

/// Feeds every message of `subscription` through `gate`, one at a time, until
/// the chat stream ends. A chat failure ends the session with that error;
/// load and send failures never do.
pub async fn run_dispatch_session<S, T>(
    gate: &DispatchGate,
    subscription: &mut S,
    transport: &mut T,
    clock: &dyn Clock,
) -> Result<DispatchSessionReport, ChatError>
where
    S: ChatSubscription + ?Sized,
    T: PayloadTransport + ?Sized,
{
    let mut report = DispatchSessionReport::default();
    while let Some(message) = subscription.next_message().await? {
        let now = clock.now_unix_seconds();
        let outcome = gate.handle_message(&message.text, now, transport).await;
        report.record(&outcome);
    }
    Ok(report)
}

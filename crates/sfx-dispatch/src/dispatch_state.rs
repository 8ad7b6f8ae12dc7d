//! Command table and cooldown bookkeeping.
//!
//! Admission is two-phase: [`DispatchState::admit`] reserves the command's
//! own window immediately, while [`DispatchState::commit`] advances the global
//! timestamp only once a payload actually reached the viewer. A failed load or
//! send therefore burns the command's window without blocking other commands.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// One configured chat command and its audio asset.
pub struct CommandSpec {
    pub name: String,
    #[serde(alias = "command")]
    pub trigger: String,
    #[serde(alias = "file")]
    pub file_path: PathBuf,
    #[serde(default, alias = "timeout")]
    pub cooldown_seconds: u64,
    /// Unix seconds; the command may fire again only once `now` exceeds it.
    #[serde(skip)]
    pub expires_at: u64,
}

impl CommandSpec {
    pub fn new(
        name: &str,
        trigger: &str,
        file_path: impl Into<PathBuf>,
        cooldown_seconds: u64,
    ) -> Self {
        Self {
            name: name.to_string(),
            trigger: trigger.to_string(),
            file_path: file_path.into(),
            cooldown_seconds,
            expires_at: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Which rate limit turned a matched trigger away.
pub enum CooldownScope {
    Global,
    Command,
}

impl CooldownScope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Command => "command",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionDecision {
    Admitted,
    Rejected(CooldownScope),
    UnknownCommand,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Process-wide cooldown state shared by every subscription.
pub struct DispatchState {
    global_cooldown_seconds: u64,
    last_dispatch_at: u64,
    commands: Vec<CommandSpec>,
}

impl DispatchState {
    pub fn new(global_cooldown_seconds: u64, commands: Vec<CommandSpec>) -> Self {
        Self {
            global_cooldown_seconds,
            last_dispatch_at: 0,
            commands,
        }
    }

    pub fn global_cooldown_seconds(&self) -> u64 {
        self.global_cooldown_seconds
    }

    pub fn last_dispatch_at(&self) -> u64 {
        self.last_dispatch_at
    }

    pub fn commands(&self) -> &[CommandSpec] {
        &self.commands
    }

    pub fn command(&self, index: usize) -> Option<&CommandSpec> {
        self.commands.get(index)
    }

    /// Decides whether `index` may fire at `now`; reserves its window on success.
    pub fn admit(&mut self, index: usize, now: u64) -> AdmissionDecision {
        let global_ready_after = self
            .last_dispatch_at
            .saturating_add(self.global_cooldown_seconds);
        let Some(command) = self.commands.get_mut(index) else {
            return AdmissionDecision::UnknownCommand;
        };
        if now <= global_ready_after {
            return AdmissionDecision::Rejected(CooldownScope::Global);
        }
        if now <= command.expires_at {
            return AdmissionDecision::Rejected(CooldownScope::Command);
        }
        command.expires_at = command
            .expires_at
            .max(now.saturating_add(command.cooldown_seconds));
        AdmissionDecision::Admitted
    }

    /// Records a completed dispatch. Never moves the timestamp backwards.
    pub fn commit(&mut self, now: u64) {
        self.last_dispatch_at = self.last_dispatch_at.max(now);
    }
}

//! Maps raw chat text onto the command table.

use crate::dispatch_state::CommandSpec;

pub const DEFAULT_TRIGGER_PREFIX: &str = "!";

/// True when the untrimmed chat text starts with the trigger marker.
pub fn has_trigger_prefix(text: &str, prefix: &str) -> bool {
    !prefix.is_empty() && text.starts_with(prefix)
}

/// Returns the first table index whose trigger equals the trimmed text.
pub fn match_command(text: &str, commands: &[CommandSpec]) -> Option<usize> {
    let candidate = text.trim();
    commands
        .iter()
        .position(|command| command.trigger == candidate)
}

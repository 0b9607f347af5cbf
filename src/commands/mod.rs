//! Slash commands of the interactive chat.

mod registry;

pub use registry::{all_commands, find_command, Command};

use crate::core::session::ChatSession;

/// Mutable state of an interactive chat: the conversation plus the display
/// toggles that slash commands flip.
pub struct ChatState {
    pub session: ChatSession,
    pub show_reasoning: bool,
    pub debug: bool,
}

impl ChatState {
    pub fn new(session: ChatSession, show_reasoning: bool, debug: bool) -> Self {
        Self {
            session,
            show_reasoning,
            debug,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    /// The input was a command; show the message and read the next line.
    Continue(String),
    /// The input is a prompt for the model.
    ProcessAsMessage(String),
}

pub fn process_input(state: &mut ChatState, input: &str) -> CommandResult {
    let trimmed = input.trim();

    let Some(name) = trimmed.strip_prefix('/') else {
        return CommandResult::ProcessAsMessage(trimmed.to_string());
    };

    match find_command(name) {
        Some(command) => (command.handler)(state),
        None => CommandResult::Continue(format!("Unknown command: {trimmed}")),
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "enabled"
    } else {
        "disabled"
    }
}

pub(super) fn handle_reasoning(state: &mut ChatState) -> CommandResult {
    state.show_reasoning = !state.show_reasoning;
    CommandResult::Continue(format!("Reasoning mode {}", on_off(state.show_reasoning)))
}

pub(super) fn handle_debug(state: &mut ChatState) -> CommandResult {
    state.debug = !state.debug;
    CommandResult::Continue(format!("Debug mode {}", on_off(state.debug)))
}

pub(super) fn handle_clear(state: &mut ChatState) -> CommandResult {
    state.session.reset();
    CommandResult::Continue("Chat history cleared.".to_string())
}

pub(super) fn handle_help(_state: &mut ChatState) -> CommandResult {
    let mut help = String::from("Available commands:");
    for command in all_commands() {
        help.push_str(&format!("\n/{} - {}", command.name, command.help));
    }
    help.push_str("\nexit - Leave the chat");
    CommandResult::Continue(help)
}

use super::{ChatState, CommandResult};

pub type CommandHandler = fn(&mut ChatState) -> CommandResult;

pub struct Command {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub help: &'static str,
    pub handler: CommandHandler,
}

pub fn all_commands() -> &'static [Command] {
    COMMANDS
}

pub fn find_command(name: &str) -> Option<&'static Command> {
    all_commands().iter().find(|command| {
        command.name.eq_ignore_ascii_case(name)
            || command
                .aliases
                .iter()
                .any(|alias| alias.eq_ignore_ascii_case(name))
    })
}

const COMMANDS: &[Command] = &[
    Command {
        name: "reasoning",
        aliases: &[],
        help: "Toggle reasoning display on/off",
        handler: super::handle_reasoning,
    },
    Command {
        name: "debug",
        aliases: &[],
        help: "Toggle fragment-level debug output on/off",
        handler: super::handle_debug,
    },
    Command {
        name: "clear",
        aliases: &[],
        help: "Start a fresh conversation",
        handler: super::handle_clear,
    },
    Command {
        name: "help",
        aliases: &["?", "h"],
        help: "Show this help message",
        handler: super::handle_help,
    },
];

mod terminal_commands;
mod terminal_view;

pub use terminal_commands::{parse_command, UserCommand, HELP_TEXT};
pub use terminal_view::TerminalView;

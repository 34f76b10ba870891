//! Command registry and built-in commands

use core::fmt::Write;

use heapless::Vec;

use super::parser::abbreviates;
use super::ConsoleError;
use crate::config::{ALIGN_COLUMN, MAX_COMMANDS, NEWLINE};
use crate::fault::{FaultCode, FaultState, Severity};
use crate::rt_error;

/// A command contributed by another module.
///
/// The handler receives the whole line, command word included, and
/// tokenizes its own arguments. Its result is logged, never acted upon.
pub trait CommandHandler {
    fn handle(&self, line: &str, out: &mut dyn Write) -> Result<(), ConsoleError>;
}

impl<F> CommandHandler for F
where
    F: Fn(&str, &mut dyn Write) -> Result<(), ConsoleError>,
{
    fn handle(&self, line: &str, out: &mut dyn Write) -> Result<(), ConsoleError> {
        self(line, out)
    }
}

/// What running an entry does.
#[derive(Clone, Copy)]
pub enum Action<'a> {
    /// Built-in help listing.
    Help,
    /// Built-in link UART forwarding.
    UartCmd,
    /// Contributed handler.
    Handler(&'a dyn CommandHandler),
}

/// Command descriptor
#[derive(Clone, Copy)]
pub struct CommandEntry<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub action: Action<'a>,
}

/// Append-only, fixed-capacity command table.
///
/// Lookup walks entries in registration order; the first name the typed
/// token abbreviates wins.
pub struct Registry<'a> {
    entries: Vec<CommandEntry<'a>, MAX_COMMANDS>,
    fault: &'a FaultState,
}

impl<'a> Registry<'a> {
    /// Create a table holding only `help`.
    pub fn new(fault: &'a FaultState) -> Self {
        let mut registry = Self {
            entries: Vec::new(),
            fault,
        };
        registry.register_action("help", Action::Help, "help command");
        registry
    }

    /// Register a contributed command.
    ///
    /// A full table is a configuration error: it is raised as a fatal
    /// fault and the command is not registered.
    pub fn register(&mut self, name: &'a str, handler: &'a dyn CommandHandler, description: &'a str) {
        self.register_action(name, Action::Handler(handler), description);
    }

    pub(crate) fn register_action(&mut self, name: &'a str, action: Action<'a>, description: &'a str) {
        if let Err(e) = self.try_register(CommandEntry { name, description, action }) {
            rt_error!(crate::CONSOLE_LOG_STREAM, "CMD", "{}: '{}' dropped", e, name);
            self.fault.set(FaultCode::RegistryFull, Severity::Fatal, self.entries.len() as u32);
        }
    }

    fn try_register(&mut self, entry: CommandEntry<'a>) -> Result<(), ConsoleError> {
        self.entries.push(entry).map_err(|_| ConsoleError::RegistryFull)
    }

    /// First entry whose name `token` abbreviates.
    pub fn find(&self, token: &str) -> Option<&CommandEntry<'a>> {
        self.entries.iter().find(|e| abbreviates(token, e.name))
    }

    /// Entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &CommandEntry<'a>> {
        self.entries.iter()
    }

    /// Get all command names
    pub fn names(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.entries.iter().map(|e| e.name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.is_full()
    }
}

/// Banner a contributed command prints on top of its own help text.
pub fn print_component_help(out: &mut dyn Write, label: &str) {
    let _ = write!(out, "***** {} help *****{}", label, NEWLINE);
}

/// Built-in help: every registered command, then the syntax reminder.
pub fn print_help(registry: &Registry<'_>, out: &mut dyn Write) {
    let _ = write!(out, "***** help *****{}", NEWLINE);
    let _ = write!(out, "{nl}List of commands{nl}----------------{nl}", nl = NEWLINE);

    for entry in registry.iter() {
        let _ = write!(
            out,
            "{:<width$} {}{}",
            entry.name,
            entry.description,
            NEWLINE,
            width = ALIGN_COLUMN
        );
    }

    for text in HELP_SYNTAX {
        let _ = write!(out, "{}{}", text, NEWLINE);
    }
}

static HELP_SYNTAX: &[&str] = &[
    "",
    "Help syntax",
    "-----------",
    "warning: case sensitive commands",
    "[optional parameter]",
    "<parameter value>",
    "<val_1>|<val_2>|...|<val_n>: parameter value list",
    "(command description)",
    "return key: last command re-execution",
    "#: comment line",
    "",
    "Advice",
    "-----------",
    "to use commands it is adviced to use one of the following command to disable traces",
    "trace off (allows disable all traces)",
    "cst polling off  (allows to disable modem polling and avoid to display uncomfortable modem traces",
    "",
];

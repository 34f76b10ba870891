//! Console engine: one consumer loop per board
//!
//! ```text
//! WAIT_LINE → CLASSIFY → (REPLAY | STORE) → TOKENIZE → DISPATCH → PROMPT
//!     ▲                                                             │
//!     └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The loop never exits except through `reset`.

use core::fmt::Write;

use heapless::Vec;

use super::commands::{print_help, Action, CommandHandler, Registry};
use super::parser::{abbreviates, split_command};
use super::{ConsoleError, ConsoleState, HandoffSignal, History, LineBuffer};
use crate::config::{LINE_SIZE, NEWLINE, PROMPT, RESET_DELAY_MS};
use crate::fault::FaultState;
use crate::hal::{LinkPort, Platform};
use crate::{rt_debug, rt_info, rt_warn};

/// Version string (set by build.rs, includes git hash)
pub const VERSION: &str = env!("VERSION_STRING");

/// Keyword handled before the registry is consulted.
const RESET_KEYWORD: &str = "reset";

/// Stands in for bytes that are not text, so the line keeps its length.
const INVALID_BYTE: u8 = b'?';

/// Outcome of one loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Keep looping.
    Continue,
    /// `reset` was typed; the board must be reset and the loop abandoned.
    Reset,
}

/// Console engine state.
pub struct Console<'a, S> {
    state: &'a ConsoleState<S>,
    registry: Registry<'a>,
    history: History,
    link: Option<&'a mut dyn LinkPort>,
    fault: &'a FaultState,
}

impl<'a, S: HandoffSignal> Console<'a, S> {
    /// Create the engine. `help` is registered here, before any contributor.
    pub fn new(state: &'a ConsoleState<S>, fault: &'a FaultState) -> Self {
        Self {
            state,
            registry: Registry::new(fault),
            history: History::new(),
            link: None,
            fault,
        }
    }

    /// Register a contributed command (start-up only).
    pub fn register(&mut self, name: &'a str, handler: &'a dyn CommandHandler, description: &'a str) {
        self.registry.register(name, handler, description);
    }

    /// Attach the link UART and register `uartcmd`.
    pub fn attach_link(&mut self, port: &'a mut dyn LinkPort) {
        self.link = Some(port);
        self.registry
            .register_action("uartcmd", Action::UartCmd, "send command to link uart");
    }

    pub fn registry(&self) -> &Registry<'a> {
        &self.registry
    }

    /// The line a blank input would replay.
    pub fn last_command(&self) -> Option<&str> {
        self.history.last()
    }

    /// Report a fatal fault raised during start-up.
    ///
    /// Returns `true` if the console must not enter its loop.
    pub fn halted_by_fault(&self, out: &mut dyn Write) -> bool {
        if !self.fault.is_fatal() {
            return false;
        }
        let f = self.fault.snapshot();
        let _ = write!(out, "fatal fault {:?} ({}), console halted{}", f.code, f.data, NEWLINE);
        true
    }

    /// Wait for the next completed line and process it.
    pub fn process_next(&mut self, out: &mut dyn Write) -> Step {
        let mut line = LineBuffer::new();
        let source = self.state.take_line(&mut line);
        rt_debug!(crate::CONSOLE_LOG_STREAM, "CMD", "{:?} line, {} chars", source, line.len());
        if line.replace_invalid(INVALID_BYTE) {
            rt_warn!(crate::CONSOLE_LOG_STREAM, "CMD", "{:?} line has non-text bytes", source);
        }
        self.process_line(line.as_str(), out)
    }

    /// Process one completed line.
    pub fn process_line(&mut self, raw: &str, out: &mut dyn Write) -> Step {
        if raw.starts_with('#') {
            self.print_prompt(out);
            return Step::Continue;
        }

        let mut line = LineBuffer::new();
        if raw.is_empty() {
            line.set(self.history.last().unwrap_or("help"));
        } else {
            line.set(raw);
            self.history.remember(line.as_str());
        }

        let line = line.as_str();
        let (token, _) = split_command(line);

        // An empty token (leading separator) compares equal to the keyword
        if token.is_empty() || abbreviates(token, RESET_KEYWORD) {
            rt_warn!(crate::CONSOLE_LOG_STREAM, "CMD", "board reset requested");
            let _ = write!(out, "Board reset requested !{}", NEWLINE);
            return Step::Reset;
        }

        match self.registry.find(token).copied() {
            Some(entry) => {
                rt_debug!(crate::CONSOLE_LOG_STREAM, "CMD", "dispatch '{}'", entry.name);
                let _ = write!(out, "{}", NEWLINE);
                let result = match entry.action {
                    Action::Help => {
                        print_help(&self.registry, out);
                        Ok(())
                    }
                    Action::UartCmd => self.forward_to_link(line, out),
                    Action::Handler(handler) => handler.handle(line, out),
                };
                if let Err(e) = result {
                    rt_debug!(crate::CONSOLE_LOG_STREAM, "CMD", "'{}' returned {}", entry.name, e);
                }
            }
            None => {
                rt_info!(crate::CONSOLE_LOG_STREAM, "CMD", "{} '{}'", ConsoleError::UnknownCommand, token);
                let _ = write!(out, "{nl}CMD : unknown command : {}{nl}", line, nl = NEWLINE);
                print_help(&self.registry, out);
            }
        }

        self.print_prompt(out);
        Step::Continue
    }

    /// Run forever. Only a reset leaves the loop.
    pub fn run(&mut self, platform: &mut dyn Platform, out: &mut dyn Write) -> ! {
        loop {
            if self.process_next(out) == Step::Reset {
                platform.delay_ms(RESET_DELAY_MS);
                platform.system_reset();
            }
        }
    }

    /// `uartcmd <text>`: send `<text>\r` to the link UART.
    fn forward_to_link(&mut self, line: &str, out: &mut dyn Write) -> Result<(), ConsoleError> {
        let _ = write!(out, "uartcmd: {}{}", line, NEWLINE);

        let port = self.link.as_deref_mut().ok_or(ConsoleError::LinkUnavailable)?;

        let payload = match line.find(' ') {
            Some(i) => &line[i + 1..],
            None => "",
        };
        if payload.is_empty() {
            return Ok(());
        }

        let mut frame: Vec<u8, LINE_SIZE> = Vec::new();
        // payload is shorter than a line, so the terminator always fits
        let _ = frame.extend_from_slice(payload.as_bytes());
        let _ = frame.push(b'\r');
        port.send(&frame);
        Ok(())
    }

    /// Print the prompt
    pub fn print_prompt(&self, out: &mut dyn Write) {
        let _ = write!(out, "{}{}", NEWLINE, PROMPT);
    }

    /// Print welcome banner
    pub fn print_banner(&self, out: &mut dyn Write) {
        let _ = write!(out, "{nl}{}{nl}", VERSION, nl = NEWLINE);
        let _ = write!(out, "Type 'help' for commands.{}", NEWLINE);
        self.print_prompt(out);
    }
}

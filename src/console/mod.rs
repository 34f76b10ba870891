//! Serial command console
//!
//! Receive interrupts assemble lines, one console thread dispatches them.
//! Zero heap allocation - all static buffers.

pub mod commands;
#[allow(clippy::module_inception)]
pub mod console;
pub mod error;
pub mod history;
pub mod line_buffer;
pub mod parser;
pub mod receiver;
pub mod signal;

pub use commands::{print_component_help, print_help, Action, CommandEntry, CommandHandler, Registry};
pub use console::{Console, Step, VERSION};
pub use error::ConsoleError;
pub use history::History;
pub use line_buffer::LineBuffer;
pub use parser::{abbreviates, parse_line, parse_value, split_command, ParsedCommand};
pub use receiver::{ConsoleState, LineReceiver, RxEvent, Source};
pub use signal::{HandoffSignal, SpinSignal};

#[cfg(feature = "std")]
pub use signal::CondvarSignal;

#[cfg(target_os = "espidf")]
pub use signal::FreeRtosSemaphore;

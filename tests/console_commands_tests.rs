//! Command registry and help tests

mod common;

use core::fmt::Write;

use cell_console::config::{ALIGN_COLUMN, MAX_COMMANDS};
use cell_console::console::{print_component_help, print_help, Action, CommandHandler, ConsoleError, Registry};
use cell_console::{FaultCode, FaultState, Severity};
use common::TestOutput;

fn noop(_line: &str, _out: &mut dyn Write) -> Result<(), ConsoleError> {
    Ok(())
}

#[test]
fn test_registry_starts_with_help() {
    let fault = FaultState::new();
    let registry = Registry::new(&fault);

    assert_eq!(registry.len(), 1);
    let entry = registry.find("help").unwrap();
    assert_eq!(entry.description, "help command");
    assert!(matches!(entry.action, Action::Help));
}

#[test]
fn test_registry_keeps_order() {
    let fault = FaultState::new();
    let mut registry = Registry::new(&fault);
    registry.register("trace", &noop, "trace control");
    registry.register("cst", &noop, "cellular service task");

    let names: Vec<&str> = registry.names().collect();
    assert_eq!(names, ["help", "trace", "cst"]);
}

#[test]
fn test_first_registered_match_wins() {
    let fault = FaultState::new();
    let first = |_: &str, out: &mut dyn Write| -> Result<(), ConsoleError> {
        let _ = out.write_str("foo ran");
        Ok(())
    };
    let second = |_: &str, out: &mut dyn Write| -> Result<(), ConsoleError> {
        let _ = out.write_str("foobar ran");
        Ok(())
    };

    let mut registry = Registry::new(&fault);
    registry.register("foo", &first, "first");
    registry.register("foobar", &second, "second");

    // "foo" abbreviates both names
    assert_eq!(registry.find("foo").unwrap().name, "foo");
    // only "foobar" is abbreviated by "foob"
    assert_eq!(registry.find("foob").unwrap().name, "foobar");
    assert!(registry.find("foobarz").is_none());
    assert!(registry.find("").is_none());

    let mut output = TestOutput::new();
    if let Action::Handler(h) = registry.find("fo").unwrap().action {
        h.handle("fo", &mut output).unwrap();
    }
    assert_eq!(output.as_str(), "foo ran");
}

#[test]
fn test_registry_full_raises_fatal_fault() {
    let fault = FaultState::new();
    let mut registry = Registry::new(&fault);

    for _ in 1..MAX_COMMANDS {
        registry.register("cmd", &noop, "filler");
    }
    assert!(registry.is_full());
    assert!(!fault.is_active());

    registry.register("extra", &noop, "one too many");

    assert_eq!(registry.len(), MAX_COMMANDS);
    assert!(registry.find("extra").is_none());
    assert!(fault.is_fatal());
    assert_eq!(fault.code(), FaultCode::RegistryFull);
    assert_eq!(fault.severity(), Severity::Fatal);
}

#[test]
fn test_help_lists_commands_aligned() {
    let fault = FaultState::new();
    let mut registry = Registry::new(&fault);
    registry.register("stats", &noop, "console and system statistics");

    let mut output = TestOutput::new();
    print_help(&registry, &mut output);

    assert!(output.as_str().starts_with("***** help *****\r\n"));
    assert!(output.contains("\r\nList of commands\r\n----------------\r\n"));

    let help_line = format!("{:<w$} help command\r\n", "help", w = ALIGN_COLUMN);
    assert!(output.contains(&help_line));
    let stats_line = format!("{:<w$} console and system statistics\r\n", "stats", w = ALIGN_COLUMN);
    assert!(output.contains(&stats_line));
    assert!(output.contains("return key: last command re-execution\r\n"));
    assert!(output.contains("#: comment line\r\n"));

    let help_pos = output.as_str().find("help command").unwrap();
    let stats_pos = output.as_str().find("console and system").unwrap();
    assert!(help_pos < stats_pos, "registration order");
}

#[test]
fn test_long_name_is_not_truncated() {
    let fault = FaultState::new();
    let mut registry = Registry::new(&fault);
    registry.register("averyveryverylongname", &noop, "desc");

    let mut output = TestOutput::new();
    print_help(&registry, &mut output);
    assert!(output.contains("averyveryverylongname desc\r\n"));
}

#[test]
fn test_component_help_banner() {
    let mut output = TestOutput::new();
    print_component_help(&mut output, "Trace");
    assert_eq!(output.as_str(), "***** Trace help *****\r\n");
}

#[test]
fn test_handler_trait_object() {
    struct Echo;
    impl CommandHandler for Echo {
        fn handle(&self, line: &str, out: &mut dyn Write) -> Result<(), ConsoleError> {
            write!(out, "echo:{}", line).map_err(|_| ConsoleError::InvalidValue)
        }
    }

    let fault = FaultState::new();
    let echo = Echo;
    let mut registry = Registry::new(&fault);
    registry.register("echo", &echo, "repeat the line");

    let mut output = TestOutput::new();
    match registry.find("ec").unwrap().action {
        Action::Handler(h) => h.handle("ec hi", &mut output).unwrap(),
        _ => panic!("expected a contributed handler"),
    }
    assert_eq!(output.as_str(), "echo:ec hi");
}

//! `stats` command: console and system statistics.
//!
//! A regular command contributor; it registers like any other module.

use core::fmt::Write;

use crate::console::{
    abbreviates, parse_line, print_component_help, ConsoleError, ConsoleState, CommandHandler,
    HandoffSignal, Source,
};
use crate::fault::FaultState;
use crate::logging::LogStream;

/// Command name.
pub const STATS_LABEL: &str = "stats";

/// Help description.
pub const STATS_DESCRIPTION: &str = "console and system statistics";

/// Statistics reporter.
pub struct Stats<'a, S> {
    state: &'a ConsoleState<S>,
    fault: &'a FaultState,
    logs: [&'a LogStream; 2],
}

impl<'a, S: HandoffSignal> Stats<'a, S> {
    pub fn new(state: &'a ConsoleState<S>, fault: &'a FaultState) -> Self {
        Self {
            state,
            fault,
            logs: [&crate::RX_LOG_STREAM, &crate::CONSOLE_LOG_STREAM],
        }
    }

    fn help(&self, out: &mut dyn Write) {
        print_component_help(out, "Statistics");
        let _ = writeln!(out, "{} [rx|fault|heap]  (no parameter: overview)", STATS_LABEL);
        let _ = writeln!(out, "{} help", STATS_LABEL);
    }

    fn rx(&self, out: &mut dyn Write) {
        for source in [Source::Console, Source::Link] {
            let rx = self.state.receiver(source);
            let _ = writeln!(
                out,
                "{:?}: {} lines, {} forced, {} pending",
                source,
                rx.completed_count(),
                rx.forced_count(),
                rx.pending_len()
            );
        }
        let dropped: u32 = self.logs.iter().map(|s| s.dropped()).sum();
        let _ = writeln!(out, "log dropped: {}", dropped);
    }

    fn fault(&self, out: &mut dyn Write) {
        let f = self.fault.snapshot();
        if f.active {
            let _ = writeln!(out, "fault: {:?} ({:?}) data={}", f.code, f.severity, f.data);
        } else {
            let _ = writeln!(out, "fault: none");
        }
        let _ = writeln!(out, "faults since boot: {}", f.count);
    }

    fn heap(&self, out: &mut dyn Write) {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: read-only heap statistics
            let free = unsafe { esp_idf_svc::sys::esp_get_free_heap_size() };
            let min = unsafe { esp_idf_svc::sys::esp_get_minimum_free_heap_size() };

            let _ = writeln!(out, "heap free: {} bytes", free);
            let _ = writeln!(out, "heap min:  {} bytes", min);
        }

        #[cfg(not(target_os = "espidf"))]
        {
            let _ = writeln!(out, "stats heap: running on host");
        }
    }

    fn overview(&self, out: &mut dyn Write) {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: esp_timer_get_time is always safe to call
            let uptime_us = unsafe { esp_idf_svc::sys::esp_timer_get_time() };
            let _ = writeln!(out, "uptime: {}s", uptime_us / 1_000_000);
        }

        self.rx(out);
        self.fault(out);
        self.heap(out);
    }
}

impl<S: HandoffSignal> CommandHandler for Stats<'_, S> {
    fn handle(&self, line: &str, out: &mut dyn Write) -> Result<(), ConsoleError> {
        let cmd = parse_line(line);

        match cmd.arg(0) {
            None => self.overview(out),
            Some(a) if abbreviates(a, "rx") => self.rx(out),
            Some(a) if abbreviates(a, "fault") => self.fault(out),
            Some(a) if abbreviates(a, "heap") => self.heap(out),
            Some(a) if abbreviates(a, "help") => self.help(out),
            Some(a) => {
                let _ = writeln!(out, "stats: unrecognised parameter \"{}\". Usage:", a);
                self.help(out);
                return Err(ConsoleError::InvalidValue);
            }
        }

        Ok(())
    }
}

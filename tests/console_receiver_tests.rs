//! Receive path tests: byte assembly and hand-off

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use cell_console::config::LINE_SIZE;
use cell_console::console::{
    CondvarSignal, ConsoleState, HandoffSignal, LineBuffer, RxEvent, Source, SpinSignal,
};

fn feed_str<S: HandoffSignal>(state: &ConsoleState<S>, s: &str) {
    for b in s.bytes() {
        state.feed_byte(b);
    }
}

fn take(state: &ConsoleState<SpinSignal>) -> Option<String> {
    let mut line = LineBuffer::new();
    state.try_take_line(&mut line).map(|_| line.as_str().to_string())
}

#[test]
fn test_cr_completes_line() {
    let state = ConsoleState::new(SpinSignal::new());
    feed_str(&state, "help");
    assert_eq!(take(&state), None);

    assert_eq!(state.feed_byte(b'\r'), RxEvent::Completed { len: 4, forced: false });
    assert_eq!(take(&state).as_deref(), Some("help"));
}

#[test]
fn test_line_feed_ignored_on_console() {
    let state = ConsoleState::new(SpinSignal::new());
    assert_eq!(state.feed_byte(b'\n'), RxEvent::Ignored);

    feed_str(&state, "he\nlp\r\n");
    assert_eq!(take(&state).as_deref(), Some("help"));
    assert_eq!(state.receiver(Source::Console).pending_len(), 0);
}

#[test]
fn test_backspace_erases() {
    let state = ConsoleState::new(SpinSignal::new());
    feed_str(&state, "hx\x08elp\r");
    assert_eq!(take(&state).as_deref(), Some("help"));
}

#[test]
fn test_backspace_on_empty_line() {
    let state = ConsoleState::new(SpinSignal::new());
    assert_eq!(state.feed_byte(0x08), RxEvent::Erased);
    feed_str(&state, "\x08\x08ok\r");
    assert_eq!(take(&state).as_deref(), Some("ok"));
}

#[test]
fn test_empty_line_completes() {
    let state = ConsoleState::new(SpinSignal::new());
    state.feed_byte(b'\r');
    assert_eq!(take(&state).as_deref(), Some(""));
}

#[test]
fn test_forced_completion_at_capacity() {
    let state = ConsoleState::new(SpinSignal::new());
    let mut last = RxEvent::Stored;
    for _ in 0..LINE_SIZE {
        last = state.feed_byte(b'a');
    }

    assert_eq!(last, RxEvent::Completed { len: LINE_SIZE - 1, forced: true });
    assert_eq!(take(&state), Some("a".repeat(LINE_SIZE - 1)));

    let rx = state.receiver(Source::Console);
    assert_eq!(rx.forced_count(), 1);
    assert_eq!(rx.pending_len(), 0, "the completing byte is not stored");
}

#[test]
fn test_byte_after_forced_line_starts_next() {
    let state = ConsoleState::new(SpinSignal::new());
    for _ in 0..LINE_SIZE + 1 {
        state.feed_byte(b'a');
    }
    assert_eq!(state.receiver(Source::Console).pending_len(), 1);
}

#[test]
fn test_cr_at_capacity_is_not_forced() {
    let state = ConsoleState::new(SpinSignal::new());
    for _ in 0..LINE_SIZE - 1 {
        state.feed_byte(b'b');
    }
    assert_eq!(
        state.feed_byte(b'\r'),
        RxEvent::Completed { len: LINE_SIZE - 1, forced: false }
    );
}

#[test]
fn test_burst_collapses_to_latest_line() {
    let state = ConsoleState::new(SpinSignal::new());
    feed_str(&state, "one\rtwo\r");

    assert_eq!(take(&state).as_deref(), Some("two"));
    assert_eq!(take(&state), None, "one token for two lines");
    assert_eq!(state.receiver(Source::Console).completed_count(), 2);
}

#[test]
fn test_link_line_reports_source() {
    let state = ConsoleState::new(SpinSignal::new());
    for b in b"+CSQ: 20,99\r" {
        state.feed_link_byte(*b);
    }

    let mut line = LineBuffer::new();
    assert_eq!(state.try_take_line(&mut line), Some(Source::Link));
    assert_eq!(line.as_str(), "+CSQ: 20,99");
}

#[test]
fn test_threaded_lines_arrive_in_order() {
    let state = Arc::new(ConsoleState::new(CondvarSignal::new()));
    let (ack_tx, ack_rx) = mpsc::channel::<()>();

    let producer = {
        let state = Arc::clone(&state);
        thread::spawn(move || {
            for i in 0..20 {
                feed_str(&*state, &format!("cmd{}\r", i));
                // wait for the consumer before completing the next line
                ack_rx.recv().unwrap();
            }
        })
    };

    let mut line = LineBuffer::new();
    for i in 0..20 {
        assert_eq!(state.take_line(&mut line), Source::Console);
        assert_eq!(line.as_str(), format!("cmd{}", i));
        ack_tx.send(()).unwrap();
    }

    producer.join().unwrap();
    assert!(!state.signal().try_acquire());
}

/// Completes a second line right after the first token is taken.
struct LateLineSignal {
    inner: SpinSignal,
    armed: AtomicBool,
}

impl HandoffSignal for LateLineSignal {
    fn release(&self) {
        self.inner.release();
    }

    fn acquire(&self) {
        while !self.try_acquire() {
            core::hint::spin_loop();
        }
    }

    fn try_acquire(&self) -> bool {
        let taken = self.inner.try_acquire();
        if taken && self.armed.swap(false, Ordering::SeqCst) {
            feed_str(&LATE_STATE, "two\r");
        }
        taken
    }
}

static LATE_STATE: ConsoleState<LateLineSignal> = ConsoleState::new(LateLineSignal {
    inner: SpinSignal::new(),
    armed: AtomicBool::new(false),
});

#[test]
fn test_line_completed_during_take_is_handed_out_once() {
    feed_str(&LATE_STATE, "one\r");
    LATE_STATE.signal().armed.store(true, Ordering::SeqCst);

    let mut line = LineBuffer::new();
    assert_eq!(LATE_STATE.try_take_line(&mut line), Some(Source::Console));
    assert_eq!(line.as_str(), "two");

    assert_eq!(LATE_STATE.try_take_line(&mut line), None, "no second copy of \"two\"");
    assert_eq!(LATE_STATE.receiver(Source::Console).completed_count(), 2);
}

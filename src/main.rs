//! CellConsole - Main entry point
//!
//! 1. Build the shared console state
//! 2. Start the receive tasks (console UART, link UART)
//! 3. Start the console thread; contributors register before it loops
//! 4. Drain logs in the background

use std::thread;
use std::time::Duration;

use cell_console::console::{Console, ConsoleState, HandoffSignal};
use cell_console::diag::{Stats, STATS_DESCRIPTION, STATS_LABEL};
use cell_console::hal::{LinkPort, Platform};
use cell_console::{log_drain, FaultCode, Severity, FAULT_STATE};

/// Console thread stack, in bytes.
const CONSOLE_STACK_SIZE: usize = 8 * 1024;

/// Log drain period.
const LOG_DRAIN_PERIOD: Duration = Duration::from_millis(200);

/// `fmt::Write` adapter over an `io::Write` sink.
struct IoSink<W>(W);

impl<W: std::io::Write> core::fmt::Write for IoSink<W> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        self.0
            .write_all(s.as_bytes())
            .and_then(|_| self.0.flush())
            .map_err(|_| core::fmt::Error)
    }
}

/// Start the console thread. Registration happens inside, before the loop.
fn spawn_console<S, P, O>(
    state: &'static ConsoleState<S>,
    mut platform: P,
    mut out: O,
    link: Option<Box<dyn LinkPort + Send>>,
) where
    S: HandoffSignal + Sync + 'static,
    P: Platform + Send + 'static,
    O: core::fmt::Write + Send + 'static,
{
    let spawned = thread::Builder::new()
        .name("console".into())
        .stack_size(CONSOLE_STACK_SIZE)
        .spawn(move || {
            let stats = Stats::new(state, &FAULT_STATE);
            let mut link = link;

            let mut console = Console::new(state, &FAULT_STATE);
            console.register(STATS_LABEL, &stats, STATS_DESCRIPTION);
            if let Some(port) = link.as_deref_mut() {
                console.attach_link(port);
            }

            if console.halted_by_fault(&mut out) {
                return;
            }

            console.print_banner(&mut out);
            console.run(&mut platform, &mut out)
        });

    if spawned.is_err() {
        FAULT_STATE.set(FaultCode::ConsoleStart, Severity::Fatal, 0);
    }
}

/// Drain both log streams forever.
fn spawn_log_drain<O>(mut out: O)
where
    O: core::fmt::Write + Send + 'static,
{
    let _ = thread::Builder::new().name("log".into()).spawn(move || loop {
        log_drain::drain_globals(&mut out);
        thread::sleep(LOG_DRAIN_PERIOD);
    });
}

#[cfg(target_os = "espidf")]
fn main() {
    use cell_console::config::UartConfig;
    use cell_console::console::FreeRtosSemaphore;
    use cell_console::hal::{EspLinkPort, EspPlatform};
    use esp_idf_svc::hal::delay::BLOCK;
    use esp_idf_svc::hal::gpio::AnyIOPin;
    use esp_idf_svc::hal::peripherals::Peripherals;
    use esp_idf_svc::hal::peripheral::Peripheral;
    use esp_idf_svc::hal::uart::{self, UartDriver, UartRxDriver, UartTxDriver};
    use esp_idf_svc::hal::units::Hertz;
    use esp_idf_svc::sys::EspError;

    fn open<U: uart::Uart>(
        uart: impl Peripheral<P = U> + 'static,
        cfg: UartConfig,
    ) -> Result<(UartTxDriver<'static>, UartRxDriver<'static>), EspError> {
        let config = uart::config::Config::default().baudrate(Hertz(cfg.baud_rate));
        // SAFETY: pin numbers come from the board configuration and are not
        // claimed anywhere else
        let (tx, rx) = unsafe { (AnyIOPin::new(cfg.tx_pin as i32), AnyIOPin::new(cfg.rx_pin as i32)) };
        let driver = UartDriver::new(
            uart,
            tx,
            rx,
            Option::<AnyIOPin>::None,
            Option::<AnyIOPin>::None,
            &config,
        )?;
        Ok(driver.into_split())
    }

    // Initialize ESP-IDF
    esp_idf_svc::sys::link_patches();

    let Some(signal) = FreeRtosSemaphore::new() else {
        FAULT_STATE.set(FaultCode::SignalInit, Severity::Fatal, 0);
        loop {
            thread::sleep(Duration::from_secs(1));
        }
    };
    let state: &'static ConsoleState<FreeRtosSemaphore> =
        Box::leak(Box::new(ConsoleState::new(signal)));

    let peripherals = Peripherals::take().expect("peripherals already taken");

    let (console_tx, console_rx) =
        open(peripherals.uart0, UartConfig::default()).expect("console uart");
    let link = open(peripherals.uart1, UartConfig::link()).ok();

    // Receive tasks: one byte at a time, like the RX interrupt
    fn receive(rx: UartRxDriver<'static>, feed: impl Fn(u8) + Send + 'static) {
        let spawned = thread::Builder::new().stack_size(4096).spawn(move || {
            let mut byte = [0u8; 1];
            loop {
                match rx.read(&mut byte, BLOCK) {
                    Ok(1) => feed(byte[0]),
                    Ok(_) => {}
                    Err(_) => FAULT_STATE.set(FaultCode::RxRearm, Severity::Warning, 0),
                }
            }
        });
        if spawned.is_err() {
            FAULT_STATE.set(FaultCode::RxRearm, Severity::Fatal, 1);
        }
    }

    receive(console_rx, move |b| {
        state.feed_byte(b);
    });

    let link_port = link.map(|(tx, rx)| {
        receive(rx, move |b| {
            state.feed_link_byte(b);
        });
        Box::new(EspLinkPort::new(tx)) as Box<dyn LinkPort + Send>
    });

    spawn_console(state, EspPlatform, UartSink(console_tx), link_port);
    spawn_log_drain(IoSink(std::io::stdout()));

    let mut reported = false;
    loop {
        thread::sleep(Duration::from_secs(1));
        if FAULT_STATE.is_fatal() && !reported {
            println!("fatal fault: {:?}", FAULT_STATE.snapshot());
            reported = true;
        }
    }
}

/// Console output over the console UART transmitter.
#[cfg(target_os = "espidf")]
struct UartSink(esp_idf_svc::hal::uart::UartTxDriver<'static>);

#[cfg(target_os = "espidf")]
impl core::fmt::Write for UartSink {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        self.0.write(s.as_bytes()).map(|_| ()).map_err(|_| core::fmt::Error)
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    use std::io::Read;

    use cell_console::console::CondvarSignal;
    use cell_console::hal::{HostPlatform, WriteLinkPort};

    static STATE: ConsoleState<CondvarSignal> = ConsoleState::new(CondvarSignal::new());

    // Terminal stdin delivers LF on Enter; the console UART expects CR
    let _ = thread::Builder::new().name("rx".into()).spawn(|| {
        for byte in std::io::stdin().bytes() {
            match byte {
                Ok(b'\n') => STATE.feed_byte(b'\r'),
                Ok(b) => STATE.feed_byte(b),
                Err(_) => break,
            };
        }
    });

    // Link traffic goes to stderr on the host
    let link = Box::new(WriteLinkPort::new(std::io::stderr())) as Box<dyn LinkPort + Send>;

    spawn_console(&STATE, HostPlatform, IoSink(std::io::stdout()), Some(link));
    spawn_log_drain(IoSink(std::io::stderr()));

    loop {
        thread::sleep(Duration::from_secs(1));
        if FAULT_STATE.is_fatal() {
            eprintln!("fatal fault: {:?}", FAULT_STATE.snapshot());
            std::process::exit(1);
        }
    }
}

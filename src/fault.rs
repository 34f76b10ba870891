//! Shared error facility for CellConsole.
//!
//! Misconfiguration and platform failures land here instead of being
//! returned to the caller. The application checks the state after start-up
//! and decides whether to halt.
//!
//! A fault never blocks and never allocates, so it can be raised from the
//! receive interrupt as well as from the console thread.

use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

/// Fault codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum FaultCode {
    /// No fault (normal operation).
    None = 0,

    /// Command table full: a registration was refused.
    RegistryFull = 1,

    /// The console consumer thread could not be started.
    ConsoleStart = 2,

    /// Byte reception could not be re-armed after a character.
    RxRearm = 3,

    /// The hand-off primitive could not be created.
    SignalInit = 4,
}

impl FaultCode {
    /// Convert from raw u8 value.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => FaultCode::RegistryFull,
            2 => FaultCode::ConsoleStart,
            3 => FaultCode::RxRearm,
            4 => FaultCode::SignalInit,
            _ => FaultCode::None,
        }
    }
}

/// How bad a fault is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Severity {
    Warning = 0,
    Fatal = 1,
}

impl Severity {
    fn from_u8(value: u8) -> Self {
        if value == Severity::Fatal as u8 {
            Severity::Fatal
        } else {
            Severity::Warning
        }
    }
}

/// Thread-safe fault state.
///
/// # Usage
///
/// ```ignore
/// static FAULT: FaultState = FaultState::new();
///
/// // In a module start-up call:
/// FAULT.set(FaultCode::RegistryFull, Severity::Fatal, count);
///
/// // After start-up:
/// if FAULT.is_fatal() {
///     halt();
/// }
/// ```
pub struct FaultState {
    /// True if fault is active.
    active: AtomicBool,

    /// Fault code (reason for fault).
    code: AtomicU8,

    /// Severity of the last fault.
    severity: AtomicU8,

    /// Additional data (e.g. entry count at overflow).
    data: AtomicU32,

    /// Total fault count since boot (never cleared).
    count: AtomicU32,
}

impl FaultState {
    /// Create new fault state (no fault).
    pub const fn new() -> Self {
        Self {
            active: AtomicBool::new(false),
            code: AtomicU8::new(0),
            severity: AtomicU8::new(0),
            data: AtomicU32::new(0),
            count: AtomicU32::new(0),
        }
    }

    /// Raise a fault.
    ///
    /// A warning never downgrades an active fatal fault.
    #[inline]
    pub fn set(&self, code: FaultCode, severity: Severity, data: u32) {
        self.count.fetch_add(1, Ordering::Relaxed);
        if self.is_fatal() && severity < Severity::Fatal {
            return;
        }
        self.code.store(code as u8, Ordering::Release);
        self.severity.store(severity as u8, Ordering::Release);
        self.data.store(data, Ordering::Release);
        self.active.store(true, Ordering::Release);
    }

    /// Check if fault is currently active.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Check if the active fault is fatal.
    #[inline]
    pub fn is_fatal(&self) -> bool {
        self.is_active() && self.severity() == Severity::Fatal
    }

    /// Get fault code (only meaningful if `is_active()` is true).
    #[inline]
    pub fn code(&self) -> FaultCode {
        FaultCode::from_u8(self.code.load(Ordering::Acquire))
    }

    /// Get fault severity.
    #[inline]
    pub fn severity(&self) -> Severity {
        Severity::from_u8(self.severity.load(Ordering::Acquire))
    }

    /// Get fault data (meaning depends on fault code).
    #[inline]
    pub fn data(&self) -> u32 {
        self.data.load(Ordering::Acquire)
    }

    /// Get total fault count since boot.
    #[inline]
    pub fn count(&self) -> u32 {
        self.count.load(Ordering::Relaxed)
    }

    /// Clear fault state.
    ///
    /// Note: This clears the active flag but does NOT reset the counter.
    #[inline]
    pub fn clear(&self) {
        self.active.store(false, Ordering::Release);
    }

    /// Get a snapshot of the current fault state.
    #[inline]
    pub fn snapshot(&self) -> FaultSnapshot {
        FaultSnapshot {
            active: self.is_active(),
            code: self.code(),
            severity: self.severity(),
            data: self.data(),
            count: self.count(),
        }
    }
}

impl Default for FaultState {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of fault state at a point in time.
#[derive(Clone, Copy, Debug)]
pub struct FaultSnapshot {
    pub active: bool,
    pub code: FaultCode,
    pub severity: Severity,
    pub data: u32,
    pub count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_state_basic() {
        let fault = FaultState::new();

        assert!(!fault.is_active());
        assert_eq!(fault.code(), FaultCode::None);
        assert_eq!(fault.count(), 0);

        fault.set(FaultCode::RegistryFull, Severity::Fatal, 22);

        assert!(fault.is_active());
        assert!(fault.is_fatal());
        assert_eq!(fault.code(), FaultCode::RegistryFull);
        assert_eq!(fault.data(), 22);
        assert_eq!(fault.count(), 1);

        fault.clear();

        assert!(!fault.is_active());
        assert_eq!(fault.count(), 1); // Count preserved
    }

    #[test]
    fn test_warning_does_not_mask_fatal() {
        let fault = FaultState::new();

        fault.set(FaultCode::RegistryFull, Severity::Fatal, 22);
        fault.set(FaultCode::RxRearm, Severity::Warning, 0);

        assert_eq!(fault.code(), FaultCode::RegistryFull);
        assert!(fault.is_fatal());
        assert_eq!(fault.count(), 2);
    }

    #[test]
    fn test_warning_is_not_fatal() {
        let fault = FaultState::new();

        fault.set(FaultCode::RxRearm, Severity::Warning, 3);

        assert!(fault.is_active());
        assert!(!fault.is_fatal());
        assert_eq!(fault.snapshot().severity, Severity::Warning);
    }
}

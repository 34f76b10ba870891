//! Line hand-off signal
//!
//! Binary semaphore semantics: one token at most. Releasing an already
//! released signal is a no-op, so a burst of completed lines wakes the
//! console once and it reads the most recent one.

use core::sync::atomic::{AtomicBool, Ordering};

/// Producer → consumer wake-up.
pub trait HandoffSignal {
    /// Make the token available. Never blocks; saturates at one token.
    fn release(&self);

    /// Block until the token is available, then take it.
    fn acquire(&self);

    /// Take the token if available.
    fn try_acquire(&self) -> bool;
}

/// Spinning signal built on a single atomic flag.
///
/// Needs nothing from the platform. Suitable when the console task has a
/// core of its own or when polled through `try_acquire`.
pub struct SpinSignal {
    token: AtomicBool,
}

impl SpinSignal {
    pub const fn new() -> Self {
        Self {
            token: AtomicBool::new(false),
        }
    }
}

impl Default for SpinSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl HandoffSignal for SpinSignal {
    #[inline]
    fn release(&self) {
        self.token.store(true, Ordering::Release);
    }

    fn acquire(&self) {
        while !self.try_acquire() {
            core::hint::spin_loop();
        }
    }

    #[inline]
    fn try_acquire(&self) -> bool {
        self.token.swap(false, Ordering::Acquire)
    }
}

#[cfg(feature = "std")]
pub use self::condvar::CondvarSignal;

#[cfg(feature = "std")]
mod condvar {
    use super::HandoffSignal;
    use std::sync::{Condvar, Mutex, MutexGuard};

    /// Blocking signal for hosted builds (mutex + condition variable).
    pub struct CondvarSignal {
        token: Mutex<bool>,
        ready: Condvar,
    }

    impl CondvarSignal {
        pub const fn new() -> Self {
            Self {
                token: Mutex::new(false),
                ready: Condvar::new(),
            }
        }

        fn lock(&self) -> MutexGuard<'_, bool> {
            // A panicking holder cannot leave the flag half-written
            self.token.lock().unwrap_or_else(|e| e.into_inner())
        }
    }

    impl Default for CondvarSignal {
        fn default() -> Self {
            Self::new()
        }
    }

    impl HandoffSignal for CondvarSignal {
        fn release(&self) {
            *self.lock() = true;
            self.ready.notify_one();
        }

        fn acquire(&self) {
            let mut token = self.lock();
            while !*token {
                token = self.ready.wait(token).unwrap_or_else(|e| e.into_inner());
            }
            *token = false;
        }

        fn try_acquire(&self) -> bool {
            core::mem::replace(&mut *self.lock(), false)
        }
    }
}

#[cfg(target_os = "espidf")]
pub use self::freertos::FreeRtosSemaphore;

#[cfg(target_os = "espidf")]
mod freertos {
    use super::HandoffSignal;
    use esp_idf_svc::sys;

    // FreeRTOS macros that bindgen does not expand
    const QUEUE_TYPE_BINARY_SEMAPHORE: u8 = 3;
    const QUEUE_SEND_TO_BACK: sys::BaseType_t = 0;
    const PORT_MAX_DELAY: sys::TickType_t = sys::TickType_t::MAX;
    const PD_TRUE: sys::BaseType_t = 1;

    /// FreeRTOS binary semaphore.
    pub struct FreeRtosSemaphore {
        handle: sys::QueueHandle_t,
    }

    // SAFETY: FreeRTOS queue handles are usable from any task or ISR.
    unsafe impl Send for FreeRtosSemaphore {}
    unsafe impl Sync for FreeRtosSemaphore {}

    impl FreeRtosSemaphore {
        /// Create an empty semaphore. `None` if the kernel is out of memory.
        pub fn new() -> Option<Self> {
            // SAFETY: plain kernel object creation
            let handle = unsafe { sys::xQueueGenericCreate(1, 0, QUEUE_TYPE_BINARY_SEMAPHORE) };
            if handle.is_null() {
                None
            } else {
                Some(Self { handle })
            }
        }
    }

    impl HandoffSignal for FreeRtosSemaphore {
        fn release(&self) {
            // SAFETY: handle is a valid binary semaphore; a full semaphore
            // rejects the give, which is the saturating behavior we want
            unsafe {
                sys::xQueueGenericSend(self.handle, core::ptr::null(), 0, QUEUE_SEND_TO_BACK);
            }
        }

        fn acquire(&self) {
            // SAFETY: handle is a valid binary semaphore
            while unsafe { sys::xQueueSemaphoreTake(self.handle, PORT_MAX_DELAY) } != PD_TRUE {}
        }

        fn try_acquire(&self) -> bool {
            // SAFETY: handle is a valid binary semaphore
            unsafe { sys::xQueueSemaphoreTake(self.handle, 0) == PD_TRUE }
        }
    }
}

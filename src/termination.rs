use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Records whether the user asked to stop by pressing Ctrl-C. A run in progress is not
/// interrupted by it; callers check the flag between runs.
pub struct Interrupt {
    received: Arc<AtomicBool>,
    is_registered: bool,
}

impl Interrupt {
    /// Register the signal listener. In case registering fails, the interrupt is never reported
    /// as requested.
    pub fn register() -> Interrupt {
        let received = Arc::new(AtomicBool::new(false));

        let result = signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&received));
        if let Err(e) = &result {
            log::warn!("failed to register the interrupt handler: {e}");
        }

        Interrupt {
            received,
            is_registered: result.is_ok(),
        }
    }

    pub fn is_requested(&self) -> bool {
        self.is_registered && self.received.load(Ordering::Relaxed)
    }
}

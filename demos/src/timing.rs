use std::time::Instant;

use tracing::info;

/// Logs its own lifetime in nanoseconds at `info` level when dropped.
///
/// RAII stand-in for a `LogDuration`-style profiling guard: construct at the
/// top of a scope, let the destructor report elapsed time regardless of how
/// the scope exits.
pub struct ScopedTimer {
    label: &'static str,
    started: Instant,
    print_on_drop: bool,
}

impl ScopedTimer {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            started: Instant::now(),
            print_on_drop: true,
        }
    }

    /// A timer that only the caller reads via [`elapsed_nanos`](Self::elapsed_nanos),
    /// never logging on drop.
    pub fn silent(label: &'static str) -> Self {
        Self {
            label,
            started: Instant::now(),
            print_on_drop: false,
        }
    }

    pub fn elapsed_nanos(&self) -> u128 {
        self.started.elapsed().as_nanos()
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        if self.print_on_drop {
            info!(label = self.label, nanos = self.elapsed_nanos(), "scoped timer finished");
        }
    }
}

use core::cell::Cell;
use core::fmt;

/// The maximum exponent of spin count.
const SPIN_LIMIT: u32 = 6;

// -----------------------------------------------------------------------------
// Backoff

/// Exponential backoff for compare-and-swap retry loops.
///
/// A failed CAS means another thread made progress, so retrying at once only
/// adds contention on the same cache line. Each [`spin`] doubles the number
/// of `PAUSE` hints, up to `2^6`.
///
/// The state lives in a [`Cell`], so a `Backoff` is meant to be a local of
/// the retry loop and is neither `Sync` nor shared.
///
/// # Examples
///
/// ```
/// use vc_os::sync::atomic::{AtomicUsize, Ordering};
/// use vc_os::utils::Backoff;
///
/// fn fetch_double(a: &AtomicUsize) -> usize {
///     let backoff = Backoff::new();
///     let mut current = a.load(Ordering::Relaxed);
///     loop {
///         match a.compare_exchange_weak(current, current * 2, Ordering::AcqRel, Ordering::Relaxed) {
///             Ok(prev) => return prev,
///             Err(actual) => {
///                 current = actual;
///                 backoff.spin();
///             }
///         }
///     }
/// }
///
/// let a = AtomicUsize::new(3);
/// assert_eq!(fetch_double(&a), 3);
/// assert_eq!(a.load(Ordering::Relaxed), 6);
/// ```
///
/// [`spin`]: Backoff::spin
pub struct Backoff {
    step: Cell<u32>,
}

impl Backoff {
    /// Creates a new `Backoff` at step zero.
    #[inline(always)]
    pub const fn new() -> Self {
        Self { step: Cell::new(0) }
    }

    /// Backs off after a lost race in a lock-free loop.
    #[inline]
    pub fn spin(&self) {
        let step = self.step.get().min(SPIN_LIMIT);
        for _ in 0..(1_u32 << step) {
            core::hint::spin_loop();
        }

        if self.step.get() <= SPIN_LIMIT {
            self.step.set(self.step.get() + 1);
        }
    }
}

impl fmt::Debug for Backoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backoff")
            .field("step", &self.step.get())
            .finish()
    }
}

impl Default for Backoff {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{Backoff, SPIN_LIMIT};

    #[test]
    fn spin_is_capped() {
        let backoff = Backoff::new();
        backoff.spin();
        assert_eq!(backoff.step.get(), 1);

        for _ in 0..64 {
            backoff.spin();
        }
        assert_eq!(backoff.step.get(), SPIN_LIMIT + 1);
    }
}

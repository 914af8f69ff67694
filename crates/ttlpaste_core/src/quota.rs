//! Bookkeeping of stored bytes against a fixed maximum.

use crate::size::ByteSize;

/// Running total of stored bytes and the configured ceiling.
///
/// The tracker is not synchronized itself; the store keeps it behind the
/// same lock as the index so the total always matches the indexed sizes.
#[derive(Debug, Clone)]
pub struct Quota {
    used: u64,
    max: u64,
}

impl Quota {
    /// Create an empty tracker with a fixed maximum.
    pub fn new(max: ByteSize) -> Self {
        Self {
            used: 0,
            max: max.as_u64(),
        }
    }

    /// Whether `size` more bytes would keep the total at or below the maximum.
    pub fn has_space_for(&self, size: u64) -> bool {
        self.used
            .checked_add(size)
            .is_some_and(|total| total <= self.max)
    }

    /// Account for `size` newly admitted bytes.
    ///
    /// # Panics
    /// Panics if the reservation does not fit; callers check
    /// [`Quota::has_space_for`] under the same lock first.
    pub fn reserve(&mut self, size: u64) {
        assert!(
            self.has_space_for(size),
            "quota reservation of {} exceeds remaining space ({} of {} used)",
            size,
            self.used,
            self.max
        );
        self.used += size;
    }

    /// Return `size` bytes from a removed entry.
    ///
    /// # Panics
    /// Panics if more bytes are released than are currently accounted for.
    pub fn release(&mut self, size: u64) {
        assert!(
            size <= self.used,
            "quota release of {} exceeds accounted total {}",
            size,
            self.used
        );
        self.used -= size;
    }

    /// Bytes currently accounted for.
    pub fn used(&self) -> ByteSize {
        ByteSize(self.used)
    }

    /// Configured maximum.
    pub fn max(&self) -> ByteSize {
        ByteSize(self.max)
    }

    /// Human-readable usage summary.
    pub fn report(&self, entries: usize) -> String {
        let percent = if self.max == 0 {
            0.0
        } else {
            self.used as f64 * 100.0 / self.max as f64
        };
        format!(
            "Have a total of {} pastes using {} out of {} ({:.2}%)",
            entries,
            self.used(),
            self.max(),
            percent
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Quota;
    use crate::size::ByteSize;

    #[test]
    fn admits_up_to_the_maximum() {
        let mut quota = Quota::new(ByteSize(100));
        assert!(quota.has_space_for(100));
        assert!(!quota.has_space_for(101));
        quota.reserve(60);
        assert!(quota.has_space_for(40));
        assert!(!quota.has_space_for(41));
        assert!(!quota.has_space_for(u64::MAX));
    }

    #[test]
    fn release_returns_space() {
        let mut quota = Quota::new(ByteSize(100));
        quota.reserve(100);
        quota.release(30);
        assert_eq!(quota.used(), ByteSize(70));
        assert!(quota.has_space_for(30));
    }

    #[test]
    #[should_panic(expected = "exceeds accounted total")]
    fn over_release_is_an_invariant_violation() {
        let mut quota = Quota::new(ByteSize(100));
        quota.reserve(10);
        quota.release(11);
    }

    #[test]
    fn report_mentions_usage() {
        let mut quota = Quota::new(ByteSize::KB);
        quota.reserve(512);
        assert_eq!(
            quota.report(3),
            "Have a total of 3 pastes using 512B out of 1.00KB (50.00%)"
        );
    }
}

use chrono::Utc;
use parking_lot::Mutex;

/// Bits reserved for the logical counter below the physical milliseconds
pub const LOGICAL_BITS: u32 = 18;

/// Hands out strictly increasing hybrid timestamps: wall-clock milliseconds in
/// the high bits, a logical counter in the low `LOGICAL_BITS` bits.
#[derive(Debug, Default)]
pub struct TimestampOracle {
    last: Mutex<u64>,
}

impl TimestampOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a timestamp greater than every one handed out before
    pub fn next(&self) -> u64 {
        let physical = Utc::now().timestamp_millis().max(0) as u64;
        let candidate = compose(physical, 0);

        let mut last = self.last.lock();
        let ts = if candidate > *last { candidate } else { *last + 1 };
        *last = ts;
        ts
    }

    /// Most recently allocated timestamp, zero before the first allocation
    pub fn current(&self) -> u64 {
        *self.last.lock()
    }
}

pub fn compose(physical_ms: u64, logical: u64) -> u64 {
    (physical_ms << LOGICAL_BITS) | (logical & ((1 << LOGICAL_BITS) - 1))
}

pub fn physical_ms(ts: u64) -> u64 {
    ts >> LOGICAL_BITS
}

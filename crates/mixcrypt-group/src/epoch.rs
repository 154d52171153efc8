//! Key rotation epochs

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Length of one epoch
pub const EPOCH_PERIOD: Duration = Duration::from_secs(5 * 60);

/// `floor(unix_nanos / 5 min)`, truncated to 32 bits.
pub fn epoch_from_unix_nanos(unix_nanos: u128) -> u32 {
    (unix_nanos / EPOCH_PERIOD.as_nanos()) as u32
}

/// Epoch containing `time`. Times before the Unix epoch map to epoch 0.
pub fn compute_epoch(time: SystemTime) -> u32 {
    let since = time.duration_since(UNIX_EPOCH).unwrap_or_default();
    epoch_from_unix_nanos(since.as_nanos())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_boundaries() {
        let period = EPOCH_PERIOD.as_nanos();
        assert_eq!(epoch_from_unix_nanos(0), 0);
        assert_eq!(epoch_from_unix_nanos(period - 1), 0);
        assert_eq!(epoch_from_unix_nanos(period), 1);
        assert_eq!(epoch_from_unix_nanos(10 * period + 5), 10);
    }

    #[test]
    fn test_compute_epoch() {
        let t = UNIX_EPOCH + Duration::from_secs(3600);
        assert_eq!(compute_epoch(t), 12);
        assert_eq!(compute_epoch(UNIX_EPOCH - Duration::from_secs(1)), 0);
    }
}

//! Sized broadcast frame
//!
//! Every broadcast cleartext is wrapped to the full outer payload width so the
//! mix network cannot learn payload lengths:
//!
//! ```text
//! [2 bytes: size (u16 LE)][size bytes: payload][padding: random, ≥ 8 bytes]
//! ```

use rand::{CryptoRng, RngCore};

use mixcrypt_core::{CryptoError, CryptoResult};

use crate::rng::fill_random;

const SIZE_LEN: usize = 2;
const MIN_PADDING: usize = 8;

/// Bytes of every frame not available to the payload
pub const SIZED_OVERHEAD: usize = SIZE_LEN + MIN_PADDING;

/// Largest payload that fits a frame of `outer_len` bytes.
pub fn max_sized_broadcast_payload_size(outer_len: usize) -> usize {
    outer_len.saturating_sub(SIZED_OVERHEAD)
}

/// Wrap `payload` into a frame of exactly `outer_len` bytes.
pub fn new_sized_broadcast<R: RngCore + CryptoRng>(
    outer_len: usize,
    payload: &[u8],
    rng: &mut R,
) -> CryptoResult<Vec<u8>> {
    let max = max_sized_broadcast_payload_size(outer_len).min(usize::from(u16::MAX));
    if payload.len() + SIZED_OVERHEAD > outer_len || payload.len() > max {
        return Err(CryptoError::TooLarge {
            size: payload.len(),
            max,
        });
    }
    let Ok(size) = u16::try_from(payload.len()) else {
        unreachable!("payload length bounded by u16::MAX above");
    };

    let mut frame = Vec::with_capacity(outer_len);
    frame.extend_from_slice(&size.to_le_bytes());
    frame.extend_from_slice(payload);

    let mut padding = vec![0u8; outer_len - frame.len()];
    fill_random(rng, &mut padding)?;
    frame.extend_from_slice(&padding);
    Ok(frame)
}

/// Extract the payload from a sized broadcast frame.
pub fn decode_sized_broadcast(frame: &[u8]) -> CryptoResult<&[u8]> {
    if frame.len() < SIZED_OVERHEAD {
        return Err(CryptoError::SizeOverflow {
            size: frame.len(),
            available: SIZED_OVERHEAD,
        });
    }
    let size = usize::from(u16::from_le_bytes([frame[0], frame[1]]));
    if size + SIZED_OVERHEAD > frame.len() {
        return Err(CryptoError::SizeOverflow {
            size,
            available: max_sized_broadcast_payload_size(frame.len()),
        });
    }
    Ok(&frame[SIZE_LEN..SIZE_LEN + size])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_frame_is_full_width() {
        let mut rng = StdRng::seed_from_u64(1);
        let frame = new_sized_broadcast(509, b"hello", &mut rng).unwrap();
        assert_eq!(frame.len(), 509);
        assert_eq!(&frame[..2], &[5, 0]);
        assert_eq!(decode_sized_broadcast(&frame).unwrap(), b"hello");
    }

    #[test]
    fn test_exact_fit() {
        let mut rng = StdRng::seed_from_u64(2);
        let payload = vec![7u8; max_sized_broadcast_payload_size(100)];
        let frame = new_sized_broadcast(100, &payload, &mut rng).unwrap();
        assert_eq!(decode_sized_broadcast(&frame).unwrap(), payload.as_slice());
    }

    #[test]
    fn test_too_large() {
        let mut rng = StdRng::seed_from_u64(3);
        let result = new_sized_broadcast(100, &[0u8; 91], &mut rng);
        assert!(matches!(result, Err(CryptoError::TooLarge { size: 91, max: 90 })));
    }

    #[test]
    fn test_max_payload_size() {
        assert_eq!(max_sized_broadcast_payload_size(509), 499);
        assert_eq!(max_sized_broadcast_payload_size(4), 0);
    }

    #[test]
    fn test_size_beyond_buffer() {
        let mut frame = vec![0u8; 20];
        frame[0] = 11;
        assert!(matches!(
            decode_sized_broadcast(&frame),
            Err(CryptoError::SizeOverflow { size: 11, .. })
        ));
        frame[0] = 10;
        assert_eq!(decode_sized_broadcast(&frame).unwrap().len(), 10);
    }

    #[test]
    fn test_failing_rng() {
        let result = new_sized_broadcast(64, b"x", &mut crate::rng::testing::FailingRng);
        assert!(matches!(result, Err(CryptoError::Rng(_))));
    }

    proptest! {
        #[test]
        fn short_buffers_overflow(buf in proptest::collection::vec(any::<u8>(), 0..SIZED_OVERHEAD)) {
            let overflowed = matches!(
                decode_sized_broadcast(&buf),
                Err(CryptoError::SizeOverflow { .. })
            );
            prop_assert!(overflowed);
        }

        #[test]
        fn frame_roundtrip(
            outer in 10usize..2048,
            seed in any::<u64>(),
            payload in proptest::collection::vec(any::<u8>(), 0..2048),
        ) {
            let payload = &payload[..payload.len().min(outer - SIZED_OVERHEAD)];
            let mut rng = StdRng::seed_from_u64(seed);
            let frame = new_sized_broadcast(outer, payload, &mut rng).unwrap();
            prop_assert_eq!(frame.len(), outer);
            prop_assert_eq!(decode_sized_broadcast(&frame).unwrap(), payload);
        }
    }
}

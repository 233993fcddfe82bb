//! Small sampling helpers shared by the generators.

use rand::Rng;
use synthtel_protocol::Timestamp;

/// Uniform choice from a non-empty catalog slice.
pub(crate) fn pick<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [T]) -> &'a T {
    &items[rng.gen_range(0..items.len())]
}

/// Lowercase hex string made of `bytes` random bytes.
pub(crate) fn hex_string<R: Rng + ?Sized>(rng: &mut R, bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rng.fill(&mut buf[..]);
    hex::encode(buf)
}

/// `vX.Y.Z` with single-digit components.
pub(crate) fn version_string<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!(
        "v{}.{}.{}",
        rng.gen_range(0..10),
        rng.gen_range(0..10),
        rng.gen_range(0..10)
    )
}

/// Uniform instant in `[now - window, now)`.
pub(crate) fn instant_within<R: Rng + ?Sized>(
    rng: &mut R,
    now: Timestamp,
    window_ms: u64,
) -> Timestamp {
    let offset = (rng.gen::<f64>() * window_ms as f64) as u64;
    Timestamp(now.saturating_sub(window_ms).0 + offset)
}

/// `true` with probability `p`.
pub(crate) fn chance<R: Rng + ?Sized>(rng: &mut R, p: f64) -> bool {
    rng.gen::<f64>() < p
}

//! Shuffle index selection

use rand::Rng;

/// Pick the next index under shuffle
///
/// Uniform over `0..len`, excluding `current` when `len > 1`. A single-track
/// queue replays its only track.
pub fn pick_next<R: Rng + ?Sized>(rng: &mut R, len: usize, current: Option<usize>) -> Option<usize> {
    match (len, current) {
        (0, _) => None,
        (1, _) => Some(0),
        (len, Some(current)) if current < len => {
            // Draw from len - 1 slots and skip over the current one
            let pick = rng.gen_range(0..len - 1);
            Some(if pick >= current { pick + 1 } else { pick })
        }
        (len, _) => Some(rng.gen_range(0..len)),
    }
}

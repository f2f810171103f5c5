//! Track traversal policy for ErfPlayer
//!
//! Pure decision logic for explicit next/previous and for auto-advance:
//! given the current index, the playlist length, and whether shuffle is
//! enabled, pick the next index to play. Shuffled traversal picks a
//! uniformly random index, which may repeat the current one; there is no
//! "avoid immediate repeat" guarantee.

use rand::Rng;

/// Index to play after `current` when moving forward
///
/// Callers must guard against an empty playlist; `count` must be
/// non-zero.
pub fn next_index<R: Rng>(current: usize, count: usize, shuffled: bool, rng: &mut R) -> usize {
    debug_assert!(count > 0);
    if shuffled {
        rng.gen_range(0..count)
    } else {
        (current + 1) % count
    }
}

/// Index to play after `current` when moving backward
///
/// Wraps to the last index when `current` is `0`. Callers must guard
/// against an empty playlist; `count` must be non-zero.
pub fn previous_index<R: Rng>(current: usize, count: usize, shuffled: bool, rng: &mut R) -> usize {
    debug_assert!(count > 0);
    if shuffled {
        rng.gen_range(0..count)
    } else if current == 0 {
        count - 1
    } else {
        current - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_next_wraps_to_start() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(next_index(0, 3, false, &mut rng), 1);
        assert_eq!(next_index(1, 3, false, &mut rng), 2);
        assert_eq!(next_index(2, 3, false, &mut rng), 0);
    }

    #[test]
    fn test_previous_wraps_to_end() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(previous_index(0, 5, false, &mut rng), 4);
        assert_eq!(previous_index(3, 5, false, &mut rng), 2);
    }

    #[test]
    fn test_next_is_cyclic() {
        // Repeating next() count times returns to the starting index
        let mut rng = StdRng::seed_from_u64(0);
        for start in 0..7 {
            let mut index = start;
            for _ in 0..7 {
                index = next_index(index, 7, false, &mut rng);
            }
            assert_eq!(index, start);
        }
    }

    #[test]
    fn test_single_track_playlist() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(next_index(0, 1, false, &mut rng), 0);
        assert_eq!(previous_index(0, 1, false, &mut rng), 0);
    }

    #[test]
    fn test_shuffled_picks_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..1000 {
            assert!(next_index(2, 5, true, &mut rng) < 5);
            assert!(previous_index(2, 5, true, &mut rng) < 5);
        }
    }

    #[test]
    fn test_shuffled_picks_cover_all_indices() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut seen = [false; 5];
        for _ in 0..1000 {
            seen[next_index(0, 5, true, &mut rng)] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }
}

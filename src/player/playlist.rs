//! Playlist management for ErfPlayer
//!
//! A playlist keeps two ordered sequences of track references: the
//! `active` order used for playback and display, and the `original`
//! insertion order used to restore after shuffle is turned off. Every
//! mutating operation applies to both sequences so they always hold the
//! same set of tracks. The playlist has no notion of a "current" track;
//! keeping the session's current index sensible across mutations is the
//! controller's job.

use crate::utils::error::{PlayerError, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use std::path::{Path, PathBuf};

/// Ordered, mutable collection of track references
#[derive(Debug, Default, Clone)]
pub struct Playlist {
    /// The order currently used for playback and display
    active: Vec<PathBuf>,

    /// The order in which tracks were added
    original: Vec<PathBuf>,
}

impl Playlist {
    /// Create an empty playlist
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a track to both sequences
    ///
    /// Duplicates are silently ignored: adding a track that is already
    /// present (by exact path equality) is a no-op.
    ///
    /// # Returns
    ///
    /// `true` if the track was added, `false` if it was already present
    pub fn add(&mut self, track: PathBuf) -> bool {
        if self.active.contains(&track) {
            return false;
        }
        self.original.push(track.clone());
        self.active.push(track);
        true
    }

    /// Remove the track at `index` in the active order
    ///
    /// The corresponding element of the original order is located by
    /// value (first match) so that removal stays correct while shuffled.
    ///
    /// # Returns
    ///
    /// The removed track, or `IndexOutOfRange` if `index` is invalid
    pub fn remove_at(&mut self, index: usize) -> Result<PathBuf> {
        if index >= self.active.len() {
            return Err(PlayerError::IndexOutOfRange {
                index,
                count: self.active.len(),
            });
        }

        let track = self.active.remove(index);
        if let Some(pos) = self.original.iter().position(|t| t == &track) {
            self.original.remove(pos);
        }
        debug_assert_eq!(self.active.len(), self.original.len());
        Ok(track)
    }

    /// Remove all tracks from both sequences
    pub fn clear(&mut self) {
        self.active.clear();
        self.original.clear();
    }

    /// Replace the whole playlist with a new set of tracks
    ///
    /// Both sequences are set to the given order; duplicates are dropped,
    /// keeping the first occurrence.
    pub fn replace_all(&mut self, tracks: Vec<PathBuf>) {
        self.clear();
        for track in tracks {
            self.add(track);
        }
    }

    /// Shuffle the active order into a uniform random permutation
    ///
    /// The original order is untouched.
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        self.active.shuffle(rng);
    }

    /// Reset the active order to a copy of the original order
    pub fn restore_original_order(&mut self) {
        self.active = self.original.clone();
    }

    /// Number of tracks in the playlist
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Whether the playlist holds no tracks
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// The track at `index` in the active order, if any
    pub fn get(&self, index: usize) -> Option<&PathBuf> {
        self.active.get(index)
    }

    /// Position of `track` in the active order, if present
    pub fn index_of(&self, track: &Path) -> Option<usize> {
        self.active.iter().position(|t| t == track)
    }

    /// The active order as a slice
    pub fn tracks(&self) -> &[PathBuf] {
        &self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn track(name: &str) -> PathBuf {
        PathBuf::from(format!("/music/{}.mp3", name))
    }

    fn playlist_of(names: &[&str]) -> Playlist {
        let mut playlist = Playlist::new();
        for name in names {
            assert!(playlist.add(track(name)));
        }
        playlist
    }

    #[test]
    fn test_add_rejects_duplicates() {
        let mut playlist = Playlist::new();
        assert!(playlist.add(track("a")));
        assert!(!playlist.add(track("a")));
        assert_eq!(playlist.len(), 1);
    }

    #[test]
    fn test_remove_at_out_of_range() {
        let mut playlist = playlist_of(&["a", "b"]);
        let err = playlist.remove_at(2).unwrap_err();
        assert!(matches!(
            err,
            PlayerError::IndexOutOfRange { index: 2, count: 2 }
        ));
    }

    #[test]
    fn test_remove_at_keeps_sequences_in_sync() {
        let mut playlist = playlist_of(&["a", "b", "c"]);
        let removed = playlist.remove_at(1).unwrap();
        assert_eq!(removed, track("b"));
        assert_eq!(playlist.len(), 2);
        playlist.restore_original_order();
        assert_eq!(playlist.tracks(), &[track("a"), track("c")]);
    }

    #[test]
    fn test_remove_while_shuffled_removes_by_value() {
        let mut playlist = playlist_of(&["a", "b", "c", "d", "e"]);
        let mut rng = StdRng::seed_from_u64(7);
        playlist.shuffle(&mut rng);

        // Whatever landed at the front of the shuffled order must also
        // disappear from the original order.
        let removed = playlist.remove_at(0).unwrap();
        playlist.restore_original_order();
        assert_eq!(playlist.len(), 4);
        assert!(playlist.index_of(&removed).is_none());
    }

    #[test]
    fn test_shuffle_then_restore_round_trips() {
        let mut playlist = playlist_of(&["a", "b", "c", "d", "e", "f"]);
        let before: Vec<_> = playlist.tracks().to_vec();

        let mut rng = StdRng::seed_from_u64(42);
        playlist.shuffle(&mut rng);
        assert_eq!(playlist.len(), before.len());

        playlist.restore_original_order();
        assert_eq!(playlist.tracks(), before.as_slice());
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        let mut playlist = playlist_of(&["a", "b", "c", "d", "e"]);
        let mut rng = StdRng::seed_from_u64(3);
        playlist.shuffle(&mut rng);

        let mut shuffled: Vec<_> = playlist.tracks().to_vec();
        shuffled.sort();
        let mut expected: Vec<_> = (b'a'..=b'e')
            .map(|c| track(&(c as char).to_string()))
            .collect();
        expected.sort();
        assert_eq!(shuffled, expected);
    }

    #[test]
    fn test_clear() {
        let mut playlist = playlist_of(&["a", "b"]);
        playlist.clear();
        assert!(playlist.is_empty());
        playlist.restore_original_order();
        assert!(playlist.is_empty());
    }

    #[test]
    fn test_replace_all_drops_duplicates() {
        let mut playlist = playlist_of(&["a"]);
        playlist.replace_all(vec![track("x"), track("y"), track("x")]);
        assert_eq!(playlist.tracks(), &[track("x"), track("y")]);
    }

    #[test]
    fn test_index_of() {
        let playlist = playlist_of(&["a", "b", "c"]);
        assert_eq!(playlist.index_of(&track("b")), Some(1));
        assert_eq!(playlist.index_of(&track("z")), None);
    }
}

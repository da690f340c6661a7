//! In-memory reading session
//!
//! [`Library`] keeps the series the user subscribed to, in the order the user
//! arranged them, together with a note and the furthest episode read. Nothing
//! is persisted: the library lives as long as the session.

use crate::models::Series;

/// Where to open a series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingTarget {
    /// The furthest episode read so far
    Continue,
    /// Episode 1
    First,
}

/// Subscribed series in user order, unique by series id
#[derive(Debug, Clone, Default)]
pub struct Library {
    series: Vec<Series>,
}

impl Library {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a series
    ///
    /// Returns `false` and leaves the library unchanged if a series with the
    /// same id is already present.
    pub fn add(&mut self, series: Series) -> bool {
        if self.contains(series.series_id) {
            tracing::debug!(series_id = series.series_id, "Series already in library");
            return false;
        }

        tracing::info!(series_id = series.series_id, title = %series.title, "Added series");
        self.series.push(series);
        true
    }

    /// Remove a series by id
    pub fn remove(&mut self, series_id: u32) -> Option<Series> {
        let position = self.position(series_id)?;
        Some(self.series.remove(position))
    }

    /// Remove the series at the given list positions
    ///
    /// Positions refer to the list before any removal; out-of-range and
    /// repeated positions are ignored. Removed series come back in list order.
    pub fn remove_at(&mut self, offsets: &[usize]) -> Vec<Series> {
        let mut offsets: Vec<usize> = offsets
            .iter()
            .copied()
            .filter(|&i| i < self.series.len())
            .collect();
        offsets.sort_unstable();
        offsets.dedup();

        let mut removed: Vec<Series> = offsets
            .iter()
            .rev()
            .map(|&i| self.series.remove(i))
            .collect();
        removed.reverse();
        removed
    }

    /// Move the series at `from` so it ends up at position `to`
    ///
    /// Returns `false` if either position is out of range.
    pub fn move_series(&mut self, from: usize, to: usize) -> bool {
        let len = self.series.len();
        if from >= len || to >= len {
            return false;
        }

        let series = self.series.remove(from);
        self.series.insert(to, series);
        true
    }

    /// Replace the user's note on a series
    pub fn set_note(&mut self, series_id: u32, note: impl Into<String>) -> bool {
        match self.get_mut(series_id) {
            Some(series) => {
                series.user_note = note.into();
                true
            }
            None => false,
        }
    }

    /// Record that an episode was read; the position never moves backwards
    ///
    /// Returns `true` if the stored position changed.
    pub fn mark_read(&mut self, series_id: u32, episode_index: u32) -> bool {
        let Some(series) = self.get_mut(series_id) else {
            return false;
        };

        let changed = series.mark_read(episode_index);
        if changed {
            tracing::debug!(series_id, episode_index, "Reading position advanced");
        }
        changed
    }

    /// Episode to open for `target`
    ///
    /// `Continue` on a series with nothing read yet opens episode 1.
    pub fn resume_target(&self, series_id: u32, target: ReadingTarget) -> Option<u32> {
        let series = self.get(series_id)?;
        Some(match target {
            ReadingTarget::Continue => series.last_read_episode.max(1),
            ReadingTarget::First => 1,
        })
    }

    pub fn get(&self, series_id: u32) -> Option<&Series> {
        self.series.iter().find(|s| s.series_id == series_id)
    }

    pub fn contains(&self, series_id: u32) -> bool {
        self.position(series_id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Series> {
        self.series.iter()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    fn get_mut(&mut self, series_id: u32) -> Option<&mut Series> {
        self.series.iter_mut().find(|s| s.series_id == series_id)
    }

    fn position(&self, series_id: u32) -> Option<usize> {
        self.series.iter().position(|s| s.series_id == series_id)
    }
}

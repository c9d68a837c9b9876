//! Ordered, grouped collection of timers with a current selection.
//!
//! This module provides:
//! - Group-aware insertion, removal and reordering with capacity limits
//! - Circular next/previous navigation that skips unconfigured timers
//! - Cascading from the current timer to the next one
//! - Export/restore of persistable timer records

use std::collections::{BTreeMap, HashSet};
use std::time::Instant;

use tokio::sync::mpsc;

use crate::engine::{TimerEngine, TimerEvent};
use crate::error::TimerError;
use crate::types::{SequenceLimits, TimerId, TimerMode, TimerRecord, TimerSpec};

// ============================================================================
// Position
// ============================================================================

/// Address of a slot: a group and a slot within that group.
///
/// For insertion, `slot == group length` is the end of the group and
/// `group == group count` opens a new group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub group: usize,
    pub slot: usize,
}

impl Position {
    pub fn new(group: usize, slot: usize) -> Self {
        Self { group, slot }
    }

    fn invalid(self) -> TimerError {
        TimerError::InvalidPosition {
            group: self.group,
            slot: self.slot,
        }
    }
}

// ============================================================================
// TimerSequence
// ============================================================================

/// Ordered timers partitioned into groups, with one selected timer.
///
/// A sequence always holds at least one timer. Groups never stay empty:
/// a group whose last timer is removed or moved away disappears.
#[derive(Debug)]
pub struct TimerSequence {
    groups: Vec<Vec<TimerEngine>>,
    /// Flat index of the selected timer
    current: usize,
    limits: SequenceLimits,
    event_tx: mpsc::UnboundedSender<TimerEvent>,
}

impl TimerSequence {
    /// Creates a sequence holding a single timer.
    pub fn new(
        first: TimerSpec,
        limits: SequenceLimits,
        event_tx: mpsc::UnboundedSender<TimerEvent>,
    ) -> Self {
        let engine = TimerEngine::new(first, event_tx.clone());
        Self {
            groups: vec![vec![engine]],
            current: 0,
            limits,
            event_tx,
        }
    }

    /// Creates a sequence from nested lists of specs, one list per group.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no timers or the layout exceeds the limits.
    pub fn from_groups(
        groups: Vec<Vec<TimerSpec>>,
        limits: SequenceLimits,
        event_tx: mpsc::UnboundedSender<TimerEvent>,
    ) -> Result<Self, TimerError> {
        let layout = groups
            .into_iter()
            .map(|specs| specs.into_iter().map(|spec| (TimerId::new(), spec)).collect())
            .collect();
        Self::build(layout, limits, event_tx)
    }

    /// Restores a sequence from persisted records, keeping their ids.
    ///
    /// Records are grouped by their `group` number in ascending order; within a
    /// group they keep the order they appear in.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no records, an id repeats, or the
    /// layout exceeds the limits.
    pub fn from_records(
        records: &[TimerRecord],
        limits: SequenceLimits,
        event_tx: mpsc::UnboundedSender<TimerEvent>,
    ) -> Result<Self, TimerError> {
        let mut seen = HashSet::new();
        let mut grouped: BTreeMap<usize, Vec<(TimerId, TimerSpec)>> = BTreeMap::new();
        for record in records {
            if !seen.insert(record.id) {
                return Err(TimerError::DuplicateId(record.id));
            }
            grouped
                .entry(record.group)
                .or_default()
                .push((record.id, record.spec));
        }
        Self::build(grouped.into_values().collect(), limits, event_tx)
    }

    fn build(
        layout: Vec<Vec<(TimerId, TimerSpec)>>,
        limits: SequenceLimits,
        event_tx: mpsc::UnboundedSender<TimerEvent>,
    ) -> Result<Self, TimerError> {
        let layout: Vec<_> = layout.into_iter().filter(|g| !g.is_empty()).collect();
        let total: usize = layout.iter().map(Vec::len).sum();
        if total == 0 {
            return Err(TimerError::EmptySequence);
        }
        if total > limits.max_timers() {
            return Err(TimerError::LimitExceeded {
                limit: limits.max_timers(),
            });
        }
        if let Some(group) = layout
            .iter()
            .position(|g| g.len() > limits.group_capacity())
        {
            return Err(TimerError::CapacityExceeded {
                group,
                capacity: limits.group_capacity(),
            });
        }

        let groups = layout
            .into_iter()
            .map(|group| {
                group
                    .into_iter()
                    .map(|(id, spec)| TimerEngine::with_id(id, spec, event_tx.clone()))
                    .collect()
            })
            .collect();

        Ok(Self {
            groups,
            current: 0,
            limits,
            event_tx,
        })
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Total number of timers across all groups.
    pub fn len(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    /// Always false: a sequence keeps at least one timer.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of timers in `group`, or `None` if the group does not exist.
    pub fn group_len(&self, group: usize) -> Option<usize> {
        self.groups.get(group).map(Vec::len)
    }

    pub fn limits(&self) -> SequenceLimits {
        self.limits
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &TimerEngine {
        let pos = self.locate(self.current).unwrap_or(Position::new(0, 0));
        &self.groups[pos.group][pos.slot]
    }

    pub fn current_mut(&mut self) -> &mut TimerEngine {
        let pos = self.locate(self.current).unwrap_or(Position::new(0, 0));
        &mut self.groups[pos.group][pos.slot]
    }

    pub fn current_id(&self) -> TimerId {
        self.current().id()
    }

    pub fn get(&self, id: TimerId) -> Option<&TimerEngine> {
        self.iter().find(|engine| engine.id() == id)
    }

    pub fn get_mut(&mut self, id: TimerId) -> Option<&mut TimerEngine> {
        self.groups
            .iter_mut()
            .flatten()
            .find(|engine| engine.id() == id)
    }

    /// Timer at a flat index.
    pub fn get_index(&self, index: usize) -> Option<&TimerEngine> {
        self.iter().nth(index)
    }

    /// Iterates over all timers in order.
    pub fn iter(&self) -> impl Iterator<Item = &TimerEngine> {
        self.groups.iter().flatten()
    }

    /// Iterates over the groups in order.
    pub fn groups(&self) -> impl Iterator<Item = &[TimerEngine]> {
        self.groups.iter().map(Vec::as_slice)
    }

    pub fn position_of(&self, id: TimerId) -> Option<Position> {
        self.groups.iter().enumerate().find_map(|(group, timers)| {
            timers
                .iter()
                .position(|engine| engine.id() == id)
                .map(|slot| Position::new(group, slot))
        })
    }

    pub fn index_of(&self, id: TimerId) -> Option<usize> {
        self.iter().position(|engine| engine.id() == id)
    }

    /// Exports the layout as persistable records.
    pub fn records(&self) -> Vec<TimerRecord> {
        self.groups
            .iter()
            .enumerate()
            .flat_map(|(group, timers)| {
                timers.iter().map(move |engine| TimerRecord {
                    id: engine.id(),
                    group,
                    spec: *engine.spec(),
                })
            })
            .collect()
    }

    // ------------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------------

    /// Creates a timer from `spec` and inserts it at `at`.
    ///
    /// The selected timer stays selected.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::InvalidPosition`] if `at` is not an insertion
    /// point, [`TimerError::LimitExceeded`] if the sequence is full, or
    /// [`TimerError::CapacityExceeded`] if the target group is full.
    pub fn insert(&mut self, spec: TimerSpec, at: Position) -> Result<TimerId, TimerError> {
        let opens_group = at.group == self.groups.len();
        if opens_group {
            if at.slot != 0 {
                return Err(at.invalid());
            }
        } else {
            let group = self.groups.get(at.group).ok_or_else(|| at.invalid())?;
            if at.slot > group.len() {
                return Err(at.invalid());
            }
        }

        if self.len() >= self.limits.max_timers() {
            return Err(TimerError::LimitExceeded {
                limit: self.limits.max_timers(),
            });
        }
        if !opens_group && self.groups[at.group].len() >= self.limits.group_capacity() {
            return Err(TimerError::CapacityExceeded {
                group: at.group,
                capacity: self.limits.group_capacity(),
            });
        }

        let selected = self.current_id();
        let engine = TimerEngine::new(spec, self.event_tx.clone());
        let id = engine.id();
        if opens_group {
            self.groups.push(vec![engine]);
        } else {
            self.groups[at.group].insert(at.slot, engine);
        }
        self.reselect(selected);

        tracing::debug!(timer = %id, group = at.group, slot = at.slot, "timer inserted");
        Ok(id)
    }

    /// Appends a timer to the last group, opening a new group when it is full.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::LimitExceeded`] if the sequence is full.
    pub fn push(&mut self, spec: TimerSpec) -> Result<TimerId, TimerError> {
        let last = self.groups.len() - 1;
        let last_len = self.groups[last].len();
        let at = if last_len < self.limits.group_capacity() {
            Position::new(last, last_len)
        } else {
            Position::new(self.groups.len(), 0)
        };
        self.insert(spec, at)
    }

    /// Removes the timer with the given id.
    ///
    /// If it was selected, the selection moves to the preceding timer.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::NotFound`] for an unknown id and
    /// [`TimerError::LastTimer`] if it is the only timer.
    pub fn remove(&mut self, id: TimerId) -> Result<(), TimerError> {
        let pos = self.position_of(id).ok_or(TimerError::NotFound(id))?;
        if self.len() == 1 {
            return Err(TimerError::LastTimer);
        }

        let index = self.flat_index(pos);
        let mut removed = self.groups[pos.group].remove(pos.slot);
        removed.stop();
        if self.groups[pos.group].is_empty() {
            self.groups.remove(pos.group);
        }

        if index <= self.current {
            self.current = self.current.saturating_sub(1);
        }
        self.clamp_current();

        tracing::debug!(timer = %id, "timer removed");
        Ok(())
    }

    /// Moves a timer to another slot, keeping its id and running state.
    ///
    /// Within a group, `to.slot` is the final slot of the timer. Across
    /// groups, `to` is an insertion point in the destination group.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::InvalidPosition`] if `from` is empty, `to` is
    /// not addressable, or the destination group is full.
    pub fn move_timer(&mut self, from: Position, to: Position) -> Result<(), TimerError> {
        let source_len = self
            .groups
            .get(from.group)
            .map(Vec::len)
            .filter(|len| from.slot < *len)
            .ok_or_else(|| from.invalid())?;

        if to.group == from.group {
            if to.slot >= source_len {
                return Err(to.invalid());
            }
        } else if to.group == self.groups.len() {
            if to.slot != 0 {
                return Err(to.invalid());
            }
        } else {
            let dest = self.groups.get(to.group).ok_or_else(|| to.invalid())?;
            if to.slot > dest.len() || dest.len() >= self.limits.group_capacity() {
                return Err(to.invalid());
            }
        }

        let selected = self.current_id();
        let engine = self.groups[from.group].remove(from.slot);
        let id = engine.id();
        if to.group == self.groups.len() {
            self.groups.push(vec![engine]);
        } else {
            self.groups[to.group].insert(to.slot, engine);
        }
        self.groups.retain(|group| !group.is_empty());
        self.reselect(selected);

        tracing::debug!(timer = %id, ?from, ?to, "timer moved");
        Ok(())
    }

    /// Replaces a timer's spec, keeping its id and position.
    ///
    /// The timer is reset to `Stopped` with the new starting time.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::NotFound`] for an unknown id.
    pub fn replace_spec(&mut self, id: TimerId, spec: TimerSpec) -> Result<(), TimerError> {
        let pos = self.position_of(id).ok_or(TimerError::NotFound(id))?;
        let slot = &mut self.groups[pos.group][pos.slot];
        slot.stop();
        *slot = TimerEngine::with_id(id, spec, self.event_tx.clone());
        tracing::debug!(timer = %id, %spec, "timer spec replaced");
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------------

    /// Selects the timer with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::NotFound`] for an unknown id.
    pub fn select(&mut self, id: TimerId) -> Result<(), TimerError> {
        self.current = self.index_of(id).ok_or(TimerError::NotFound(id))?;
        Ok(())
    }

    /// Selects the timer at a flat index.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::IndexNotFound`] if the index is out of range.
    pub fn select_index(&mut self, index: usize) -> Result<(), TimerError> {
        if index >= self.len() {
            return Err(TimerError::IndexNotFound(index));
        }
        self.current = index;
        Ok(())
    }

    /// Selects the next configured timer, wrapping around.
    ///
    /// Returns `None` if there is nowhere to go.
    pub fn next(&mut self) -> Option<TimerId> {
        self.step_selection(true)
    }

    /// Selects the previous configured timer, wrapping around.
    pub fn previous(&mut self) -> Option<TimerId> {
        self.step_selection(false)
    }

    /// Returns the index `next()` would select, without selecting it.
    pub fn peek_next(&self) -> Option<usize> {
        self.neighbor(true)
    }

    /// Stops the current timer and moves to the next one, reset and ready to
    /// start.
    ///
    /// Returns the id of the newly selected timer, or `None` if there is no
    /// cascade target (the current timer is still stopped).
    pub fn cascade(&mut self) -> Option<TimerId> {
        self.current_mut().stop();
        let id = self.next()?;
        self.current_mut().stop();
        tracing::info!(timer = %id, index = self.current, "cascaded to next timer");
        Some(id)
    }

    // ------------------------------------------------------------------------
    // Clock
    // ------------------------------------------------------------------------

    /// Ticks every running timer at `now`.
    pub fn tick_at(&mut self, now: Instant) {
        for engine in self.groups.iter_mut().flatten() {
            engine.tick_at(now);
        }
    }

    /// Cascades and starts the next timer when the current one alarmed.
    ///
    /// Does nothing if the current timer is not in alarm or there is no
    /// cascade target, so the alarm stays visible.
    pub fn advance_on_alarm(&mut self) -> Option<TimerId> {
        if self.current().mode() != TimerMode::Alarm || self.peek_next().is_none() {
            return None;
        }
        let id = self.cascade()?;
        self.current_mut().start();
        Some(id)
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn step_selection(&mut self, forward: bool) -> Option<TimerId> {
        let index = self.neighbor(forward)?;
        self.current = index;
        self.get_index(index).map(TimerEngine::id)
    }

    /// Nearest configured timer in the given direction, excluding the current one.
    fn neighbor(&self, forward: bool) -> Option<usize> {
        let len = self.len();
        if len < 2 {
            return None;
        }
        let configured: Vec<bool> = self.iter().map(|e| e.spec().is_configured()).collect();
        (1..len)
            .map(|offset| {
                if forward {
                    (self.current + offset) % len
                } else {
                    (self.current + len - offset) % len
                }
            })
            .find(|&index| configured[index])
    }

    fn locate(&self, mut index: usize) -> Option<Position> {
        for (group, timers) in self.groups.iter().enumerate() {
            if index < timers.len() {
                return Some(Position::new(group, index));
            }
            index -= timers.len();
        }
        None
    }

    fn flat_index(&self, pos: Position) -> usize {
        self.groups[..pos.group].iter().map(Vec::len).sum::<usize>() + pos.slot
    }

    fn reselect(&mut self, id: TimerId) {
        if let Some(index) = self.index_of(id) {
            self.current = index;
        }
        self.clamp_current();
    }

    fn clamp_current(&mut self) {
        let len = self.len();
        if self.current >= len {
            self.current = len.saturating_sub(1);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn limits(max: usize, capacity: usize) -> SequenceLimits {
        SequenceLimits::new(max, capacity).unwrap()
    }

    fn create_sequence(
        groups: Vec<Vec<u32>>,
        max: usize,
        capacity: usize,
    ) -> (TimerSequence, mpsc::UnboundedReceiver<TimerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let groups = groups
            .into_iter()
            .map(|g| g.into_iter().map(TimerSpec::simple).collect())
            .collect();
        let sequence = TimerSequence::from_groups(groups, limits(max, capacity), tx).unwrap();
        (sequence, rx)
    }

    fn starts(sequence: &TimerSequence) -> Vec<u32> {
        sequence.iter().map(|e| e.spec().starting_time()).collect()
    }

    // ------------------------------------------------------------------------
    // Construction Tests
    // ------------------------------------------------------------------------

    mod construction_tests {
        use super::*;

        #[test]
        fn test_new_has_one_timer() {
            let (tx, _rx) = mpsc::unbounded_channel();
            let sequence = TimerSequence::new(TimerSpec::simple(30), limits(4, 2), tx);

            assert_eq!(sequence.len(), 1);
            assert!(!sequence.is_empty());
            assert_eq!(sequence.current_index(), 0);
            assert_eq!(sequence.current().spec().starting_time(), 30);
        }

        #[test]
        fn test_from_groups_rejects_empty() {
            let (tx, _rx) = mpsc::unbounded_channel();
            let result = TimerSequence::from_groups(vec![vec![], vec![]], limits(4, 2), tx);
            assert!(matches!(result, Err(TimerError::EmptySequence)));
        }

        #[test]
        fn test_from_groups_enforces_limits() {
            let (tx, _rx) = mpsc::unbounded_channel();
            let groups = vec![vec![TimerSpec::simple(1); 3]];
            let result = TimerSequence::from_groups(groups, limits(10, 2), tx.clone());
            assert!(matches!(
                result,
                Err(TimerError::CapacityExceeded {
                    group: 0,
                    capacity: 2
                })
            ));

            let groups = vec![vec![TimerSpec::simple(1); 2]; 3];
            let result = TimerSequence::from_groups(groups, limits(5, 2), tx);
            assert!(matches!(result, Err(TimerError::LimitExceeded { limit: 5 })));
        }

        #[test]
        fn test_records_roundtrip_keeps_ids_and_layout() {
            let (sequence, _rx) = create_sequence(vec![vec![10, 20], vec![30]], 8, 2);
            let records = sequence.records();
            assert_eq!(records.len(), 3);
            assert_eq!(records[2].group, 1);

            let (tx, _rx2) = mpsc::unbounded_channel();
            let restored = TimerSequence::from_records(&records, limits(8, 2), tx).unwrap();

            assert_eq!(restored.records(), records);
            assert_eq!(restored.group_count(), 2);
        }

        #[test]
        fn test_from_records_rejects_duplicate_ids() {
            let id = TimerId::new();
            let record = TimerRecord {
                id,
                group: 0,
                spec: TimerSpec::simple(5),
            };
            let (tx, _rx) = mpsc::unbounded_channel();
            let result =
                TimerSequence::from_records(&[record.clone(), record], limits(8, 4), tx);
            assert_eq!(result.unwrap_err(), TimerError::DuplicateId(id));
        }
    }

    // ------------------------------------------------------------------------
    // Insert Tests
    // ------------------------------------------------------------------------

    mod insert_tests {
        use super::*;

        #[test]
        fn test_insert_at_end_of_group() {
            let (mut sequence, _rx) = create_sequence(vec![vec![10]], 8, 3);

            let id = sequence.insert(TimerSpec::simple(20), Position::new(0, 1)).unwrap();

            assert_eq!(starts(&sequence), vec![10, 20]);
            assert_eq!(sequence.position_of(id), Some(Position::new(0, 1)));
        }

        #[test]
        fn test_insert_new_group() {
            let (mut sequence, _rx) = create_sequence(vec![vec![10]], 8, 3);

            sequence.insert(TimerSpec::simple(20), Position::new(1, 0)).unwrap();

            assert_eq!(sequence.group_count(), 2);
            assert_eq!(sequence.group_len(1), Some(1));
        }

        #[test]
        fn test_insert_before_current_keeps_selection() {
            let (mut sequence, _rx) = create_sequence(vec![vec![10, 20]], 8, 3);
            sequence.select_index(1).unwrap();
            let selected = sequence.current_id();

            sequence.insert(TimerSpec::simple(5), Position::new(0, 0)).unwrap();

            assert_eq!(sequence.current_id(), selected);
            assert_eq!(sequence.current_index(), 2);
        }

        #[test]
        fn test_insert_invalid_position() {
            let (mut sequence, _rx) = create_sequence(vec![vec![10]], 8, 3);

            assert_eq!(
                sequence.insert(TimerSpec::simple(1), Position::new(0, 2)),
                Err(TimerError::InvalidPosition { group: 0, slot: 2 })
            );
            assert_eq!(
                sequence.insert(TimerSpec::simple(1), Position::new(2, 0)),
                Err(TimerError::InvalidPosition { group: 2, slot: 0 })
            );
            assert_eq!(
                sequence.insert(TimerSpec::simple(1), Position::new(1, 1)),
                Err(TimerError::InvalidPosition { group: 1, slot: 1 })
            );
            assert_eq!(sequence.len(), 1);
        }

        #[test]
        fn test_insert_capacity_exceeded() {
            let (mut sequence, _rx) = create_sequence(vec![vec![10, 20]], 8, 2);

            let result = sequence.insert(TimerSpec::simple(30), Position::new(0, 1));

            assert_eq!(
                result,
                Err(TimerError::CapacityExceeded {
                    group: 0,
                    capacity: 2
                })
            );
        }

        #[test]
        fn test_insert_limit_exceeded() {
            let (mut sequence, _rx) = create_sequence(vec![vec![10, 20]], 2, 4);

            let result = sequence.insert(TimerSpec::simple(30), Position::new(1, 0));

            assert_eq!(result, Err(TimerError::LimitExceeded { limit: 2 }));
        }

        #[test]
        fn test_push_fills_then_opens_group() {
            let (mut sequence, _rx) = create_sequence(vec![vec![10]], 8, 2);

            sequence.push(TimerSpec::simple(20)).unwrap();
            sequence.push(TimerSpec::simple(30)).unwrap();

            assert_eq!(sequence.group_len(0), Some(2));
            assert_eq!(sequence.group_len(1), Some(1));
            assert_eq!(starts(&sequence), vec![10, 20, 30]);
        }
    }

    // ------------------------------------------------------------------------
    // Remove Tests
    // ------------------------------------------------------------------------

    mod remove_tests {
        use super::*;

        #[test]
        fn test_remove_last_timer_fails() {
            let (mut sequence, _rx) = create_sequence(vec![vec![10]], 8, 2);
            let id = sequence.current_id();

            assert_eq!(sequence.remove(id), Err(TimerError::LastTimer));
            assert_eq!(sequence.len(), 1);
            assert_eq!(sequence.current_id(), id);
        }

        #[test]
        fn test_remove_unknown_id() {
            let (mut sequence, _rx) = create_sequence(vec![vec![10, 20]], 8, 2);
            let id = TimerId::new();
            assert_eq!(sequence.remove(id), Err(TimerError::NotFound(id)));
        }

        #[test]
        fn test_remove_current_selects_preceding() {
            let (mut sequence, _rx) = create_sequence(vec![vec![10, 20, 30]], 8, 3);
            sequence.select_index(2).unwrap();

            sequence.remove(sequence.current_id()).unwrap();

            assert_eq!(sequence.current_index(), 1);
            assert_eq!(sequence.current().spec().starting_time(), 20);
        }

        #[test]
        fn test_remove_first_current_clamps_to_zero() {
            let (mut sequence, _rx) = create_sequence(vec![vec![10, 20]], 8, 3);

            sequence.remove(sequence.current_id()).unwrap();

            assert_eq!(sequence.current_index(), 0);
            assert_eq!(sequence.current().spec().starting_time(), 20);
        }

        #[test]
        fn test_remove_before_current_keeps_selection() {
            let (mut sequence, _rx) = create_sequence(vec![vec![10, 20, 30]], 8, 3);
            sequence.select_index(2).unwrap();
            let selected = sequence.current_id();
            let first = sequence.get_index(0).unwrap().id();

            sequence.remove(first).unwrap();

            assert_eq!(sequence.current_id(), selected);
        }

        #[test]
        fn test_remove_drops_empty_group() {
            let (mut sequence, _rx) = create_sequence(vec![vec![10], vec![20]], 8, 3);
            let first = sequence.get_index(0).unwrap().id();

            sequence.remove(first).unwrap();

            assert_eq!(sequence.group_count(), 1);
            assert_eq!(starts(&sequence), vec![20]);
        }
    }

    // ------------------------------------------------------------------------
    // Move Tests
    // ------------------------------------------------------------------------

    mod move_tests {
        use super::*;

        #[test]
        fn test_reorder_within_group() {
            let (mut sequence, _rx) = create_sequence(vec![vec![10, 20, 30]], 8, 3);

            sequence
                .move_timer(Position::new(0, 0), Position::new(0, 2))
                .unwrap();

            assert_eq!(starts(&sequence), vec![20, 30, 10]);
        }

        #[test]
        fn test_reorder_within_full_group_allowed() {
            let (mut sequence, _rx) = create_sequence(vec![vec![10, 20]], 8, 2);

            sequence
                .move_timer(Position::new(0, 1), Position::new(0, 0))
                .unwrap();

            assert_eq!(starts(&sequence), vec![20, 10]);
        }

        #[test]
        fn test_move_across_groups_preserves_state() {
            let (mut sequence, _rx) = create_sequence(vec![vec![10, 20], vec![30]], 8, 3);
            let id = sequence.get_index(0).unwrap().id();
            sequence.get_mut(id).unwrap().start();

            sequence
                .move_timer(Position::new(0, 0), Position::new(1, 1))
                .unwrap();

            assert_eq!(sequence.position_of(id), Some(Position::new(1, 1)));
            assert!(sequence.get(id).unwrap().is_running());
        }

        #[test]
        fn test_move_into_full_group_fails() {
            let (mut sequence, _rx) = create_sequence(vec![vec![10], vec![20, 30]], 8, 2);

            let result = sequence.move_timer(Position::new(0, 0), Position::new(1, 0));

            assert_eq!(result, Err(TimerError::InvalidPosition { group: 1, slot: 0 }));
            assert_eq!(starts(&sequence), vec![10, 20, 30]);
        }

        #[test]
        fn test_move_from_empty_slot_fails() {
            let (mut sequence, _rx) = create_sequence(vec![vec![10]], 8, 2);

            let result = sequence.move_timer(Position::new(0, 1), Position::new(0, 0));

            assert_eq!(result, Err(TimerError::InvalidPosition { group: 0, slot: 1 }));
        }

        #[test]
        fn test_move_to_new_group_drops_emptied_group() {
            let (mut sequence, _rx) = create_sequence(vec![vec![10], vec![20]], 8, 2);

            sequence
                .move_timer(Position::new(0, 0), Position::new(2, 0))
                .unwrap();

            assert_eq!(sequence.group_count(), 2);
            assert_eq!(starts(&sequence), vec![20, 10]);
        }

        #[test]
        fn test_move_keeps_selected_timer() {
            let (mut sequence, _rx) = create_sequence(vec![vec![10, 20, 30]], 8, 3);
            sequence.select_index(0).unwrap();
            let selected = sequence.current_id();

            sequence
                .move_timer(Position::new(0, 0), Position::new(0, 2))
                .unwrap();

            assert_eq!(sequence.current_id(), selected);
            assert_eq!(sequence.current_index(), 2);
        }
    }

    // ------------------------------------------------------------------------
    // Selection Tests
    // ------------------------------------------------------------------------

    mod selection_tests {
        use super::*;

        #[test]
        fn test_select_by_id_and_index() {
            let (mut sequence, _rx) = create_sequence(vec![vec![10, 20], vec![30]], 8, 2);
            let id = sequence.get_index(2).unwrap().id();

            sequence.select(id).unwrap();
            assert_eq!(sequence.current_index(), 2);

            sequence.select_index(1).unwrap();
            assert_eq!(sequence.current().spec().starting_time(), 20);
        }

        #[test]
        fn test_select_missing() {
            let (mut sequence, _rx) = create_sequence(vec![vec![10]], 8, 2);
            assert_eq!(sequence.select_index(1), Err(TimerError::IndexNotFound(1)));
            let id = TimerId::new();
            assert_eq!(sequence.select(id), Err(TimerError::NotFound(id)));
        }

        #[test]
        fn test_next_wraps_around() {
            let (mut sequence, _rx) = create_sequence(vec![vec![10, 20, 30]], 8, 3);
            sequence.select_index(2).unwrap();

            sequence.next();

            assert_eq!(sequence.current_index(), 0);
        }

        #[test]
        fn test_previous_wraps_around() {
            let (mut sequence, _rx) = create_sequence(vec![vec![10, 20, 30]], 8, 3);

            sequence.previous();

            assert_eq!(sequence.current_index(), 2);
        }

        #[test]
        fn test_next_single_timer_is_none() {
            let (mut sequence, _rx) = create_sequence(vec![vec![10]], 8, 3);
            assert_eq!(sequence.next(), None);
            assert_eq!(sequence.previous(), None);
        }

        #[test]
        fn test_next_skips_unconfigured() {
            let (mut sequence, _rx) = create_sequence(vec![vec![10, 0, 5]], 8, 3);
            let target = sequence.get_index(2).unwrap().id();

            assert_eq!(sequence.next(), Some(target));
            assert_eq!(sequence.current_index(), 2);
        }

        #[test]
        fn test_next_with_only_unconfigured_candidates() {
            let (mut sequence, _rx) = create_sequence(vec![vec![10, 0, 0]], 8, 3);
            assert_eq!(sequence.next(), None);
            assert_eq!(sequence.current_index(), 0);
        }

        #[test]
        fn test_unconfigured_still_selectable() {
            let (mut sequence, _rx) = create_sequence(vec![vec![10, 0]], 8, 3);
            sequence.select_index(1).unwrap();
            assert!(!sequence.current().spec().is_configured());
        }
    }

    // ------------------------------------------------------------------------
    // Cascade Tests
    // ------------------------------------------------------------------------

    mod cascade_tests {
        use super::*;

        #[test]
        fn test_cascade_stops_current_and_resets_next() {
            let (mut sequence, _rx) = create_sequence(vec![vec![10, 20]], 8, 3);
            sequence.current_mut().start();
            let first = sequence.current_id();

            let next = sequence.cascade().unwrap();

            assert_eq!(sequence.current_id(), next);
            assert_eq!(sequence.get(first).unwrap().mode(), TimerMode::Stopped);
            assert_eq!(sequence.current().mode(), TimerMode::Stopped);
            assert_eq!(sequence.current().current_time(), 20);
        }

        #[test]
        fn test_cascade_without_target() {
            let (mut sequence, _rx) = create_sequence(vec![vec![10]], 8, 3);
            sequence.current_mut().start();

            assert_eq!(sequence.cascade(), None);
            assert_eq!(sequence.current().mode(), TimerMode::Stopped);
        }

        #[test]
        fn test_advance_on_alarm_starts_next() {
            let (mut sequence, _rx) = create_sequence(vec![vec![10, 20]], 8, 3);
            sequence.current_mut().end();

            let next = sequence.advance_on_alarm().unwrap();

            assert_eq!(sequence.current_id(), next);
            assert_eq!(sequence.current().mode(), TimerMode::Countdown);
        }

        #[test]
        fn test_advance_on_alarm_keeps_alarm_without_target() {
            let (mut sequence, _rx) = create_sequence(vec![vec![10]], 8, 3);
            sequence.current_mut().end();

            assert_eq!(sequence.advance_on_alarm(), None);
            assert_eq!(sequence.current().mode(), TimerMode::Alarm);
        }

        #[test]
        fn test_advance_on_alarm_ignores_running_timer() {
            let (mut sequence, _rx) = create_sequence(vec![vec![10, 20]], 8, 3);
            sequence.current_mut().start();

            assert_eq!(sequence.advance_on_alarm(), None);
            assert_eq!(sequence.current_index(), 0);
        }

        #[test]
        fn test_replace_spec_keeps_identity() {
            let (mut sequence, _rx) = create_sequence(vec![vec![10, 20]], 8, 3);
            let id = sequence.current_id();
            sequence.current_mut().start();

            sequence.replace_spec(id, TimerSpec::new(45, 15, 5).unwrap()).unwrap();

            let engine = sequence.get(id).unwrap();
            assert_eq!(engine.current_time(), 45);
            assert_eq!(engine.mode(), TimerMode::Stopped);
            assert_eq!(sequence.position_of(id), Some(Position::new(0, 0)));
        }
    }
}

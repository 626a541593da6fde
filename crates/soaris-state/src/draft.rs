//! Area drawing in progress.
//!
//! The operator taps corner points on the map; once four are placed the
//! drawing can be committed, which publishes the selection to the
//! [`SelectionRelay`] and rebuilds the [`PlotsStore`] from the corners.

use tracing::info;

use crate::error::{StateError, StateResult};
use crate::plots::PlotsStore;
use crate::relay::SelectionRelay;
use crate::types::{AreaSelection, GeoPoint, AREA_POINTS};

/// Corner points tapped so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AreaDraft {
    points: Vec<GeoPoint>,
}

impl AreaDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a corner. Taps beyond the fourth are ignored; returns whether the
    /// point was added.
    pub fn tap(&mut self, point: GeoPoint) -> bool {
        if self.points.len() >= AREA_POINTS {
            return false;
        }
        self.points.push(point);
        true
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.points.len() == AREA_POINTS
    }

    /// Drop every tapped point (drawing cancelled).
    pub fn reset(&mut self) {
        self.points.clear();
    }

    /// The finished selection, if exactly four corners are placed.
    pub fn complete(&self) -> StateResult<AreaSelection> {
        if !self.is_complete() {
            return Err(StateError::IncompleteArea {
                expected: AREA_POINTS,
                actual: self.points.len(),
            });
        }
        AreaSelection::try_from(self.points.as_slice())
    }

    /// Publish the finished drawing and rebuild the plots from it.
    ///
    /// On success the draft is reset. An incomplete draft is left untouched
    /// and nothing is published.
    pub fn commit(
        &mut self,
        relay: &SelectionRelay,
        plots: &PlotsStore,
    ) -> StateResult<AreaSelection> {
        let selection = self.complete()?;
        relay.set_selection(selection);
        plots.set_plots_from_coordinates(selection.points());
        self.reset();
        info!("area selection committed");
        Ok(selection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use soaris_storage::MemoryBackingStore;

    fn corner(i: usize) -> GeoPoint {
        GeoPoint::new(10.0 + i as f64 * 0.001, 124.0 - i as f64 * 0.001)
    }

    #[test]
    fn ignores_taps_after_four() {
        let mut draft = AreaDraft::new();
        for i in 0..4 {
            assert!(draft.tap(corner(i)));
        }
        assert!(!draft.tap(corner(9)));
        assert_eq!(draft.len(), 4);
        assert_eq!(draft.points()[3], corner(3));
    }

    #[test]
    fn incomplete_draft_cannot_complete() {
        let mut draft = AreaDraft::new();
        draft.tap(corner(0));
        draft.tap(corner(1));

        let err = draft.complete().unwrap_err();
        assert!(matches!(
            err,
            StateError::IncompleteArea {
                expected: 4,
                actual: 2
            }
        ));
    }

    #[tokio::test]
    async fn commit_publishes_and_rebuilds() {
        let relay = SelectionRelay::new();
        let plots = PlotsStore::new(Arc::new(MemoryBackingStore::new()));
        let mut draft = AreaDraft::new();
        for i in 0..4 {
            draft.tap(corner(i));
        }

        let selection = draft.commit(&relay, &plots).unwrap();

        assert!(draft.is_empty());
        assert_eq!(relay.consume_selection(), Some(selection));
        let positions: Vec<_> = plots.plots().iter().map(|p| p.position()).collect();
        assert_eq!(positions, selection.points().to_vec());
    }

    #[tokio::test]
    async fn failed_commit_changes_nothing() {
        let relay = SelectionRelay::new();
        let plots = PlotsStore::new(Arc::new(MemoryBackingStore::new()));
        let before = plots.snapshot();
        let mut draft = AreaDraft::new();
        draft.tap(corner(0));

        assert!(draft.commit(&relay, &plots).is_err());

        assert_eq!(draft.len(), 1);
        assert!(!relay.has_pending());
        assert_eq!(plots.snapshot(), before);
    }
}

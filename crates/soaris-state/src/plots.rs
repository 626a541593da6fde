//! Survey plot store.
//!
//! Owns the plot records the map and summary screens render, plus the plot
//! the operator is focused on. Finishing an area drawing rebuilds the whole
//! collection from the four corner points; individual plots can also be
//! added or removed.
//!
//! The selection always names a plot in the collection, or is `None` only
//! when the collection is empty. Invalid selections are corrected to the
//! first plot rather than rejected.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use soaris_storage::BackingStore;
use tracing::{debug, warn};

use crate::cell::{HydrationPhase, Persisted, StoreCell};
use crate::error::{StateError, StateResult};
use crate::observe::Subscription;
use crate::types::{GeoPoint, Plot, PlotId, AREA_POINTS};

/// Storage key for the persisted plot collection.
pub const PLOTS_KEY: &str = "soaris-plots-v1.json";

/// Center of the default survey region.
pub const DEFAULT_CENTER: GeoPoint = GeoPoint::new(10.5424, 123.9448);

/// Spacing of synthesized corner points around [`DEFAULT_CENTER`].
const FALLBACK_STEP: f64 = 0.0004;

/// Canned soil readings assigned to plots by position.
struct PlotTemplate {
    moisture: &'static str,
    moisture_value: f64,
    ph: &'static str,
    ph_value: f64,
    temperature: &'static str,
    temperature_value: f64,
}

static TEMPLATES: [PlotTemplate; 4] = [
    PlotTemplate {
        moisture: "Dry (20%)",
        moisture_value: 20.0,
        ph: "6.5",
        ph_value: 6.5,
        temperature: "25°C",
        temperature_value: 25.0,
    },
    PlotTemplate {
        moisture: "Moist (55%)",
        moisture_value: 55.0,
        ph: "7.0",
        ph_value: 7.0,
        temperature: "26°C",
        temperature_value: 26.0,
    },
    PlotTemplate {
        moisture: "Moist (76%)",
        moisture_value: 76.0,
        ph: "6.4",
        ph_value: 6.4,
        temperature: "24°C",
        temperature_value: 24.0,
    },
    PlotTemplate {
        moisture: "Moist (76%)",
        moisture_value: 76.0,
        ph: "6.4",
        ph_value: 6.4,
        temperature: "24°C",
        temperature_value: 24.0,
    },
];

/// Corner points of the seed survey shown before any mapping.
const SEED_POINTS: [GeoPoint; 4] = [
    GeoPoint::new(10.5432, 123.9439),
    GeoPoint::new(10.5426, 123.9448),
    GeoPoint::new(10.5419, 123.9441),
    GeoPoint::new(10.5415, 123.9452),
];

/// Build the plot at `index` (0-based) for a corner point.
///
/// Positions past the template list reuse the last template.
fn build_plot(point: GeoPoint, index: usize) -> Plot {
    let template = TEMPLATES.get(index).unwrap_or(&TEMPLATES[TEMPLATES.len() - 1]);
    Plot {
        id: format!("plot{}", index + 1),
        title: format!("Plot {}", index + 1),
        latitude: point.latitude,
        longitude: point.longitude,
        moisture: template.moisture.to_string(),
        moisture_value: template.moisture_value,
        ph: template.ph.to_string(),
        ph_value: template.ph_value,
        temperature: template.temperature.to_string(),
        temperature_value: template.temperature_value,
    }
}

/// Deterministic stand-in for a missing corner point: alternating sides of
/// [`DEFAULT_CENTER`], one step further out per index.
pub fn fallback_point(index: usize) -> GeoPoint {
    let sign = if index % 2 == 0 { 1.0 } else { -1.0 };
    let offset = FALLBACK_STEP * (index + 1) as f64;
    GeoPoint::new(
        DEFAULT_CENTER.latitude + sign * offset,
        DEFAULT_CENTER.longitude - sign * offset,
    )
}

/// Plot selected by `wanted` if present, else the first plot.
fn resolve_selection(plots: &[Plot], wanted: Option<&str>) -> Option<PlotId> {
    match wanted {
        Some(id) if plots.iter().any(|p| p.id == id) => Some(id.to_string()),
        _ => plots.first().map(|p| p.id.clone()),
    }
}

/// Plot collection plus the focused plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotsState {
    pub plots: Vec<Plot>,
    pub selected_plot_id: Option<PlotId>,
}

impl PlotsState {
    /// The four seed plots with the first one selected.
    pub fn seed() -> Self {
        let plots: Vec<Plot> = SEED_POINTS
            .iter()
            .enumerate()
            .map(|(i, p)| build_plot(*p, i))
            .collect();
        let selected_plot_id = resolve_selection(&plots, None);
        Self {
            plots,
            selected_plot_id,
        }
    }

    pub fn selected_plot(&self) -> Option<&Plot> {
        let id = self.selected_plot_id.as_deref()?;
        self.plots.iter().find(|p| p.id == id)
    }

    pub fn plot(&self, id: &str) -> Option<&Plot> {
        self.plots.iter().find(|p| p.id == id)
    }
}

impl Default for PlotsState {
    fn default() -> Self {
        Self::seed()
    }
}

impl Persisted for PlotsState {
    const KEY: &'static str = PLOTS_KEY;

    fn encode(&self) -> StateResult<String> {
        serde_json::to_string(self).map_err(|e| StateError::Serialize(e.to_string()))
    }

    /// Records are validated one by one: malformed plots are dropped and the
    /// rest kept. With no valid plot left the seed collection stays.
    fn decode(raw: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(raw).ok()?;

        let records = value.get("plots").and_then(Value::as_array);
        let total = records.map_or(0, Vec::len);
        let plots: Vec<Plot> = records
            .into_iter()
            .flatten()
            .filter_map(|record| Plot::deserialize(record).ok())
            .filter(Plot::is_valid)
            .collect();
        if plots.len() < total {
            warn!(dropped = total - plots.len(), "dropped malformed plot records");
        }
        let plots = if plots.is_empty() {
            Self::seed().plots
        } else {
            plots
        };

        let wanted = value.get("selectedPlotId").and_then(Value::as_str);
        let selected_plot_id = resolve_selection(&plots, wanted);
        Some(Self {
            plots,
            selected_plot_id,
        })
    }
}

/// The surveyed plots and the operator's focus.
pub struct PlotsStore {
    cell: StoreCell<PlotsState>,
}

impl PlotsStore {
    /// Create a store showing the seed plots until hydration.
    pub fn new(backend: Arc<dyn BackingStore>) -> Self {
        Self {
            cell: StoreCell::new(backend, PlotsState::seed()),
        }
    }

    pub async fn hydrate(&self) {
        self.cell.hydrate().await;
    }

    pub fn snapshot(&self) -> Arc<PlotsState> {
        self.cell.snapshot()
    }

    pub fn plots(&self) -> Vec<Plot> {
        self.cell.snapshot().plots.clone()
    }

    pub fn selected_plot_id(&self) -> Option<PlotId> {
        self.cell.snapshot().selected_plot_id.clone()
    }

    pub fn selected_plot(&self) -> Option<Plot> {
        self.cell.snapshot().selected_plot().cloned()
    }

    /// Focus a plot. Unknown ids (and `None`) fall back to the first plot.
    pub fn set_selected_plot(&self, id: Option<&str>) {
        self.cell.update(|state| {
            let next = resolve_selection(&state.plots, id);
            if next == state.selected_plot_id {
                return false;
            }
            state.selected_plot_id = next;
            true
        });
    }

    /// Rebuild the collection from a finished area drawing.
    ///
    /// Always yields exactly four plots: the first four points are used in
    /// order, and missing or non-finite points are replaced with
    /// [`fallback_point`]s. The previous collection is replaced wholesale and
    /// the first new plot is selected.
    pub fn set_plots_from_coordinates(&self, points: &[GeoPoint]) {
        let plots: Vec<Plot> = (0..AREA_POINTS)
            .map(|i| {
                let point = points
                    .get(i)
                    .copied()
                    .filter(GeoPoint::is_finite)
                    .unwrap_or_else(|| fallback_point(i));
                build_plot(point, i)
            })
            .collect();
        let synthesized = AREA_POINTS.saturating_sub(points.len());
        debug!(supplied = points.len(), synthesized, "rebuilding plots from coordinates");

        self.cell.update(|state| {
            state.selected_plot_id = resolve_selection(&plots, None);
            state.plots = plots;
            true
        });
    }

    /// Append a plot; selects it if nothing was selected.
    ///
    /// Plots with non-finite readings or coordinates are rejected (returns
    /// `false`).
    pub fn add_plot(&self, plot: Plot) -> bool {
        if !plot.is_valid() {
            warn!(id = %plot.id, "rejecting plot with non-finite values");
            return false;
        }
        self.cell.update(|state| {
            if state.selected_plot_id.is_none() {
                state.selected_plot_id = Some(plot.id.clone());
            }
            state.plots.push(plot);
            true
        })
    }

    /// Remove every plot with `id`. A removed selection falls back to the
    /// first remaining plot.
    pub fn remove_plot(&self, id: &str) {
        self.cell.update(|state| {
            let before = state.plots.len();
            state.plots.retain(|p| p.id != id);
            if state.plots.len() == before {
                return false;
            }
            let wanted = state.selected_plot_id.clone();
            state.selected_plot_id = resolve_selection(&state.plots, wanted.as_deref());
            true
        });
    }

    /// Replace the collection with the valid subset of `plots`, keeping the
    /// selection when it survives.
    pub fn set_plots(&self, plots: Vec<Plot>) {
        let plots: Vec<Plot> = plots.into_iter().filter(Plot::is_valid).collect();
        self.cell.update(|state| {
            let wanted = state.selected_plot_id.clone();
            state.selected_plot_id = resolve_selection(&plots, wanted.as_deref());
            state.plots = plots;
            true
        });
    }

    pub fn phase(&self) -> HydrationPhase {
        self.cell.phase()
    }

    pub fn subscribe(&self, callback: impl Fn() + Send + Sync + 'static) -> Subscription {
        self.cell.subscribe(callback)
    }

    pub async fn flush(&self) {
        self.cell.flush().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soaris_storage::MemoryBackingStore;

    fn store() -> PlotsStore {
        PlotsStore::new(Arc::new(MemoryBackingStore::new()))
    }

    fn corners() -> [GeoPoint; 4] {
        [
            GeoPoint::new(10.60, 124.00),
            GeoPoint::new(10.61, 124.01),
            GeoPoint::new(10.62, 124.02),
            GeoPoint::new(10.63, 124.03),
        ]
    }

    #[tokio::test]
    async fn starts_with_seed_plots() {
        let store = store();
        let snap = store.snapshot();

        assert_eq!(snap.plots.len(), 4);
        assert_eq!(snap.selected_plot_id.as_deref(), Some("plot1"));
        assert_eq!(snap.plots[0].moisture, "Dry (20%)");
        assert_eq!(snap.plots[3].position(), GeoPoint::new(10.5415, 123.9452));
    }

    #[tokio::test]
    async fn four_points_map_one_to_one() {
        let store = store();
        let points = corners();

        store.set_plots_from_coordinates(&points);

        let plots = store.plots();
        assert_eq!(plots.len(), 4);
        for (i, plot) in plots.iter().enumerate() {
            assert_eq!(plot.position(), points[i]);
            assert_eq!(plot.id, format!("plot{}", i + 1));
            assert_eq!(plot.title, format!("Plot {}", i + 1));
        }
        assert_eq!(plots[1].moisture_value, 55.0);
        assert_eq!(store.selected_plot_id().as_deref(), Some("plot1"));
    }

    #[tokio::test]
    async fn always_yields_four_plots() {
        let points = corners();
        for supplied in 0..=6 {
            let store = store();
            let input: Vec<GeoPoint> = points.iter().copied().cycle().take(supplied).collect();

            store.set_plots_from_coordinates(&input);

            let plots = store.plots();
            assert_eq!(plots.len(), 4, "supplied {supplied}");
            for (i, plot) in plots.iter().enumerate() {
                let expected = if i < supplied { input[i] } else { fallback_point(i) };
                assert_eq!(plot.position(), expected);
            }
        }
    }

    #[test]
    fn fallback_points_alternate_and_widen() {
        let p0 = fallback_point(0);
        let p1 = fallback_point(1);
        assert_eq!(p0, GeoPoint::new(10.5424 + 0.0004, 123.9448 - 0.0004));
        assert_eq!(p1, GeoPoint::new(10.5424 - 0.0008, 123.9448 + 0.0008));
    }

    #[tokio::test]
    async fn non_finite_point_is_replaced() {
        let store = store();
        let mut points = corners();
        points[2] = GeoPoint::new(f64::NAN, 124.0);

        store.set_plots_from_coordinates(&points);

        assert_eq!(store.plots()[2].position(), fallback_point(2));
        assert!(store.plots().iter().all(Plot::is_valid));
    }

    #[test]
    fn template_clamps_to_last() {
        let plot = build_plot(GeoPoint::new(0.0, 0.0), 9);
        assert_eq!(plot.id, "plot10");
        assert_eq!(plot.moisture_value, TEMPLATES[3].moisture_value);
        assert_eq!(plot.temperature, TEMPLATES[3].temperature);
    }

    #[tokio::test]
    async fn selection_self_corrects() {
        let store = store();

        store.set_selected_plot(Some("plot3"));
        assert_eq!(store.selected_plot_id().as_deref(), Some("plot3"));

        store.set_selected_plot(Some("plot99"));
        assert_eq!(store.selected_plot_id().as_deref(), Some("plot1"));

        store.set_selected_plot(Some("plot2"));
        store.set_selected_plot(None);
        assert_eq!(store.selected_plot_id().as_deref(), Some("plot1"));
    }

    #[tokio::test]
    async fn remove_selected_falls_back_to_first() {
        let store = store();
        store.set_selected_plot(Some("plot2"));

        store.remove_plot("plot2");
        assert_eq!(store.selected_plot_id().as_deref(), Some("plot1"));

        store.remove_plot("plot3");
        assert_eq!(store.selected_plot_id().as_deref(), Some("plot1"));

        for id in ["plot1", "plot4"] {
            store.remove_plot(id);
        }
        assert!(store.plots().is_empty());
        assert_eq!(store.selected_plot_id(), None);

        store.set_selected_plot(Some("plot1"));
        assert_eq!(store.selected_plot_id(), None);
    }

    #[tokio::test]
    async fn add_plot_selects_when_empty_and_rejects_invalid() {
        let store = store();
        for id in ["plot1", "plot2", "plot3", "plot4"] {
            store.remove_plot(id);
        }

        let mut extra = build_plot(GeoPoint::new(1.0, 2.0), 0);
        extra.id = "extra".into();
        assert!(store.add_plot(extra.clone()));
        assert_eq!(store.selected_plot_id().as_deref(), Some("extra"));

        let mut broken = extra;
        broken.id = "broken".into();
        broken.moisture_value = f64::NAN;
        assert!(!store.add_plot(broken));
        assert_eq!(store.plots().len(), 1);
    }

    #[tokio::test]
    async fn set_plots_keeps_surviving_selection() {
        let store = store();
        store.set_selected_plot(Some("plot3"));

        let mut plots = PlotsState::seed().plots;
        plots.remove(0);
        store.set_plots(plots);
        assert_eq!(store.selected_plot_id().as_deref(), Some("plot3"));

        store.set_plots(vec![build_plot(GeoPoint::new(0.0, 0.0), 0)]);
        assert_eq!(store.selected_plot_id().as_deref(), Some("plot1"));
    }

    #[test]
    fn decode_drops_only_malformed_records() {
        let good = serde_json::to_value(build_plot(GeoPoint::new(1.0, 2.0), 1)).unwrap();
        let raw = serde_json::json!({
            "plots": [
                good,
                { "id": "plot9", "title": "Plot 9" },
                { "id": 3 },
                "not a plot"
            ],
            "selectedPlotId": "plot9"
        })
        .to_string();

        let state = PlotsState::decode(&raw).unwrap();

        assert_eq!(state.plots.len(), 1);
        assert_eq!(state.plots[0].id, "plot2");
        // Selected record was dropped, so selection falls back.
        assert_eq!(state.selected_plot_id.as_deref(), Some("plot2"));
    }

    #[test]
    fn decode_without_valid_plots_keeps_seed() {
        let state = PlotsState::decode(r#"{"plots":[],"selectedPlotId":"plot3"}"#).unwrap();
        assert_eq!(state.plots, PlotsState::seed().plots);
        assert_eq!(state.selected_plot_id.as_deref(), Some("plot3"));

        let state = PlotsState::decode("42").unwrap();
        assert_eq!(state, PlotsState::seed());

        assert!(PlotsState::decode("{truncated").is_none());
    }
}

//! Field analytics derived from the current plots.
//!
//! The thresholds drive irrigation guidance shown to the operator. All
//! comparisons are strict: a value sitting exactly on a threshold is never
//! flagged.

use std::fmt;

use crate::types::Plot;

/// Average moisture (%) below which irrigation is recommended.
pub const MOISTURE_DRY_BELOW: f64 = 30.0;
/// Average moisture (%) above which irrigation should be avoided.
pub const MOISTURE_WET_ABOVE: f64 = 70.0;
/// Ideal average soil pH range.
pub const PH_MIN: f64 = 5.5;
pub const PH_MAX: f64 = 7.5;
/// Ideal average soil temperature range (°C).
pub const TEMPERATURE_MIN: f64 = 15.0;
pub const TEMPERATURE_MAX: f64 = 35.0;

/// Irrigation guidance from average moisture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoistureAdvice {
    Irrigate,
    Hold,
    AvoidIrrigating,
}

/// Temperature outside the ideal band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureRisk {
    Heat,
    Cold,
}

/// Aggregates over a non-empty plot set.
#[derive(Debug, Clone, Copy)]
pub struct FieldSummary<'a> {
    pub plot_count: usize,
    pub avg_moisture: f64,
    pub avg_ph: f64,
    pub avg_temperature: f64,
    /// Lowest moisture; the earliest plot wins ties.
    pub driest: &'a Plot,
    /// Highest temperature; the earliest plot wins ties.
    pub hottest: &'a Plot,
}

impl<'a> FieldSummary<'a> {
    /// `None` for an empty plot set.
    pub fn from_plots(plots: &'a [Plot]) -> Option<Self> {
        let first = plots.first()?;
        let n = plots.len() as f64;
        let mean = |value: fn(&Plot) -> f64| plots.iter().map(value).sum::<f64>() / n;

        let driest = plots.iter().fold(first, |lowest, p| {
            if p.moisture_value < lowest.moisture_value {
                p
            } else {
                lowest
            }
        });
        let hottest = plots.iter().fold(first, |highest, p| {
            if p.temperature_value > highest.temperature_value {
                p
            } else {
                highest
            }
        });

        Some(Self {
            plot_count: plots.len(),
            avg_moisture: mean(|p| p.moisture_value),
            avg_ph: mean(|p| p.ph_value),
            avg_temperature: mean(|p| p.temperature_value),
            driest,
            hottest,
        })
    }

    pub fn moisture_advice(&self) -> MoistureAdvice {
        if self.avg_moisture < MOISTURE_DRY_BELOW {
            MoistureAdvice::Irrigate
        } else if self.avg_moisture > MOISTURE_WET_ABOVE {
            MoistureAdvice::AvoidIrrigating
        } else {
            MoistureAdvice::Hold
        }
    }

    pub fn ph_out_of_range(&self) -> bool {
        self.avg_ph < PH_MIN || self.avg_ph > PH_MAX
    }

    pub fn temperature_not_ideal(&self) -> bool {
        self.temperature_risk().is_some()
    }

    pub fn temperature_risk(&self) -> Option<TemperatureRisk> {
        if self.avg_temperature > TEMPERATURE_MAX {
            Some(TemperatureRisk::Heat)
        } else if self.avg_temperature < TEMPERATURE_MIN {
            Some(TemperatureRisk::Cold)
        } else {
            None
        }
    }
}

/// The "next action" card.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    /// `None` while there is no mapping data.
    pub advice: Option<MoistureAdvice>,
    pub ph_flagged: bool,
    pub temperature_flagged: bool,
    pub text: String,
}

impl Recommendation {
    pub fn for_plots(plots: &[Plot]) -> Self {
        let Some(summary) = FieldSummary::from_plots(plots) else {
            return Self {
                advice: None,
                ph_flagged: false,
                temperature_flagged: false,
                text: "Waiting for mapping data...".to_string(),
            };
        };

        let m = summary.avg_moisture;
        let advice = summary.moisture_advice();
        let mut text = match advice {
            MoistureAdvice::Irrigate => format!(
                "Soil is generally dry (avg moisture {m:.0}%). It is a good time to irrigate the field."
            ),
            MoistureAdvice::AvoidIrrigating => format!(
                "Soil moisture is high (avg {m:.0}%). Avoid irrigating to prevent overwatering."
            ),
            MoistureAdvice::Hold => format!(
                "Soil moisture is optimal (avg {m:.0}%). You can wait before irrigating."
            ),
        };

        let ph_flagged = summary.ph_out_of_range();
        if ph_flagged {
            text.push_str(&format!(
                " Note: average pH {:.1} is outside the ideal 5.5–7.5 range.",
                summary.avg_ph
            ));
        }
        let temperature_flagged = summary.temperature_not_ideal();
        if temperature_flagged {
            text.push_str(&format!(
                " Temperature ({:.1}°C) is not ideal.",
                summary.avg_temperature
            ));
        }

        Self {
            advice: Some(advice),
            ph_flagged,
            temperature_flagged,
            text,
        }
    }
}

/// Severity of an operational alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    High,
    Medium,
    Info,
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AlertLevel::High => "High",
            AlertLevel::Medium => "Medium",
            AlertLevel::Info => "Info",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub id: &'static str,
    pub level: AlertLevel,
    pub message: String,
}

impl Alert {
    fn new(id: &'static str, level: AlertLevel, message: impl Into<String>) -> Self {
        Self {
            id,
            level,
            message: message.into(),
        }
    }

    /// Operational alerts for the summary screen, most important first.
    /// Always at least two entries once plots exist.
    pub fn for_plots(plots: &[Plot]) -> Vec<Alert> {
        let Some(summary) = FieldSummary::from_plots(plots) else {
            return vec![Alert::new(
                "waiting-data",
                AlertLevel::Info,
                "No mapped plots yet. Run mapping to generate soil risk alerts.",
            )];
        };

        let mut alerts = Vec::new();
        let m = summary.avg_moisture;
        alerts.push(match summary.moisture_advice() {
            MoistureAdvice::Irrigate => Alert::new(
                "dry-soil",
                AlertLevel::High,
                format!(
                    "Critical moisture risk. {} is at {:.0}%.",
                    summary.driest.title, summary.driest.moisture_value
                ),
            ),
            MoistureAdvice::AvoidIrrigating => Alert::new(
                "overwater-risk",
                AlertLevel::Medium,
                format!("High moisture detected ({m:.0}% avg). Delay irrigation cycle."),
            ),
            MoistureAdvice::Hold => Alert::new(
                "moisture-ok",
                AlertLevel::Info,
                format!("Moisture within safe band ({m:.0}% avg)."),
            ),
        });

        if summary.ph_out_of_range() {
            alerts.push(Alert::new(
                "ph-out-of-range",
                AlertLevel::Medium,
                format!(
                    "Soil pH drift detected ({:.1}). Schedule corrective treatment.",
                    summary.avg_ph
                ),
            ));
        }

        match summary.temperature_risk() {
            Some(TemperatureRisk::Heat) => alerts.push(Alert::new(
                "heat-risk",
                AlertLevel::High,
                format!(
                    "Heat stress warning. {} reached {:.1}°C.",
                    summary.hottest.title, summary.hottest.temperature_value
                ),
            )),
            Some(TemperatureRisk::Cold) => alerts.push(Alert::new(
                "cold-risk",
                AlertLevel::Medium,
                format!(
                    "Low temperature trend ({:.1}°C avg). Growth may slow down.",
                    summary.avg_temperature
                ),
            )),
            None => {}
        }

        if alerts.len() < 2 {
            alerts.push(Alert::new(
                "system-ok",
                AlertLevel::Info,
                "No additional critical alerts. Continue periodic monitoring.",
            ));
        }
        alerts
    }
}

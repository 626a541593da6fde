//! Domain types shared by the Soaris stores.
//!
//! Plot and pairing records are serialized with camelCase field names so
//! snapshots stay readable by earlier clients of the same storage keys.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StateError;

/// Stable plot identifier (`plot1`, `plot2`, ...).
pub type PlotId = String;

/// Number of corner points in a survey area.
pub const AREA_POINTS: usize = 4;

// ── Geography ──────────────────────────────────────────────────────

/// A geographic point in floating point degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.latitude, self.longitude)
    }
}

impl FromStr for GeoPoint {
    type Err = StateError;

    /// Parse `lat,lon`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || StateError::Unknown {
            kind: "coordinate",
            value: s.to_string(),
        };
        let (lat, lon) = s.split_once(',').ok_or_else(unknown)?;
        let latitude: f64 = lat.trim().parse().map_err(|_| unknown())?;
        let longitude: f64 = lon.trim().parse().map_err(|_| unknown())?;
        let point = GeoPoint::new(latitude, longitude);
        if point.is_finite() {
            Ok(point)
        } else {
            Err(unknown())
        }
    }
}

/// A finished survey area: exactly four corner points in tap order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaSelection([GeoPoint; AREA_POINTS]);

impl AreaSelection {
    pub fn new(points: [GeoPoint; AREA_POINTS]) -> Self {
        Self(points)
    }

    pub fn points(&self) -> &[GeoPoint; AREA_POINTS] {
        &self.0
    }
}

impl TryFrom<&[GeoPoint]> for AreaSelection {
    type Error = StateError;

    fn try_from(points: &[GeoPoint]) -> Result<Self, Self::Error> {
        let array: [GeoPoint; AREA_POINTS] =
            points.try_into().map_err(|_| StateError::IncompleteArea {
                expected: AREA_POINTS,
                actual: points.len(),
            })?;
        Ok(Self(array))
    }
}

// ── Flight mode ────────────────────────────────────────────────────

/// Operating mode of the paired drone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FlightMode {
    #[default]
    Auto,
    Manual,
}

impl FlightMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlightMode::Auto => "Auto",
            FlightMode::Manual => "Manual",
        }
    }
}

impl fmt::Display for FlightMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlightMode {
    type Err = StateError;

    /// Exact, case-sensitive match on `Auto` / `Manual`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Auto" => Ok(FlightMode::Auto),
            "Manual" => Ok(FlightMode::Manual),
            other => Err(StateError::Unknown {
                kind: "flight mode",
                value: other.to_string(),
            }),
        }
    }
}

// ── Pairing ────────────────────────────────────────────────────────

/// How a drone was paired. Only used to label the pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PairMethod {
    WiFi,
    DeviceId,
    QrCode,
}

impl PairMethod {
    pub fn label(&self) -> &'static str {
        match self {
            PairMethod::WiFi => "Wi-Fi",
            PairMethod::DeviceId => "Device ID",
            PairMethod::QrCode => "QR Code",
        }
    }
}

impl fmt::Display for PairMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PairMethod {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wifi" | "wi-fi" => Ok(PairMethod::WiFi),
            "device-id" | "device id" | "id" => Ok(PairMethod::DeviceId),
            "qr" | "qr-code" | "qr code" => Ok(PairMethod::QrCode),
            _ => Err(StateError::Unknown {
                kind: "pair method",
                value: s.to_string(),
            }),
        }
    }
}

// ── Plot ───────────────────────────────────────────────────────────

/// One subdivision of a surveyed area with its soil readings.
///
/// Each reading carries the display string shown to the operator and the
/// numeric value analytics run on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plot {
    pub id: PlotId,
    pub title: String,
    pub latitude: f64,
    pub longitude: f64,
    pub moisture: String,
    pub moisture_value: f64,
    pub ph: String,
    pub ph_value: f64,
    pub temperature: String,
    pub temperature_value: f64,
}

impl Plot {
    /// All numeric fields are finite.
    pub fn is_valid(&self) -> bool {
        [
            self.latitude,
            self.longitude,
            self.moisture_value,
            self.ph_value,
            self.temperature_value,
        ]
        .iter()
        .all(|v| v.is_finite())
    }

    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flight_mode_parse_is_exact() {
        assert_eq!("Auto".parse::<FlightMode>().unwrap(), FlightMode::Auto);
        assert_eq!("Manual".parse::<FlightMode>().unwrap(), FlightMode::Manual);
        assert!("manual".parse::<FlightMode>().is_err());
        assert!("".parse::<FlightMode>().is_err());
    }

    #[test]
    fn pair_method_aliases() {
        assert_eq!("wifi".parse::<PairMethod>().unwrap(), PairMethod::WiFi);
        assert_eq!("QR".parse::<PairMethod>().unwrap(), PairMethod::QrCode);
        assert_eq!(PairMethod::DeviceId.to_string(), "Device ID");
        assert!("bluetooth".parse::<PairMethod>().is_err());
    }

    #[test]
    fn geo_point_parse() {
        let p: GeoPoint = "10.5424, 123.9448".parse().unwrap();
        assert_eq!(p, GeoPoint::new(10.5424, 123.9448));
        assert!("10.5".parse::<GeoPoint>().is_err());
        assert!("NaN,1".parse::<GeoPoint>().is_err());
    }

    #[test]
    fn area_selection_requires_four_points() {
        let three = [GeoPoint::new(0.0, 0.0); 3];
        let err = AreaSelection::try_from(&three[..]).unwrap_err();
        assert!(matches!(
            err,
            StateError::IncompleteArea {
                expected: 4,
                actual: 3
            }
        ));

        let four = [GeoPoint::new(1.0, 2.0); 4];
        assert!(AreaSelection::try_from(&four[..]).is_ok());
    }

    #[test]
    fn plot_serializes_camel_case() {
        let plot = Plot {
            id: "plot1".into(),
            title: "Plot 1".into(),
            latitude: 1.0,
            longitude: 2.0,
            moisture: "Dry (20%)".into(),
            moisture_value: 20.0,
            ph: "6.5".into(),
            ph_value: 6.5,
            temperature: "25°C".into(),
            temperature_value: 25.0,
        };
        let json = serde_json::to_value(&plot).unwrap();
        assert_eq!(json["moistureValue"], 20.0);
        assert_eq!(json["phValue"], 6.5);
        assert_eq!(json["temperatureValue"], 25.0);
        assert!(plot.is_valid());

        let mut bad = plot;
        bad.ph_value = f64::INFINITY;
        assert!(!bad.is_valid());
    }
}

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Latitude/longitude pair. Serialized as `[lat, lng]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coords {
    pub lat: f64,
    pub lng: f64,
}

impl Coords {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<[f64; 2]> for Coords {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<Coords> for [f64; 2] {
    fn from(c: Coords) -> Self {
        [c.lat, c.lng]
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5},{:.5}", self.lat, self.lng)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutKind {
    Running,
    Cycling,
}

impl WorkoutKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Cycling => "cycling",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Cycling => "Cycling",
        }
    }

    pub const fn icon(self) -> &'static str {
        match self {
            Self::Running => "🏃",
            Self::Cycling => "🚴‍♀️",
        }
    }
}

impl fmt::Display for WorkoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-specific payload, with its derived metric cached at construction.
#[derive(Debug, Clone, PartialEq)]
pub enum Activity {
    Running { cadence: f64, pace: f64 },
    Cycling { elevation_gain: f64, speed: f64 },
}

/// Derived performance figure shown next to a workout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metric {
    pub value: f64,
    pub unit: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub coords: Coords,
    pub distance: f64,
    pub duration: f64,
    pub description: String,
    pub activity: Activity,
}

impl Workout {
    /// Build a running workout. `pace` is minutes per kilometre.
    ///
    /// Inputs are not checked here; see [`crate::input`].
    pub fn running(
        id: String,
        created_at: DateTime<Utc>,
        coords: Coords,
        distance: f64,
        duration: f64,
        cadence: f64,
    ) -> Self {
        let pace = duration / distance;
        Self {
            id,
            created_at,
            coords,
            distance,
            duration,
            description: describe(WorkoutKind::Running, created_at),
            activity: Activity::Running { cadence, pace },
        }
    }

    /// Build a cycling workout. `speed` is kilometres per hour.
    pub fn cycling(
        id: String,
        created_at: DateTime<Utc>,
        coords: Coords,
        distance: f64,
        duration: f64,
        elevation_gain: f64,
    ) -> Self {
        let speed = distance / (duration / 60.0);
        Self {
            id,
            created_at,
            coords,
            distance,
            duration,
            description: describe(WorkoutKind::Cycling, created_at),
            activity: Activity::Cycling {
                elevation_gain,
                speed,
            },
        }
    }

    pub const fn kind(&self) -> WorkoutKind {
        match self.activity {
            Activity::Running { .. } => WorkoutKind::Running,
            Activity::Cycling { .. } => WorkoutKind::Cycling,
        }
    }

    pub const fn metric(&self) -> Metric {
        match self.activity {
            Activity::Running { pace, .. } => Metric {
                value: pace,
                unit: "min/km",
            },
            Activity::Cycling { speed, .. } => Metric {
                value: speed,
                unit: "km/h",
            },
        }
    }

    pub fn popup_content(&self) -> String {
        format!("{} {}", self.kind().icon(), self.description)
    }
}

/// "<Kind> on <Month> <day>", e.g. "Running on April 14", using the local
/// calendar date of `created_at`.
pub fn describe(kind: WorkoutKind, created_at: DateTime<Utc>) -> String {
    describe_in(kind, created_at, &Local)
}

pub fn describe_in<Tz>(kind: WorkoutKind, created_at: DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let local = created_at.with_timezone(tz);
    format!("{} on {}", kind.label(), local.format("%B %-d"))
}

/// Plain persisted shape of a workout.
///
/// Field names follow the stored JSON layout; derived fields are kept for
/// readers of the raw data but are recomputed on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub coords: Coords,
    pub distance: f64,
    pub duration: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub detail: RecordDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RecordDetail {
    Running {
        cadence: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pace: Option<f64>,
    },
    Cycling {
        #[serde(rename = "elevationGain")]
        elevation_gain: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        speed: Option<f64>,
    },
}

/// Ids may have been stored as JSON numbers.
fn string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(u64),
    }

    Ok(match Id::deserialize(d)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

impl From<&Workout> for WorkoutRecord {
    fn from(w: &Workout) -> Self {
        let detail = match w.activity {
            Activity::Running { cadence, pace } => RecordDetail::Running {
                cadence,
                pace: Some(pace),
            },
            Activity::Cycling {
                elevation_gain,
                speed,
            } => RecordDetail::Cycling {
                elevation_gain,
                speed: Some(speed),
            },
        };
        Self {
            id: w.id.clone(),
            created_at: w.created_at,
            coords: w.coords,
            distance: w.distance,
            duration: w.duration,
            description: Some(w.description.clone()),
            detail,
        }
    }
}

impl WorkoutRecord {
    pub const fn kind(&self) -> WorkoutKind {
        match self.detail {
            RecordDetail::Running { .. } => WorkoutKind::Running,
            RecordDetail::Cycling { .. } => WorkoutKind::Cycling,
        }
    }

    /// Rebuild through the constructors so `pace`/`speed` and `description`
    /// are re-derived rather than trusted from storage.
    pub fn into_workout(self) -> Workout {
        match self.detail {
            RecordDetail::Running { cadence, .. } => Workout::running(
                self.id,
                self.created_at,
                self.coords,
                self.distance,
                self.duration,
                cadence,
            ),
            RecordDetail::Cycling { elevation_gain, .. } => Workout::cycling(
                self.id,
                self.created_at,
                self.coords,
                self.distance,
                self.duration,
                elevation_gain,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn running_pace_is_minutes_per_km() {
        let w = Workout::running(
            "1".into(),
            at(2024, 4, 14),
            Coords::new(39.0, -12.0),
            5.2,
            24.0,
            178.0,
        );
        assert_eq!(w.kind(), WorkoutKind::Running);
        let m = w.metric();
        assert!((m.value - 24.0 / 5.2).abs() < 1e-12);
        assert_eq!(m.unit, "min/km");
    }

    #[test]
    fn cycling_speed_is_km_per_hour() {
        let w = Workout::cycling(
            "2".into(),
            at(2024, 4, 14),
            Coords::new(39.0, 24.0),
            27.0,
            95.0,
            523.0,
        );
        let m = w.metric();
        assert!((m.value - 27.0 / (95.0 / 60.0)).abs() < 1e-12);
        assert!((m.value - 17.05).abs() < 0.01);
        assert_eq!(m.unit, "km/h");
    }

    #[test]
    fn description_uses_full_month_and_plain_day() {
        let utc = FixedOffset::east_opt(0).unwrap();
        assert_eq!(
            describe_in(WorkoutKind::Running, at(2024, 1, 5), &utc),
            "Running on January 5"
        );
        assert_eq!(
            describe_in(WorkoutKind::Cycling, at(2023, 12, 31), &utc),
            "Cycling on December 31"
        );
    }

    #[test]
    fn description_follows_the_local_calendar_day() {
        let late_evening_utc = Utc.with_ymd_and_hms(2024, 4, 15, 3, 0, 0).unwrap();
        let los_angeles = FixedOffset::west_opt(7 * 3600).unwrap();
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();

        assert_eq!(
            describe_in(WorkoutKind::Running, late_evening_utc, &los_angeles),
            "Running on April 14"
        );
        assert_eq!(
            describe_in(WorkoutKind::Running, late_evening_utc, &tokyo),
            "Running on April 15"
        );

        let local_day = late_evening_utc.with_timezone(&Local).format("%B %-d");
        assert_eq!(
            describe(WorkoutKind::Running, late_evening_utc),
            format!("Running on {local_day}")
        );
    }

    #[test]
    fn popup_content_prefixes_icon() {
        let w = Workout::cycling(
            "3".into(),
            at(2024, 9, 1),
            Coords::new(0.0, 0.0),
            10.0,
            30.0,
            0.0,
        );
        assert_eq!(
            w.popup_content(),
            format!("🚴‍♀️ {}", describe(WorkoutKind::Cycling, at(2024, 9, 1)))
        );
    }

    #[test]
    fn record_json_has_flat_kind_specific_fields() {
        let w = Workout::running(
            "0123456789".into(),
            at(2024, 4, 14),
            Coords::new(39.0, -12.0),
            5.0,
            25.0,
            170.0,
        );
        let v = serde_json::to_value(WorkoutRecord::from(&w)).unwrap();
        assert_eq!(v["id"], "0123456789");
        assert_eq!(v["kind"], "running");
        assert_eq!(v["coords"], serde_json::json!([39.0, -12.0]));
        assert_eq!(v["cadence"], 170.0);
        assert_eq!(v["pace"], 5.0);
        assert_eq!(v["description"], w.description.as_str());
        assert!(v.get("createdAt").is_some());
        assert!(v.get("elevationGain").is_none());
    }

    #[test]
    fn stale_derived_fields_are_recomputed_on_rebuild() {
        let raw = r#"{
            "id": "42",
            "createdAt": "2024-06-02T08:00:00Z",
            "coords": [39.0, 24.0],
            "distance": 30.0,
            "duration": 60.0,
            "kind": "cycling",
            "description": "whatever",
            "elevationGain": -12.0,
            "speed": 999.0
        }"#;
        let rec: WorkoutRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(rec.kind(), WorkoutKind::Cycling);
        let w = rec.into_workout();
        assert_eq!(
            w.description,
            describe(
                WorkoutKind::Cycling,
                Utc.with_ymd_and_hms(2024, 6, 2, 8, 0, 0).unwrap()
            )
        );
        assert_eq!(
            w.activity,
            Activity::Cycling {
                elevation_gain: -12.0,
                speed: 30.0
            }
        );
    }

    #[test]
    fn numeric_ids_are_read_as_text() {
        let raw = r#"{
            "id": 1713096000,
            "createdAt": "2024-04-14T12:00:00Z",
            "coords": [39.0, -12.0],
            "distance": 5.0,
            "duration": 25.0,
            "kind": "running",
            "cadence": 170
        }"#;
        let rec: WorkoutRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(rec.id, "1713096000");
        assert_eq!(rec.into_workout().metric().value, 5.0);
    }
}

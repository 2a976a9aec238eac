//! Workout records and submission validation

use std::fmt;

use chrono::{DateTime, SubsecRound, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Kind of training session.
///
/// Stored as its lowercase name. Unrecognized names are kept verbatim so
/// records written by newer versions still load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WorkoutType {
    Cardio,
    Strength,
    Skills,
    Match,
    Recovery,
    Other(String),
}

impl WorkoutType {
    /// Every built-in type, in menu order
    pub const KNOWN: [WorkoutType; 5] = [
        WorkoutType::Cardio,
        WorkoutType::Strength,
        WorkoutType::Skills,
        WorkoutType::Match,
        WorkoutType::Recovery,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            WorkoutType::Cardio => "cardio",
            WorkoutType::Strength => "strength",
            WorkoutType::Skills => "skills",
            WorkoutType::Match => "match",
            WorkoutType::Recovery => "recovery",
            WorkoutType::Other(raw) => raw,
        }
    }

    /// Display label; unknown types show their raw name
    pub fn label(&self) -> &str {
        match self {
            WorkoutType::Cardio => "Cardio / Running",
            WorkoutType::Strength => "Strength Training",
            WorkoutType::Skills => "Ball Skills",
            WorkoutType::Match => "Match / Scrimmage",
            WorkoutType::Recovery => "Recovery",
            WorkoutType::Other(raw) => raw,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            WorkoutType::Cardio => "🏃",
            WorkoutType::Strength => "💪",
            WorkoutType::Skills => "⚽",
            WorkoutType::Match => "🏟️",
            WorkoutType::Recovery => "🧘",
            WorkoutType::Other(_) => "🏋️",
        }
    }
}

impl From<String> for WorkoutType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "cardio" => WorkoutType::Cardio,
            "strength" => WorkoutType::Strength,
            "skills" => WorkoutType::Skills,
            "match" => WorkoutType::Match,
            "recovery" => WorkoutType::Recovery,
            _ => WorkoutType::Other(raw),
        }
    }
}

impl From<WorkoutType> for String {
    fn from(kind: WorkoutType) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for WorkoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.icon(), self.label())
    }
}

/// One logged training session. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: WorkoutType,
    /// Minutes
    pub duration: u32,
    /// 1 to 10
    pub intensity: u8,
    #[serde(default)]
    pub notes: String,
    #[serde(with = "iso_millis")]
    pub date: DateTime<Utc>,
}

impl WorkoutRecord {
    /// `<icon> <label> · <duration> min · Intensity <n>/10`
    pub fn summary(&self) -> String {
        format!(
            "{} · {} min · Intensity {}/10",
            self.kind, self.duration, self.intensity
        )
    }
}

/// Raw form input for a new workout, before validation
#[derive(Debug, Clone, Default)]
pub struct Candidate {
    pub kind: Option<String>,
    pub duration: Option<String>,
    pub intensity: Option<String>,
    pub notes: Option<String>,
}

/// A candidate that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidWorkout {
    pub kind: WorkoutType,
    pub duration: u32,
    pub intensity: u8,
    pub notes: String,
}

impl Candidate {
    /// Check fields in form order; the first failure wins.
    pub fn validate(&self) -> Result<ValidWorkout, ValidationError> {
        let kind = self
            .kind
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(ValidationError::MissingType)?;

        let duration = self
            .duration
            .as_deref()
            .and_then(|d| d.trim().parse::<u32>().ok())
            .filter(|d| *d >= 1)
            .ok_or(ValidationError::InvalidDuration)?;

        let intensity = self
            .intensity
            .as_deref()
            .and_then(|i| i.trim().parse::<u8>().ok())
            .filter(|i| (1..=10).contains(i))
            .ok_or(ValidationError::InvalidIntensity)?;

        Ok(ValidWorkout {
            kind: WorkoutType::from(kind.to_string()),
            duration,
            intensity,
            notes: self
                .notes
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
        })
    }
}

impl ValidWorkout {
    /// Stamp with an id and creation time
    pub fn into_record(self, id: String, date: DateTime<Utc>) -> WorkoutRecord {
        WorkoutRecord {
            id,
            kind: self.kind,
            duration: self.duration,
            intensity: self.intensity,
            notes: self.notes,
            date: date.trunc_subsecs(3),
        }
    }
}

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// `workout_<unix millis>_<9 base-36 chars>`
pub fn generate_id(now: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("workout_{}_{}", now.timestamp_millis(), suffix)
}

/// ISO-8601 UTC timestamps with millisecond precision
mod iso_millis {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn candidate(kind: &str, duration: &str, intensity: &str) -> Candidate {
        Candidate {
            kind: Some(kind.to_string()),
            duration: Some(duration.to_string()),
            intensity: Some(intensity.to_string()),
            notes: None,
        }
    }

    #[test]
    fn test_known_type_labels() {
        assert_eq!(WorkoutType::Cardio.to_string(), "🏃 Cardio / Running");
        assert_eq!(WorkoutType::Match.to_string(), "🏟️ Match / Scrimmage");
        assert_eq!(WorkoutType::from("recovery".to_string()), WorkoutType::Recovery);
    }

    #[test]
    fn test_unknown_type_uses_raw_label_and_generic_icon() {
        let kind = WorkoutType::from("yoga".to_string());
        assert_eq!(kind, WorkoutType::Other("yoga".to_string()));
        assert_eq!(kind.label(), "yoga");
        assert_eq!(kind.icon(), "🏋️");
    }

    #[test]
    fn test_validate_accepts_minimum_values() {
        let valid = candidate("cardio", "1", "1").validate().unwrap();
        assert_eq!(valid.duration, 1);
        assert_eq!(valid.intensity, 1);
        assert_eq!(valid.notes, "");
    }

    #[test]
    fn test_validate_missing_type() {
        let mut c = candidate("", "30", "7");
        assert_eq!(c.validate(), Err(ValidationError::MissingType));
        c.kind = None;
        assert_eq!(c.validate(), Err(ValidationError::MissingType));
    }

    #[test]
    fn test_validate_duration() {
        for bad in ["0", "-5", "abc", ""] {
            assert_eq!(
                candidate("cardio", bad, "7").validate(),
                Err(ValidationError::InvalidDuration),
                "duration {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_validate_intensity_bounds() {
        for bad in ["0", "11", "x"] {
            assert_eq!(
                candidate("cardio", "30", bad).validate(),
                Err(ValidationError::InvalidIntensity),
                "intensity {:?}",
                bad
            );
        }
        assert!(candidate("cardio", "30", "10").validate().is_ok());
    }

    #[test]
    fn test_type_checked_before_duration() {
        assert_eq!(
            candidate("", "0", "0").validate(),
            Err(ValidationError::MissingType)
        );
    }

    #[test]
    fn test_notes_are_trimmed() {
        let mut c = candidate("skills", "45", "6");
        c.notes = Some("  rondo drills \n".to_string());
        assert_eq!(c.validate().unwrap().notes, "rondo drills");
    }

    #[test]
    fn test_summary_line() {
        let record = candidate("cardio", "30", "7")
            .validate()
            .unwrap()
            .into_record("workout_1_abc".to_string(), Utc::now());
        assert_eq!(record.summary(), "🏃 Cardio / Running · 30 min · Intensity 7/10");
    }

    #[test]
    fn test_record_json_shape() {
        let date = Utc.with_ymd_and_hms(2024, 3, 5, 18, 30, 0).unwrap();
        let record = candidate("strength", "40", "8")
            .validate()
            .unwrap()
            .into_record("workout_1709663400000_k3j9x0abc".to_string(), date);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "strength");
        assert_eq!(json["date"], "2024-03-05T18:30:00.000Z");
        assert_eq!(json["notes"], "");
    }

    #[test]
    fn test_record_tolerates_unknown_type_in_json() {
        let json = r#"{"id":"w1","type":"yoga","duration":20,"intensity":3,"notes":"","date":"2024-01-01T08:00:00.000Z"}"#;
        let record: WorkoutRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.kind.label(), "yoga");
    }

    #[test]
    fn test_generate_id_format() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let id = generate_id(now);
        let parts: Vec<&str> = id.split('_').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "workout");
        assert_eq!(parts[1], "1700000000123");
        assert_eq!(parts[2].len(), 9);
        assert!(parts[2].chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }
}

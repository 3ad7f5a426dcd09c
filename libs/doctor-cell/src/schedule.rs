use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde_json::Value;
use tracing::debug;

/// Schedule keys as stored in the doctor record, Monday first.
pub const WEEKDAY_KEYS: [&str; 7] = [
    "senin", "selasa", "rabu", "kamis", "jumat", "sabtu", "minggu",
];

/// Display names used in user-facing messages, Monday first.
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Senin", "Selasa", "Rabu", "Kamis", "Jumat", "Sabtu", "Minggu",
];

/// Fixed table lookup so weekday resolution never depends on the host locale.
pub fn weekday_key(date: NaiveDate) -> &'static str {
    WEEKDAY_KEYS[date.weekday().num_days_from_monday() as usize]
}

pub fn weekday_name(date: NaiveDate) -> &'static str {
    WEEKDAY_NAMES[date.weekday().num_days_from_monday() as usize]
}

/// Practice hours for one weekday, parsed from an "HH:MM-HH:MM" string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PracticeHours {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl PracticeHours {
    pub fn parse(raw: &str) -> Option<Self> {
        let (open_str, close_str) = raw.split_once('-')?;
        let open = NaiveTime::parse_from_str(open_str.trim(), "%H:%M").ok()?;
        let close = NaiveTime::parse_from_str(close_str.trim(), "%H:%M").ok()?;
        if open >= close {
            return None;
        }
        Some(Self { open, close })
    }

    /// Closing time is bookable: a request at exactly `close` is accepted.
    pub fn contains(&self, time: NaiveTime) -> bool {
        self.open <= time && time <= self.close
    }

    pub fn display(&self) -> String {
        format!(
            "{} - {}",
            self.open.format("%H:%M"),
            self.close.format("%H:%M")
        )
    }

    pub fn open_hour(&self) -> u32 {
        chrono::Timelike::hour(&self.open)
    }

    pub fn close_hour(&self) -> u32 {
        chrono::Timelike::hour(&self.close)
    }
}

/// A doctor's weekly practice schedule, kept at rest as a JSON object string
/// (`{"senin":"08:00-14:00","rabu":"08:00-12:00"}`). Parsing is lenient:
/// malformed JSON or malformed entries degrade to missing days, never to an
/// error, so a bad schedule blob reads as "does not practice".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeeklySchedule {
    days: [Option<PracticeHours>; 7],
}

impl WeeklySchedule {
    pub fn parse(raw: Option<&str>) -> Self {
        let mut days = [None; 7];

        let Some(raw) = raw else {
            return Self { days };
        };

        let map: HashMap<String, Value> = match serde_json::from_str(raw) {
            Ok(Value::Object(obj)) => obj.into_iter().collect(),
            Ok(_) | Err(_) => {
                debug!("Unparseable practice schedule, treating as empty");
                return Self { days };
            }
        };

        for (index, key) in WEEKDAY_KEYS.iter().enumerate() {
            if let Some(Value::String(hours)) = map.get(*key) {
                days[index] = PracticeHours::parse(hours);
            }
        }

        Self { days }
    }

    pub fn hours_for(&self, date: NaiveDate) -> Option<&PracticeHours> {
        self.days[date.weekday().num_days_from_monday() as usize].as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.days.iter().all(Option::is_none)
    }

    /// Present days in Monday-first order, as (key, hours) pairs.
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, &PracticeHours)> {
        self.days
            .iter()
            .enumerate()
            .filter_map(|(index, hours)| hours.as_ref().map(|h| (WEEKDAY_KEYS[index], h)))
    }

    /// Serializable day -> "HH:MM-HH:MM" mapping for API responses.
    pub fn to_map(&self) -> serde_json::Map<String, Value> {
        self.entries()
            .map(|(key, hours)| {
                (
                    key.to_string(),
                    Value::String(format!(
                        "{}-{}",
                        hours.open.format("%H:%M"),
                        hours.close.format("%H:%M")
                    )),
                )
            })
            .collect()
    }
}

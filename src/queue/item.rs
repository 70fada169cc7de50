//! Timer item structures and field helpers

use std::fmt;

use serde::{Deserialize, Serialize};

/// Upper bound for the minutes field accepted from the front-end
pub const MAX_MINUTES: u32 = 99;
/// Upper bound for the seconds field accepted from the front-end
pub const MAX_SECONDS: u32 = 59;

/// Process-local identity of a queued item. Never reused within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The field-only part of a segment, as stored in presets and carried by
/// completion notices
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemFields {
    pub minutes: u32,
    pub seconds: u32,
    /// Target speed in km/h. Informational only.
    pub speed: f64,
}

impl ItemFields {
    pub fn new(minutes: u32, seconds: u32, speed: f64) -> Self {
        Self { minutes, seconds, speed }
    }

    /// Total length in seconds
    pub fn duration(&self) -> u64 {
        u64::from(self.minutes) * 60 + u64::from(self.seconds)
    }

    /// A zero-length segment can never become active
    pub fn is_playable(&self) -> bool {
        self.duration() > 0
    }
}

impl Default for ItemFields {
    fn default() -> Self {
        Self::new(1, 0, 5.0)
    }
}

impl fmt::Display for ItemFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}m {}s @ {} km/h", self.minutes, self.seconds, self.speed)
    }
}

/// One workout segment in the queue
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimerItem {
    pub id: ItemId,
    #[serde(flatten)]
    pub fields: ItemFields,
}

impl TimerItem {
    pub fn duration(&self) -> u64 {
        self.fields.duration()
    }
}

/// Partial update for an item. Absent fields are left untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemPatch {
    #[serde(default)]
    pub minutes: Option<u32>,
    #[serde(default)]
    pub seconds: Option<u32>,
    #[serde(default)]
    pub speed: Option<f64>,
}

impl ItemPatch {
    /// Clamp every present field into the range the front-end allows
    pub fn clamped(self) -> Self {
        Self {
            minutes: self.minutes.map(|m| m.min(MAX_MINUTES)),
            seconds: self.seconds.map(|s| s.min(MAX_SECONDS)),
            speed: self
                .speed
                .map(|s| if s.is_finite() { s.max(0.0) } else { 0.0 }),
        }
    }

    pub(crate) fn apply(&self, fields: &mut ItemFields) {
        if let Some(minutes) = self.minutes {
            fields.minutes = minutes;
        }
        if let Some(seconds) = self.seconds {
            fields.seconds = seconds;
        }
        if let Some(speed) = self.speed {
            fields.speed = speed;
        }
    }
}

/// Render a second count as zero-padded `MM:SS`
pub fn format_time(total_secs: u64) -> String {
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_combines_minutes_and_seconds() {
        assert_eq!(ItemFields::new(1, 30, 6.0).duration(), 90);
        assert_eq!(ItemFields::new(0, 0, 6.0).duration(), 0);
        assert!(!ItemFields::new(0, 0, 6.0).is_playable());
        // seconds past 59 are not rejected, only counted
        assert_eq!(ItemFields::new(0, 75, 0.0).duration(), 75);
    }

    #[test]
    fn patch_clamps_to_front_end_ranges() {
        let patch = ItemPatch {
            minutes: Some(150),
            seconds: Some(75),
            speed: Some(-3.0),
        }
        .clamped();
        assert_eq!(patch.minutes, Some(99));
        assert_eq!(patch.seconds, Some(59));
        assert_eq!(patch.speed, Some(0.0));

        let nan = ItemPatch { speed: Some(f64::NAN), ..Default::default() }.clamped();
        assert_eq!(nan.speed, Some(0.0));
    }

    #[test]
    fn format_time_pads() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(90), "01:30");
        assert_eq!(format_time(6000), "100:00");
    }

    #[test]
    fn item_serializes_flat() {
        let item = TimerItem { id: ItemId(7), fields: ItemFields::new(2, 5, 8.5) };
        let json = serde_json::to_value(item).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["minutes"], 2);
        assert_eq!(json["seconds"], 5);
        assert_eq!(json["speed"], 8.5);
    }
}

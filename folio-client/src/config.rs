use chrono::Duration;

use crate::history::DEFAULT_CAPACITY;

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum AutosaveInterval {
    TenSeconds,
    #[default]
    ThirtySeconds,
    OneMinute,
    FiveMinutes,
}

impl AutosaveInterval {
    pub const ALL: [AutosaveInterval; 4] = [
        AutosaveInterval::TenSeconds,
        AutosaveInterval::ThirtySeconds,
        AutosaveInterval::OneMinute,
        AutosaveInterval::FiveMinutes,
    ];

    pub fn duration(self) -> Duration {
        match self {
            AutosaveInterval::TenSeconds => Duration::seconds(10),
            AutosaveInterval::ThirtySeconds => Duration::seconds(30),
            AutosaveInterval::OneMinute => Duration::minutes(1),
            AutosaveInterval::FiveMinutes => Duration::minutes(5),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AutosaveInterval::TenSeconds => "10 seconds",
            AutosaveInterval::ThirtySeconds => "30 seconds",
            AutosaveInterval::OneMinute => "1 minute",
            AutosaveInterval::FiveMinutes => "5 minutes",
        }
    }

    /// Stable name, used as the value of the settings drop-down
    pub fn name(self) -> &'static str {
        match self {
            AutosaveInterval::TenSeconds => "10s",
            AutosaveInterval::ThirtySeconds => "30s",
            AutosaveInterval::OneMinute => "1m",
            AutosaveInterval::FiveMinutes => "5m",
        }
    }

    pub fn from_name(name: &str) -> Option<AutosaveInterval> {
        AutosaveInterval::ALL.into_iter().find(|i| i.name() == name)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Maximum number of snapshots kept for undo
    pub history_capacity: usize,

    /// Typing inactivity after which a snapshot is recorded
    pub debounce_ms: u64,

    pub autosave_interval: AutosaveInterval,
}

impl Default for EditorConfig {
    fn default() -> EditorConfig {
        EditorConfig {
            history_capacity: DEFAULT_CAPACITY,
            debounce_ms: 1000,
            autosave_interval: AutosaveInterval::default(),
        }
    }
}

impl EditorConfig {
    pub fn debounce(&self) -> Duration {
        Duration::milliseconds(i64::try_from(self.debounce_ms).unwrap_or(i64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = EditorConfig::default();
        assert_eq!(c.history_capacity, 50);
        assert_eq!(c.debounce(), Duration::seconds(1));
        assert_eq!(c.autosave_interval.duration(), Duration::seconds(30));
    }

    #[test]
    fn partial_settings_fill_in_defaults() {
        let c: EditorConfig = serde_json::from_str(r#"{"autosaveInterval": "OneMinute"}"#).unwrap();
        assert_eq!(c.autosave_interval, AutosaveInterval::OneMinute);
        assert_eq!(c.debounce_ms, 1000);
    }

    #[test]
    fn interval_names() {
        for i in AutosaveInterval::ALL {
            assert_eq!(AutosaveInterval::from_name(i.name()), Some(i));
        }
        assert_eq!(AutosaveInterval::from_name("2h"), None);
    }
}

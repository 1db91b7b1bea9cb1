//! Durable scheduler state.
//!
//! The file is a small JSON document `{"active", "mode", "lastRun"}` written
//! only by the scheduler. Writes go to a sibling temp file and are renamed
//! into place so a crash mid-write never leaves a truncated document.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::StateError;

/// Trigger cadence: fixed daily slots, or a short repeating interval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleMode {
    #[default]
    Standard,
    Test,
}

impl ScheduleMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ScheduleMode::Standard => "standard",
            ScheduleMode::Test => "test",
        }
    }
}

impl std::fmt::Display for ScheduleMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScheduleMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(ScheduleMode::Standard),
            "test" => Ok(ScheduleMode::Test),
            other => Err(format!("unknown schedule mode '{other}'")),
        }
    }
}

/// Clock the standard-mode hours are read against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScheduleZone {
    /// The host's local time.
    #[default]
    Local,
    Fixed(FixedOffset),
}

impl std::fmt::Display for ScheduleZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScheduleZone::Local => f.write_str("local"),
            ScheduleZone::Fixed(offset) => write!(f, "{offset}"),
        }
    }
}

impl FromStr for ScheduleZone {
    type Err = String;

    /// Accepts `local`, `utc`, or a UTC offset such as `-06:00`, `+0530` or `-6`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        if raw.eq_ignore_ascii_case("local") {
            return Ok(ScheduleZone::Local);
        }
        if raw.eq_ignore_ascii_case("utc") || raw == "Z" {
            return Ok(ScheduleZone::Fixed(Utc.fix()));
        }

        let (sign, digits) = match raw.split_at_checked(1) {
            Some(("+", rest)) => (1, rest),
            Some(("-", rest)) => (-1, rest),
            _ => return Err(format!("'{raw}' is not 'local', 'utc', or a +HH:MM offset")),
        };
        let (hours, minutes) = match digits.split_once(':') {
            Some((h, m)) => (h, m),
            None if digits.len() == 4 => digits.split_at(2),
            None => (digits, "0"),
        };
        let hours: u8 = hours
            .parse()
            .map_err(|_| format!("invalid offset hours in '{raw}'"))?;
        let minutes: u8 = minutes
            .parse()
            .map_err(|_| format!("invalid offset minutes in '{raw}'"))?;
        if hours > 14 || minutes > 59 {
            return Err(format!("offset '{raw}' is out of range"));
        }

        FixedOffset::east_opt(sign * (i32::from(hours) * 3600 + i32::from(minutes) * 60))
            .map(ScheduleZone::Fixed)
            .ok_or_else(|| format!("offset '{raw}' is out of range"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerState {
    pub active: bool,
    #[serde(default)]
    pub mode: ScheduleMode,
    /// Completion time of the last tick where every pipeline step succeeded.
    #[serde(default)]
    pub last_run: Option<DateTime<Utc>>,
}

/// Reads and writes [`SchedulerState`] at a fixed path.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the persisted state. A missing file yields the default
    /// (inactive) state.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Io`] if the file exists but cannot be read, or
    /// [`StateError::Parse`] if it is not a valid state document.
    pub fn load(&self) -> Result<SchedulerState, StateError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(SchedulerState::default());
            }
            Err(e) => return Err(self.io_error(e)),
        };

        serde_json::from_str(&raw).map_err(|e| StateError::Parse {
            path: self.path.display().to_string(),
            source: e,
        })
    }

    /// Replaces the persisted state with `state`.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Io`] if the file cannot be written.
    pub fn save(&self, state: &SchedulerState) -> Result<(), StateError> {
        let json = serde_json::to_string_pretty(state)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        std::fs::write(&tmp, json).map_err(|e| self.io_error(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))
    }

    fn io_error(&self, source: std::io::Error) -> StateError {
        StateError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

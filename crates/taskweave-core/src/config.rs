//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Working hours and the weekday-only scheduling window
//! - Slot discovery and placement tuning (slot length, buffer, search window)
//! - Target calendar and event timezone
//! - Breakdown model endpoint
//!
//! Configuration is stored at `~/.config/taskweave/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::scheduler::{PlacerConfig, SchedulerParams, SlotFinderConfig};

/// Working-hours configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkingHoursConfig {
    #[serde(default = "default_work_start_hour")]
    pub start_hour: u32,
    #[serde(default = "default_work_end_hour")]
    pub end_hour: u32,
}

/// Slot discovery and placement configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulingConfig {
    #[serde(default = "default_slot_minutes")]
    pub slot_minutes: i64,
    #[serde(default = "default_max_slots")]
    pub max_slots: usize,
    #[serde(default = "default_buffer_minutes")]
    pub buffer_minutes: i64,
    #[serde(default = "default_search_window_days")]
    pub search_window_days: i64,
}

/// Calendar collaborator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,
    /// IANA timezone stamped on created events.
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
}

/// Breakdown model endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    #[serde(default = "default_ollama_url")]
    pub base_url: String,
    #[serde(default = "default_ollama_model")]
    pub model: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/taskweave/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub working_hours: WorkingHoursConfig,
    #[serde(default)]
    pub scheduling: SchedulingConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub ollama: OllamaConfig,
}

impl Default for WorkingHoursConfig {
    fn default() -> Self {
        Self {
            start_hour: default_work_start_hour(),
            end_hour: default_work_end_hour(),
        }
    }
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            slot_minutes: default_slot_minutes(),
            max_slots: default_max_slots(),
            buffer_minutes: default_buffer_minutes(),
            search_window_days: default_search_window_days(),
        }
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            calendar_id: default_calendar_id(),
            time_zone: default_time_zone(),
        }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_ollama_url(),
            model: default_ollama_model(),
        }
    }
}

fn default_work_start_hour() -> u32 {
    9
}
fn default_work_end_hour() -> u32 {
    18
}
fn default_slot_minutes() -> i64 {
    60
}
fn default_max_slots() -> usize {
    20
}
fn default_buffer_minutes() -> i64 {
    30
}
fn default_search_window_days() -> i64 {
    14
}
fn default_calendar_id() -> String {
    "primary".to_string()
}
fn default_time_zone() -> String {
    "America/Los_Angeles".to_string()
}
fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}
fn default_ollama_model() -> String {
    "llama3.2:latest".to_string()
}

impl Config {
    /// Path to the configuration file.
    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(dir.join("taskweave").join("config.toml"))
    }

    /// Load from the default path, falling back to defaults when the file
    /// is missing or unreadable.
    pub fn load_or_default() -> Self {
        Self::path()
            .ok()
            .and_then(|path| std::fs::read_to_string(path).ok())
            .and_then(|raw| toml::from_str(&raw).ok())
            .map(|config: Config| config.sanitized())
            .unwrap_or_default()
    }

    /// Save to the default path, creating the directory if needed.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::SaveFailed {
                path: path.clone(),
                message: e.to_string(),
            })?;
        }
        let raw = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, raw).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Clamp out-of-range values back to defaults so the scheduling core
    /// never sees an impossible working-hours window.
    pub fn sanitized(mut self) -> Self {
        let hours = &mut self.working_hours;
        // 23 is the last hour `at_hour` can represent; 24 would cap the day
        // before it starts.
        if hours.end_hour > 23 || hours.start_hour >= hours.end_hour {
            *hours = WorkingHoursConfig::default();
        }
        if self.scheduling.slot_minutes <= 0 {
            self.scheduling.slot_minutes = default_slot_minutes();
        }
        if self.scheduling.buffer_minutes < 0 {
            self.scheduling.buffer_minutes = default_buffer_minutes();
        }
        if self.scheduling.search_window_days <= 0 {
            self.scheduling.search_window_days = default_search_window_days();
        }
        self
    }

    /// Scheduler tuning derived from this configuration.
    pub fn scheduler_params(&self) -> SchedulerParams {
        SchedulerParams {
            slots: SlotFinderConfig {
                work_start_hour: self.working_hours.start_hour,
                work_end_hour: self.working_hours.end_hour,
                slot_minutes: self.scheduling.slot_minutes,
                max_slots: self.scheduling.max_slots,
            },
            placer: PlacerConfig {
                buffer_minutes: self.scheduling.buffer_minutes,
                work_start_hour: self.working_hours.start_hour,
                work_end_hour: self.working_hours.end_hour,
            },
            search_days: self.scheduling.search_window_days,
            time_zone: self.calendar.time_zone.clone(),
        }
    }
}

//! # Taskweave Core Library
//!
//! This library provides the core business logic for Taskweave: breaking a
//! free-form task into schedulable work items and placing them into free
//! time on an external calendar. The CLI binary is a thin layer over this
//! library.
//!
//! ## Architecture
//!
//! - **Scheduling core**: slot discovery over busy periods, deadline-aware
//!   start selection, sequential back-to-back placement
//! - **Calendar**: normalized busy-period view behind read/write seam traits
//! - **Breakdown**: local-LLM collaborator producing the work item list
//! - **Extraction**: pluggable deadline parsing from task text
//!
//! ## Key Components
//!
//! - [`TaskScheduler`]: end-to-end scheduling pipeline
//! - [`SlotFinder`] / [`DeadlineScheduler`] / [`SequentialPlacer`]: the
//!   pipeline stages, usable on their own
//! - [`BusyCalendar`]: busy-period snapshot over a [`CalendarSource`]
//! - [`Config`]: application configuration management

pub mod breakdown;
pub mod calendar;
pub mod config;
pub mod error;
pub mod extract;
pub mod integrations;
pub mod scheduler;
pub mod task;

pub use breakdown::{BreakdownOutcome, BreakdownSource, OllamaBreakdown};
pub use calendar::{BusyCalendar, BusyInterval, RawEvent};
pub use config::Config;
pub use error::{BreakdownError, ConfigError, CoreError, OAuthError, Warning};
pub use extract::{DeadlineParser, RegexDeadlineParser};
pub use integrations::{CalendarSource, CalendarWriter, GoogleCalendar};
pub use scheduler::{
    DeadlineScheduler, FreeSlot, Placement, ScheduleOutcome, ScheduleRequest, ScheduledEvent,
    SequentialPlacer, SlotFinder, SlotFinderConfig, TaskScheduler,
};
pub use task::{Priority, TaskBreakdown, WorkItem};

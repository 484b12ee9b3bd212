use chrono::{DateTime, Utc};
use clap::Args;

use taskweave_core::breakdown::{BreakdownSource, OllamaBreakdown};
use taskweave_core::calendar::BusyCalendar;
use taskweave_core::extract::{DeadlineParser, RegexDeadlineParser};
use taskweave_core::scheduler::{ScheduleRequest, TaskScheduler};
use taskweave_core::{Config, GoogleCalendar, ScheduleOutcome, TaskBreakdown};

#[derive(Args)]
pub struct PlanArgs {
    /// The task to break down and schedule, in plain language
    /// (deadline phrases like "by March 15th" are picked up)
    pub text: String,
    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
    /// Compute the schedule without creating calendar events
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: PlanArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let now = Utc::now();

    let (deadline, cleaned) = RegexDeadlineParser.extract(&args.text, now);

    let source = OllamaBreakdown::new(&config.ollama.base_url, &config.ollama.model);
    let outcome = source.breakdown(&cleaned)?;
    let mut breakdown = outcome.breakdown;
    let mut warnings = outcome.warnings;
    breakdown.deadline = deadline;

    let google = GoogleCalendar::new();
    let mut scheduler = TaskScheduler::new(config.scheduler_params());
    if google.is_authenticated() {
        scheduler = scheduler.with_calendar(BusyCalendar::new(
            Box::new(GoogleCalendar::new()),
            config.calendar.calendar_id.clone(),
        ));
        if !args.dry_run {
            scheduler =
                scheduler.with_writer(Box::new(google), config.calendar.calendar_id.clone());
        }
    } else if !args.dry_run {
        eprintln!("note: not authenticated with Google; computing the schedule only");
    }

    let request = ScheduleRequest {
        items: breakdown.subtasks.clone(),
        deadline,
        search_start: now,
    };
    let schedule = scheduler.schedule(&request);
    warnings.extend(schedule.warnings.iter().cloned());

    if args.json {
        let payload = serde_json::json!({
            "main_task": breakdown.main_task,
            "subtasks": breakdown.subtasks,
            "total_estimated_time": breakdown.total_estimated_minutes,
            "deadline": breakdown.deadline,
            "start_time": schedule.start_time,
            "events": schedule.events,
            "warnings": warnings,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print_human(&breakdown, &schedule, deadline);
        for warning in &warnings {
            eprintln!("warning: {warning}");
        }
    }

    Ok(())
}

fn print_human(
    breakdown: &TaskBreakdown,
    schedule: &ScheduleOutcome,
    deadline: Option<DateTime<Utc>>,
) {
    println!("Task: {}", breakdown.main_task);
    if let Some(deadline) = deadline {
        println!("Deadline: {}", deadline.format("%Y-%m-%d %H:%M"));
    }
    println!(
        "Total estimated time: {} minutes across {} subtasks",
        breakdown.total_estimated_minutes,
        breakdown.subtasks.len()
    );
    println!("Schedule starts: {}", schedule.start_time.format("%Y-%m-%d %H:%M"));
    println!();

    for event in &schedule.events {
        let placement = &event.placement;
        println!(
            "  {} - {}  [{}] {}",
            placement.start.format("%Y-%m-%d %H:%M"),
            placement.end.format("%H:%M"),
            placement.item.priority.as_str(),
            placement.item.title,
        );
        if let Some(link) = &event.html_link {
            println!("      {link}");
        }
    }
}

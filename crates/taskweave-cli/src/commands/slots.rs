use chrono::{Duration, Utc};
use clap::Args;

use taskweave_core::calendar::BusyCalendar;
use taskweave_core::scheduler::SlotFinder;
use taskweave_core::{Config, GoogleCalendar};

#[derive(Args)]
pub struct SlotsArgs {
    /// Days ahead to search
    #[arg(long, default_value_t = 14)]
    pub days: i64,
    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: SlotsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let now = Utc::now();
    let range_end = now + Duration::days(args.days.max(1));

    // Without authentication the calendar reads as fully free.
    let google = GoogleCalendar::new();
    let (busy, warnings) = if google.is_authenticated() {
        BusyCalendar::new(Box::new(google), config.calendar.calendar_id.clone())
            .busy_periods(now, range_end)
    } else {
        eprintln!("note: not authenticated with Google; showing working-hours slots only");
        (Vec::new(), Vec::new())
    };

    let finder = SlotFinder::with_config(config.scheduler_params().slots);
    let slots = finder.find_slots(now, range_end, &busy);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&slots)?);
    } else {
        if slots.is_empty() {
            println!("no free slots in the next {} days", args.days);
        }
        for slot in &slots {
            println!(
                "  {} - {}",
                slot.start.format("%a %Y-%m-%d %H:%M"),
                slot.end.format("%H:%M")
            );
        }
    }
    for warning in &warnings {
        eprintln!("warning: {warning}");
    }

    Ok(())
}

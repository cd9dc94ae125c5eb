use anyhow::{Result, anyhow};
use lunchbook_schedule::{Clock, format_date, is_delivery_day, parse_date};

/// Ordering week of `date` as printed by `lunchbook anchor <date>`.
pub fn describe(clock: &Clock, date: &str) -> Result<String> {
    let delivery =
        parse_date(date).ok_or_else(|| anyhow!("invalid date '{date}', expected YYYY-MM-DD"))?;
    let week = clock.ordering_week(delivery);

    let mut lines = vec![
        format!("delivery: {}", format_date(delivery)),
        format!("anchor:   {}", format_date(week.anchor)),
        format!("deadline: {}", week.deadline_label),
        format!("window:   {}", week.window.message()),
    ];
    if !is_delivery_day(delivery) {
        lines.push("note:     not a Monday-Wednesday delivery day".to_owned());
    }

    Ok(lines.join("\n"))
}

pub fn run(config: &crate::config::Config, date: &str) -> Result<()> {
    let clock = Clock::new(
        config.schedule.timezone.to_owned(),
        config.schedule.cutoff_hour,
    );

    println!("{}", describe(&clock, date)?);

    Ok(())
}

//! The todo maintenance chore: archive finished rows, turn snooze
//! choices into concrete reminder dates.

use anyhow::{anyhow, Context, Result};
use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use console::style;
use tabloapp::backend::ApiBackend;
use tabloapp::{Database, Page, PropertyValue};

/// What a snooze option asks for.
enum Snooze {
    NextWeekday(Weekday),
    InDays(i64),
    InMonth(u32),
    Leave,
}

fn snooze_for(option: &str) -> Option<Snooze> {
    let snooze = match option {
        "Next Monday" => Snooze::NextWeekday(Weekday::Mon),
        "Next Tuesday" => Snooze::NextWeekday(Weekday::Tue),
        "Next Wednesday" => Snooze::NextWeekday(Weekday::Wed),
        "Next Thursday" => Snooze::NextWeekday(Weekday::Thu),
        "Next Friday" => Snooze::NextWeekday(Weekday::Fri),
        "Next Saturday" => Snooze::NextWeekday(Weekday::Sat),
        "Next Sunday" => Snooze::NextWeekday(Weekday::Sun),
        "In 1 Day" => Snooze::InDays(1),
        "In 7 Days" => Snooze::InDays(7),
        "In 1 Month" => Snooze::InDays(30),
        "In 2 Months" => Snooze::InDays(60),
        "In 1 Year" => Snooze::InDays(365),
        "In Jan" => Snooze::InMonth(1),
        "In Feb" => Snooze::InMonth(2),
        "In Mar" => Snooze::InMonth(3),
        "In Apr" => Snooze::InMonth(4),
        "In May" => Snooze::InMonth(5),
        "In Jun" => Snooze::InMonth(6),
        "In Jul" => Snooze::InMonth(7),
        "In Aug" => Snooze::InMonth(8),
        "In Sep" => Snooze::InMonth(9),
        "In Oct" => Snooze::InMonth(10),
        "In Nov" => Snooze::InMonth(11),
        "In Dec" => Snooze::InMonth(12),
        "In the US" => Snooze::Leave,
        _ => return None,
    };
    Some(snooze)
}

/// The next such weekday, always strictly in the future.
fn next_weekday(today: NaiveDate, target: Weekday) -> NaiveDate {
    let days_ahead = (target.num_days_from_monday() as i64
        - today.weekday().num_days_from_monday() as i64)
        .rem_euclid(7);
    let days_ahead = if days_ahead == 0 { 7 } else { days_ahead };
    today + Duration::days(days_ahead)
}

/// The first of the given month: this year while it is still ahead,
/// otherwise next year.
fn next_month_start(today: NaiveDate, month: u32) -> Result<NaiveDate> {
    let year = if month > today.month() {
        today.year()
    } else {
        today.year() + 1
    };
    NaiveDate::from_ymd_opt(year, month, 1).with_context(|| format!("invalid month {month}"))
}

/// Resolve a snooze option to a reminder date. `Ok(None)` means the row
/// should be left untouched.
fn reminder_for(today: NaiveDate, option: &str) -> Result<Option<NaiveDate>> {
    let snooze =
        snooze_for(option).ok_or_else(|| anyhow!("Unexpected snooze value: {option:?}"))?;
    Ok(match snooze {
        Snooze::NextWeekday(target) => Some(next_weekday(today, target)),
        Snooze::InDays(days) => Some(today + Duration::days(days)),
        Snooze::InMonth(month) => Some(next_month_start(today, month)?),
        Snooze::Leave => None,
    })
}

fn process_page<B: ApiBackend>(page: &Page<'_, B>, today: NaiveDate) -> Result<()> {
    // A done row only ever gets archived; its snooze stays untouched.
    if matches!(page.get("done")?, Some(PropertyValue::Checkbox(true))) {
        if page.get("archived")?.is_none() {
            page.set("archived", Utc::now())?;
        }
        return Ok(());
    }

    let option = match page.get("snooze")? {
        Some(PropertyValue::Text(option)) => option,
        _ => return Ok(()),
    };
    if let Some(date) = reminder_for(today, &option)? {
        println!("{} -> {}", option, date);
        let at = date
            .and_hms_opt(0, 0, 0)
            .context("reminder date out of range")?
            .and_utc();
        page.set("reminder", at)?;
        page.clear("snooze")?;
    }
    Ok(())
}

pub fn run(database: &str) -> Result<()> {
    let id = super::parse_database_id(database)?;
    let db = Database::from_env(id)?;
    // Shift the reference day back six hours so a 2am run still counts
    // as the previous evening.
    let today = (Utc::now() - Duration::hours(6)).date_naive();

    println!("{}", style("Processing rows...").bold());
    for page in db.pages() {
        process_page(&page?, today)?;
    }
    println!("{}", style("Processing done!").green());
    Ok(())
}

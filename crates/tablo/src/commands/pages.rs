use anyhow::Result;
use console::style;
use tabloapp::Database;

/// List every page, optionally restricted by a checkbox field's state.
pub fn run(database: &str, done: Option<&str>, not_done: Option<&str>) -> Result<()> {
    let id = super::parse_database_id(database)?;
    let db = Database::from_env(id)?;

    let filter = match (done, not_done) {
        (Some(field), _) => Some(db.filters()?.field(field)?.is_true()?),
        (_, Some(field)) => Some(db.filters()?.field(field)?.is_false()?),
        _ => None,
    };
    let query = match &filter {
        Some(filter) => db.query(filter),
        None => db.pages(),
    };

    let mut count = 0;
    for page in query {
        let page = page?;
        let title = page.title()?.unwrap_or_else(|| "(untitled)".to_string());
        println!(
            "{}  {}",
            style(title).bold(),
            style(page.last_edited().at.format("%Y-%m-%d %H:%M")).dim()
        );
        count += 1;
    }
    println!("{}", style(format!("{count} pages")).dim());
    Ok(())
}

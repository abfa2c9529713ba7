use anyhow::Result;
use console::style;
use tabloapp::Database;

/// Fetch and print a database's declared fields.
pub fn run(database: &str) -> Result<()> {
    let id = super::parse_database_id(database)?;
    let db = Database::from_env(id)?;
    let schema = db.schema()?;

    println!("{} ({} fields)", style(id).bold(), schema.len());
    for field in schema.fields() {
        let mut line = format!("  {} [{}]", style(&field.raw_name).cyan(), field.tag);
        if !field.options.is_empty() {
            line.push_str(&format!(" {{{}}}", field.options.join(", ")));
        }
        println!("{line}");
    }
    Ok(())
}

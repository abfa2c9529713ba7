pub mod inspect;
pub mod pages;
pub mod todo;

use anyhow::{Context, Result};
use uuid::Uuid;

/// Database ids arrive as UUIDs, with or without hyphens.
pub fn parse_database_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).with_context(|| format!("invalid database id {raw:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_parse_with_and_without_hyphens() {
        let spaced = parse_database_id("b8175b5c-632e-4c93-a92c-a3a1a8a5bf3e").unwrap();
        let packed = parse_database_id("b8175b5c632e4c93a92ca3a1a8a5bf3e").unwrap();
        assert_eq!(spaced, packed);

        assert!(parse_database_id("not-a-uuid").is_err());
    }
}

use std::collections::HashMap;

pub const STATUS_CONTINUING: u32 = 32037;
pub const STATUS_ENDED: u32 = 32038;
pub const STATUS_RELEASED: u32 = 32040;

/// Caller-supplied string resources, keyed by numeric id.
pub trait StringTable: Send + Sync {
    fn localized(&self, id: u32) -> Option<String>;
}

impl StringTable for HashMap<u32, String> {
    fn localized(&self, id: u32) -> Option<String> {
        self.get(&id).cloned()
    }
}

/// Translate an English status token from a provider.
///
/// Matching is case-insensitive and by substring; unknown tokens, or ids the
/// table has no string for, pass through unchanged.
pub fn translate_status(table: &dyn StringTable, status: &str) -> String {
    let lower = status.to_lowercase();
    let id = if lower.contains("continuing") {
        STATUS_CONTINUING
    } else if lower.contains("ended") {
        STATUS_ENDED
    } else if lower.contains("released") {
        STATUS_RELEASED
    } else {
        return status.to_string();
    };
    table.localized(id).unwrap_or_else(|| status.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dutch() -> HashMap<u32, String> {
        HashMap::from([
            (STATUS_CONTINUING, "Lopend".to_string()),
            (STATUS_ENDED, "Beëindigd".to_string()),
            (STATUS_RELEASED, "Uitgebracht".to_string()),
        ])
    }

    #[test]
    fn known_statuses_are_localized() {
        let table = dutch();
        assert_eq!(translate_status(&table, "Continuing"), "Lopend");
        assert_eq!(translate_status(&table, "Ended"), "Beëindigd");
        assert_eq!(translate_status(&table, "Released"), "Uitgebracht");
    }

    #[test]
    fn unknown_status_passes_through() {
        let table = dutch();
        assert_eq!(translate_status(&table, "In Production"), "In Production");
        assert_eq!(translate_status(&HashMap::new(), "Ended"), "Ended");
    }
}

/// Schema cleaned when nothing else is configured
pub const DEFAULT_SCHEMA: &str = "public";

/// Flyway's bookkeeping table, never truncated by default
pub const DEFAULT_EXCLUDED_TABLE: &str = "flyway_schema_history";

/// Which schema to reset and which of its tables to keep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetConfig {
    pub schema: String,
    pub excluded_tables: Vec<String>,
}

impl ResetConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    /// Keep `table` in addition to the tables already excluded.
    pub fn exclude_table(mut self, table: impl Into<String>) -> Self {
        let table = table.into();
        if !self.excluded_tables.contains(&table) {
            self.excluded_tables.push(table);
        }
        self
    }

    pub fn is_excluded(&self, table: &str) -> bool {
        self.excluded_tables.iter().any(|excluded| excluded == table)
    }
}

impl Default for ResetConfig {
    fn default() -> Self {
        Self {
            schema: DEFAULT_SCHEMA.to_string(),
            excluded_tables: vec![DEFAULT_EXCLUDED_TABLE.to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_default_keeps_flyway_history() {
        let config = ResetConfig::default();
        assert_eq!(config.schema, "public");
        assert!(config.is_excluded("flyway_schema_history"));
        assert!(!config.is_excluded("users"));
    }

    #[rstest]
    fn test_builder() {
        let config = ResetConfig::new()
            .with_schema("billing")
            .exclude_table("currencies")
            .exclude_table("currencies");
        assert_eq!(config.schema, "billing");
        assert_eq!(
            config.excluded_tables,
            vec!["flyway_schema_history".to_string(), "currencies".to_string()]
        );
    }

    #[rstest]
    #[case("Flyway_Schema_History")]
    #[case("flyway_schema_history ")]
    fn test_exclusion_is_exact(#[case] table: &str) {
        assert!(!ResetConfig::default().is_excluded(table));
    }
}

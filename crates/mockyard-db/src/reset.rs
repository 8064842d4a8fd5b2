use crate::config::ResetConfig;
use crate::error::ResetError;
use sqlx::PgPool;

const TABLES_QUERY: &str = "SELECT table_name::text FROM information_schema.tables \
     WHERE table_schema = $1 AND table_type = 'BASE TABLE' ORDER BY table_name";

const SEQUENCES_QUERY: &str = "SELECT sequence_name::text FROM information_schema.sequences \
     WHERE sequence_schema = $1 ORDER BY sequence_name";

/// What a reset touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResetReport {
    pub tables: Vec<String>,
    pub sequences: Vec<String>,
}

/// Empty every table in `public` except `flyway_schema_history` and restart
/// all sequences at 1.
pub async fn clean_database(pool: &PgPool) -> Result<ResetReport, ResetError> {
    clean_database_with(pool, &ResetConfig::default()).await
}

/// Like [`clean_database`] for the schema and exclusions in `config`.
///
/// Tables are truncated with `CASCADE`, so rows in excluded tables that
/// reference a truncated table are removed as well.
pub async fn clean_database_with(
    pool: &PgPool,
    config: &ResetConfig,
) -> Result<ResetReport, ResetError> {
    let tables: Vec<String> = sqlx::query_scalar(TABLES_QUERY)
        .bind(&config.schema)
        .fetch_all(pool)
        .await?
        .into_iter()
        .filter(|table: &String| !config.is_excluded(table))
        .collect();

    for table in &tables {
        tracing::debug!(schema = %config.schema, table = %table, "truncating table");
        sqlx::query(&truncate_table_sql(&config.schema, table))
            .execute(pool)
            .await?;
    }

    let sequences: Vec<String> = sqlx::query_scalar(SEQUENCES_QUERY)
        .bind(&config.schema)
        .fetch_all(pool)
        .await?;

    for sequence in &sequences {
        tracing::debug!(schema = %config.schema, sequence = %sequence, "restarting sequence");
        sqlx::query(&restart_sequence_sql(&config.schema, sequence))
            .execute(pool)
            .await?;
    }

    tracing::info!(
        schema = %config.schema,
        tables = tables.len(),
        sequences = sequences.len(),
        "database cleaned"
    );
    Ok(ResetReport { tables, sequences })
}

/// Quote an identifier for PostgreSQL, doubling embedded quotes.
fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn qualified(schema: &str, name: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(name))
}

fn truncate_table_sql(schema: &str, table: &str) -> String {
    format!("TRUNCATE TABLE {} CASCADE", qualified(schema, table))
}

fn restart_sequence_sql(schema: &str, sequence: &str) -> String {
    format!("ALTER SEQUENCE {} RESTART WITH 1", qualified(schema, sequence))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("users", "\"users\"")]
    #[case("Order Items", "\"Order Items\"")]
    #[case("odd\"name", "\"odd\"\"name\"")]
    #[case("", "\"\"")]
    fn test_quote_ident(#[case] ident: &str, #[case] expected: &str) {
        assert_eq!(quote_ident(ident), expected);
    }

    #[rstest]
    fn test_truncate_table_sql() {
        assert_eq!(
            truncate_table_sql("public", "users"),
            "TRUNCATE TABLE \"public\".\"users\" CASCADE"
        );
    }

    #[rstest]
    fn test_restart_sequence_sql() {
        assert_eq!(
            restart_sequence_sql("public", "users_id_seq"),
            "ALTER SEQUENCE \"public\".\"users_id_seq\" RESTART WITH 1"
        );
    }

    #[rstest]
    fn test_injection_stays_inside_identifier() {
        let sql = truncate_table_sql("public", "x\"; DROP TABLE users; --");
        assert_eq!(
            sql,
            "TRUNCATE TABLE \"public\".\"x\"\"; DROP TABLE users; --\" CASCADE"
        );
    }

    #[rstest]
    fn test_catalog_queries_are_parameterized() {
        assert!(TABLES_QUERY.contains("table_schema = $1"));
        assert!(TABLES_QUERY.contains("'BASE TABLE'"));
        assert!(SEQUENCES_QUERY.contains("sequence_schema = $1"));
    }
}

//! Compile-time tracing of produced statements and guard rejections.
//!
//! Events are only emitted with the `tracing` feature:
//! `stmtforge = { features = ["tracing"] }`. Without it [`observe`] is a
//! pass-through.

use crate::error::StmtResult;

/// Log the outcome of one `create_*` call and hand it back unchanged.
pub(crate) fn observe(operation: &'static str, table: &str, result: StmtResult<String>) -> StmtResult<String> {
    #[cfg(feature = "tracing")]
    match &result {
        Ok(sql) => {
            let max = crate::config::GlobalConfiguration::max_traced_sql_length();
            let shown = truncate_sql(sql, max);
            tracing::debug!(target: "stmtforge.sql", operation, table, sql = %shown, "statement compiled");
        }
        Err(error) => {
            tracing::debug!(target: "stmtforge.sql", operation, table, %error, "statement rejected");
        }
    }
    #[cfg(not(feature = "tracing"))]
    let _ = (operation, table);
    result
}

#[cfg_attr(not(feature = "tracing"), allow(dead_code))]
fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// Shorten `sql` to at most `max` bytes, marking the cut with `...`.
#[cfg_attr(not(feature = "tracing"), allow(dead_code))]
pub(crate) fn truncate_sql(sql: &str, max: Option<usize>) -> String {
    match max {
        Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
        _ => sql.to_string(),
    }
}

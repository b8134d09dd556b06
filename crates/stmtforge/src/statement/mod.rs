//! The statement compiler.
//!
//! [`StatementBuilder`] carries every operation whose SQL is the same across
//! dialects as a default method; a dialect implements the three operations
//! that are not (paged batch query, merge, merge-all) and may override the
//! small hooks (`count_function`, `row_limit_style`, `convert_for_average`,
//! `write_insert_tail`) or whole operations.
//!
//! Every `create_*` call clears the passed [`QueryBuilder`] first, runs its
//! guards, and either returns the finished text or an error. No partial SQL
//! is ever returned.
//!
//! ```ignore
//! let builder = Dialect::SqlServer.statement_builder();
//! let request = StatementRequest::new("Person")
//!     .fields(Field::from_names(&["Id", "Name"])?)
//!     .filter(QueryField::eq("Id", 10)?);
//! let sql = builder.create_query(&mut QueryBuilder::new(), &request, None)?;
//! assert_eq!(sql, "SELECT [Id], [Name] FROM [Person] WHERE ([Id] = @Id) ;");
//! ```

mod base;
mod guard;
mod mysql;
mod postgres;
mod request;
mod sqlite;
mod sqlserver;


pub use mysql::MySqlStatementBuilder;
pub use postgres::PostgreSqlStatementBuilder;
pub use request::StatementRequest;
pub use sqlite::SqliteStatementBuilder;
pub use sqlserver::SqlServerStatementBuilder;

use crate::config::{GlobalConfiguration, KeyColumnReturnBehavior};
use crate::db_field::DbField;
use crate::error::StmtResult;
use crate::field::Field;
use crate::query_builder::QueryBuilder;
use crate::setting::DbSetting;
use crate::trace;
use base::Aggregate;

/// Where a dialect puts its row limit in a SELECT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLimitStyle {
    /// `SELECT TOP (n) ...`
    Top,
    /// `SELECT ... LIMIT n`
    Limit,
}

/// A dialect's SQL compiler.
pub trait StatementBuilder: Send + Sync {
    /// The dialect setting every statement is written with.
    fn db_setting(&self) -> &DbSetting;

    /// The key-return policy; the process-wide one unless overridden.
    fn key_column_return_behavior(&self) -> StmtResult<KeyColumnReturnBehavior> {
        GlobalConfiguration::key_column_return_behavior()
    }

    /// The row-count expression of `create_count`.
    fn count_function(&self) -> &'static str {
        "COUNT (*)"
    }

    fn row_limit_style(&self) -> RowLimitStyle {
        RowLimitStyle::Top
    }

    /// Convert a quoted column to the dialect's averageable type.
    fn convert_for_average(&self, column: &str) -> String {
        match &self.db_setting().averageable_type {
            Some(averageable) => format!("CAST({column} AS {averageable})"),
            None => column.to_string(),
        }
    }

    /// Terminate an INSERT, reporting `key` when the dialect can.
    ///
    /// `batched` is set when the statement is one row of a multi-row batch,
    /// in which case the row `index` is reported alongside the key.
    fn write_insert_tail(&self, qb: &mut QueryBuilder, key: Option<&DbField>, index: usize, batched: bool) {
        let _ = (key, index, batched);
        qb.end();
    }

    fn create_count(&self, qb: &mut QueryBuilder, request: &StatementRequest) -> StmtResult<String> {
        trace::observe("count", &request.table_name, base::count(self, qb, request, true))
    }

    fn create_count_all(&self, qb: &mut QueryBuilder, request: &StatementRequest) -> StmtResult<String> {
        trace::observe("count_all", &request.table_name, base::count(self, qb, request, false))
    }

    fn create_exists(&self, qb: &mut QueryBuilder, request: &StatementRequest) -> StmtResult<String> {
        trace::observe("exists", &request.table_name, base::exists(self, qb, request))
    }

    fn create_average(&self, qb: &mut QueryBuilder, request: &StatementRequest, field: &Field) -> StmtResult<String> {
        let result = base::aggregate(self, qb, request, field, Aggregate::Average, true);
        trace::observe("average", &request.table_name, result)
    }

    fn create_average_all(&self, qb: &mut QueryBuilder, request: &StatementRequest, field: &Field) -> StmtResult<String> {
        let result = base::aggregate(self, qb, request, field, Aggregate::Average, false);
        trace::observe("average_all", &request.table_name, result)
    }

    fn create_max(&self, qb: &mut QueryBuilder, request: &StatementRequest, field: &Field) -> StmtResult<String> {
        let result = base::aggregate(self, qb, request, field, Aggregate::Max, true);
        trace::observe("max", &request.table_name, result)
    }

    fn create_max_all(&self, qb: &mut QueryBuilder, request: &StatementRequest, field: &Field) -> StmtResult<String> {
        let result = base::aggregate(self, qb, request, field, Aggregate::Max, false);
        trace::observe("max_all", &request.table_name, result)
    }

    fn create_min(&self, qb: &mut QueryBuilder, request: &StatementRequest, field: &Field) -> StmtResult<String> {
        let result = base::aggregate(self, qb, request, field, Aggregate::Min, true);
        trace::observe("min", &request.table_name, result)
    }

    fn create_min_all(&self, qb: &mut QueryBuilder, request: &StatementRequest, field: &Field) -> StmtResult<String> {
        let result = base::aggregate(self, qb, request, field, Aggregate::Min, false);
        trace::observe("min_all", &request.table_name, result)
    }

    fn create_sum(&self, qb: &mut QueryBuilder, request: &StatementRequest, field: &Field) -> StmtResult<String> {
        let result = base::aggregate(self, qb, request, field, Aggregate::Sum, true);
        trace::observe("sum", &request.table_name, result)
    }

    fn create_sum_all(&self, qb: &mut QueryBuilder, request: &StatementRequest, field: &Field) -> StmtResult<String> {
        let result = base::aggregate(self, qb, request, field, Aggregate::Sum, false);
        trace::observe("sum_all", &request.table_name, result)
    }

    fn create_delete(&self, qb: &mut QueryBuilder, request: &StatementRequest) -> StmtResult<String> {
        trace::observe("delete", &request.table_name, base::delete(self, qb, request, true))
    }

    fn create_delete_all(&self, qb: &mut QueryBuilder, request: &StatementRequest) -> StmtResult<String> {
        trace::observe("delete_all", &request.table_name, base::delete(self, qb, request, false))
    }

    fn create_truncate(&self, qb: &mut QueryBuilder, request: &StatementRequest) -> StmtResult<String> {
        trace::observe("truncate", &request.table_name, base::truncate(self, qb, request))
    }

    fn create_insert(&self, qb: &mut QueryBuilder, request: &StatementRequest) -> StmtResult<String> {
        trace::observe("insert", &request.table_name, base::insert(self, qb, request))
    }

    /// One INSERT per row of the batch, each with its own parameter suffix.
    fn create_insert_all(&self, qb: &mut QueryBuilder, request: &StatementRequest) -> StmtResult<String> {
        trace::observe("insert_all", &request.table_name, base::insert_all(self, qb, request))
    }

    fn create_update(&self, qb: &mut QueryBuilder, request: &StatementRequest) -> StmtResult<String> {
        trace::observe("update", &request.table_name, base::update(self, qb, request))
    }

    fn create_update_all(&self, qb: &mut QueryBuilder, request: &StatementRequest) -> StmtResult<String> {
        trace::observe("update_all", &request.table_name, base::update_all(self, qb, request))
    }

    /// SELECT with the optional filter and ordering; `top` limits the rows.
    fn create_query(&self, qb: &mut QueryBuilder, request: &StatementRequest, top: Option<usize>) -> StmtResult<String> {
        trace::observe("query", &request.table_name, base::query(self, qb, request, top, true))
    }

    /// SELECT of every row, ignoring the filter.
    fn create_query_all(&self, qb: &mut QueryBuilder, request: &StatementRequest) -> StmtResult<String> {
        trace::observe("query_all", &request.table_name, base::query(self, qb, request, None, false))
    }

    /// One page (`page` counts from 0) of `rows_per_batch` ordered rows.
    fn create_batch_query(
        &self,
        qb: &mut QueryBuilder,
        request: &StatementRequest,
        page: usize,
        rows_per_batch: usize,
    ) -> StmtResult<String>;

    /// Insert-or-update one row matched on the qualifiers.
    fn create_merge(&self, qb: &mut QueryBuilder, request: &StatementRequest) -> StmtResult<String>;

    /// [`create_merge`](Self::create_merge) for every row of the batch.
    fn create_merge_all(&self, qb: &mut QueryBuilder, request: &StatementRequest) -> StmtResult<String>;
}

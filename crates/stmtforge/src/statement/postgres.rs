use super::base::{self, MergeParts};
use super::request::StatementRequest;
use super::{RowLimitStyle, StatementBuilder};
use crate::config::{GlobalConfiguration, KeyColumnReturnBehavior};
use crate::db_field::DbField;
use crate::error::StmtResult;
use crate::ident;
use crate::query_builder::QueryBuilder;
use crate::setting::DbSetting;
use crate::trace;

/// PostgreSQL: `" "` quoting, `RETURNING`, `LIMIT/OFFSET` pages, `ON CONFLICT` upserts.
#[derive(Debug, Clone)]
pub struct PostgreSqlStatementBuilder {
    setting: DbSetting,
    key_column_return_behavior: Option<KeyColumnReturnBehavior>,
}

impl Default for PostgreSqlStatementBuilder {
    fn default() -> Self {
        Self::new(DbSetting::postgresql())
    }
}

impl PostgreSqlStatementBuilder {
    pub fn new(setting: DbSetting) -> Self {
        Self {
            setting,
            key_column_return_behavior: None,
        }
    }

    /// Use `behavior` instead of the process-wide key-return policy.
    pub fn with_key_column_return_behavior(mut self, behavior: KeyColumnReturnBehavior) -> Self {
        self.key_column_return_behavior = Some(behavior);
        self
    }

    fn write_returning(&self, qb: &mut QueryBuilder, key: Option<&DbField>, index: usize, batched: bool) {
        if let Some(key) = key {
            let column = ident::quote(&key.name, &self.setting);
            qb.returning()
                .write_text(&base::result_columns(&column, index, batched, &self.setting));
        }
    }

    fn batch_query(
        &self,
        qb: &mut QueryBuilder,
        request: &StatementRequest,
        page: usize,
        rows_per_batch: usize,
    ) -> StmtResult<String> {
        let setting = &self.setting;
        let window = base::batch_query_guards(request, setting, page, rows_per_batch)?;

        qb.clear()
            .select()
            .fields_from(&request.fields, setting)
            .from()
            .table_name_from(&request.table_name, setting)
            .hints_from(request.hints_str())
            .where_from(request.filter.as_ref(), 0, setting)
            .order_by_from(&request.order_by, setting)
            .limit_offset(rows_per_batch, window.offset)
            .end();
        Ok(qb.get_string())
    }

    fn write_merge_row(&self, qb: &mut QueryBuilder, request: &StatementRequest, parts: &MergeParts, index: usize, batched: bool) {
        let setting = &self.setting;
        qb.insert()
            .into_()
            .table_name_from(&request.table_name, setting)
            .hints_from(request.hints_str())
            .open_paren()
            .fields_from(&parts.fields, setting)
            .close_paren()
            .values()
            .open_paren()
            .parameters_from(&parts.fields, index, setting)
            .close_paren()
            .write_text("ON CONFLICT")
            .open_paren()
            .fields_from(&parts.qualifiers, setting)
            .close_paren();
        if parts.updatable.is_empty() {
            qb.write_text("DO NOTHING");
        } else {
            let assignments = base::join_list(&parts.updatable, |f| {
                let quoted = f.quoted(setting);
                format!("{quoted} = EXCLUDED.{quoted}")
            });
            qb.write_text("DO UPDATE").set().write_text(&assignments);
        }
        self.write_returning(qb, parts.key.as_ref(), index, batched);
        qb.end();
    }
}

impl StatementBuilder for PostgreSqlStatementBuilder {
    fn db_setting(&self) -> &DbSetting {
        &self.setting
    }

    fn key_column_return_behavior(&self) -> StmtResult<KeyColumnReturnBehavior> {
        match self.key_column_return_behavior {
            Some(behavior) => Ok(behavior),
            None => GlobalConfiguration::key_column_return_behavior(),
        }
    }

    fn row_limit_style(&self) -> RowLimitStyle {
        RowLimitStyle::Limit
    }

    fn write_insert_tail(&self, qb: &mut QueryBuilder, key: Option<&DbField>, index: usize, batched: bool) {
        self.write_returning(qb, key, index, batched);
        qb.end();
    }

    fn create_batch_query(
        &self,
        qb: &mut QueryBuilder,
        request: &StatementRequest,
        page: usize,
        rows_per_batch: usize,
    ) -> StmtResult<String> {
        let result = self.batch_query(qb, request, page, rows_per_batch);
        trace::observe("batch_query", &request.table_name, result)
    }

    fn create_merge(&self, qb: &mut QueryBuilder, request: &StatementRequest) -> StmtResult<String> {
        let result = base::merge(self, qb, request, false, |qb, parts, index, batched| {
            self.write_merge_row(qb, request, parts, index, batched)
        });
        trace::observe("merge", &request.table_name, result)
    }

    fn create_merge_all(&self, qb: &mut QueryBuilder, request: &StatementRequest) -> StmtResult<String> {
        let result = base::merge(self, qb, request, true, |qb, parts, index, batched| {
            self.write_merge_row(qb, request, parts, index, batched)
        });
        trace::observe("merge_all", &request.table_name, result)
    }
}

use super::base::{self, MergeParts};
use super::guard;
use super::request::StatementRequest;
use super::{RowLimitStyle, StatementBuilder};
use crate::config::{GlobalConfiguration, KeyColumnReturnBehavior};
use crate::db_field::DbField;
use crate::error::StmtResult;
use crate::field::Field;
use crate::ident;
use crate::query_builder::QueryBuilder;
use crate::setting::DbSetting;
use crate::trace;

/// MySQL: backtick quoting, `LAST_INSERT_ID()`, `LIMIT offset, rows` pages,
/// `ON DUPLICATE KEY UPDATE` upserts.
#[derive(Debug, Clone)]
pub struct MySqlStatementBuilder {
    setting: DbSetting,
    key_column_return_behavior: Option<KeyColumnReturnBehavior>,
}

impl Default for MySqlStatementBuilder {
    fn default() -> Self {
        Self::new(DbSetting::mysql())
    }
}

impl MySqlStatementBuilder {
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

    /// The expression that reads the key back; `written` are the columns the
    /// statement supplied values for.
    fn key_expression(&self, key: &DbField, written: &[Field], index: usize) -> String {
        let parameter = ident::parameter(&key.name, index, &self.setting);
        if !key.is_identity {
            parameter
        } else if guard::contains(written, &key.name, &self.setting) {
            format!("COALESCE({parameter}, LAST_INSERT_ID())")
        } else {
            "LAST_INSERT_ID()".to_string()
        }
    }

    fn write_key_select(&self, qb: &mut QueryBuilder, key: Option<&DbField>, written: &[Field], index: usize, batched: bool) {
        if let Some(key) = key {
            let expression = self.key_expression(key, written, index);
            qb.select()
                .write_text(&base::result_columns(&expression, index, batched, &self.setting))
                .end();
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
            .write_text(&format!("LIMIT {}, {rows_per_batch}", window.offset))
            .end();
        Ok(qb.get_string())
    }

    fn write_merge_row(&self, qb: &mut QueryBuilder, request: &StatementRequest, parts: &MergeParts, index: usize, batched: bool) {
        let setting = &self.setting;
        // ON DUPLICATE KEY UPDATE needs at least one assignment.
        let assigned = if parts.updatable.is_empty() {
            &parts.qualifiers
        } else {
            &parts.updatable
        };
        let assignments = base::join_list(assigned, |f| {
            let quoted = f.quoted(setting);
            format!("{quoted} = VALUES({quoted})")
        });

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
            .write_text("ON DUPLICATE KEY UPDATE")
            .write_text(&assignments)
            .end();
        self.write_key_select(qb, parts.key.as_ref(), &parts.fields, index, batched);
    }
}

impl StatementBuilder for MySqlStatementBuilder {
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
        qb.end();
        self.write_key_select(qb, key, &[], index, batched);
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

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
use crate::value::DbType;

/// SQL Server: `[ ]` quoting, `TOP (n)`, row-numbering CTE pages, `MERGE`.
#[derive(Debug, Clone)]
pub struct SqlServerStatementBuilder {
    setting: DbSetting,
    key_column_return_behavior: Option<KeyColumnReturnBehavior>,
}

impl Default for SqlServerStatementBuilder {
    fn default() -> Self {
        Self::new(DbSetting::sql_server())
    }
}

impl SqlServerStatementBuilder {
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

    /// The expression that reads the key back after an insert.
    fn key_expression(&self, key: &DbField, index: usize) -> String {
        if key.is_identity {
            let sql_type = match key.db_type {
                Some(DbType::Int16) => "SMALLINT",
                Some(DbType::Int32) => "INT",
                Some(DbType::Decimal) => "DECIMAL(38, 0)",
                _ => "BIGINT",
            };
            format!("CONVERT({sql_type}, SCOPE_IDENTITY())")
        } else {
            ident::parameter(&key.name, index, &self.setting)
        }
    }

    fn insert_all(&self, qb: &mut QueryBuilder, request: &StatementRequest) -> StmtResult<String> {
        let rows = request.effective_batch_size();
        if rows == 1 {
            return base::insert(self, qb, request);
        }
        let setting = &self.setting;
        base::insert_all_guards(request, setting)?;
        let fields = base::insertable_fields(request, setting)?;
        let key = base::return_key(self, request)?;

        let values: Vec<String> = (0..rows)
            .map(|index| {
                let params = base::join_list(&fields, |f| ident::parameter(f.name(), index, setting));
                format!("( {params}, {index} )")
            })
            .collect();
        let row_index = ident::quote("__RowIndex", setting);
        let columns = base::join_list(&fields, |f| f.quoted(setting));

        qb.clear()
            .insert()
            .into_()
            .table_name_from(&request.table_name, setting)
            .hints_from(request.hints_str())
            .open_paren()
            .fields_from(&fields, setting)
            .close_paren();
        if let Some(key) = &key {
            let inserted = format!("INSERTED.{}", ident::quote(&key.name, setting));
            qb.output().write_text(&base::result_columns(&inserted, 0, false, setting));
        }
        qb.select()
            .fields_from(&fields, setting)
            .from()
            .open_paren()
            .values()
            .write_text(&values.join(", "))
            .close_paren()
            .write_text(&format!("AS S ( {columns}, {row_index} )"))
            .write_text(&format!("ORDER BY S.{row_index}"))
            .end();
        Ok(qb.get_string())
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
        let row_number = ident::quote("RowNumber", setting);

        qb.clear()
            .with()
            .write_text("CTE")
            .as_()
            .open_paren()
            .select()
            .row_number()
            .over()
            .open_paren()
            .order_by_from(&request.order_by, setting)
            .close_paren()
            .write_text(&format!("AS {row_number},"))
            .fields_from(&request.fields, setting)
            .from()
            .table_name_from(&request.table_name, setting)
            .hints_from(request.hints_str())
            .where_from(request.filter.as_ref(), 0, setting)
            .close_paren()
            .select()
            .fields_from(&request.fields, setting)
            .from()
            .write_text("CTE")
            .write_text(&format!("WHERE ({row_number} BETWEEN {} AND {})", window.offset + 1, window.end))
            .order_by_from(&request.order_by, setting)
            .end();
        Ok(qb.get_string())
    }

    fn write_merge_row(&self, qb: &mut QueryBuilder, request: &StatementRequest, parts: &MergeParts, index: usize, batched: bool) {
        let setting = &self.setting;
        let on = base::join_comparisons(&parts.qualifiers, |f| {
            let quoted = f.quoted(setting);
            format!("T.{quoted} = S.{quoted}")
        });

        qb.merge()
            .table_name_from(&request.table_name, setting)
            .hints_from(request.hints_str())
            .write_text("AS T")
            .using()
            .open_paren()
            .select()
            .parameters_as_fields_from(&parts.fields, index, setting)
            .close_paren()
            .write_text("AS S")
            .on()
            .open_paren()
            .write_text(&on)
            .close_paren()
            .when()
            .not()
            .matched()
            .then()
            .insert()
            .open_paren()
            .fields_from(&parts.insertable, setting)
            .close_paren()
            .values()
            .open_paren()
            .aliased_fields_from(&parts.insertable, "S", setting)
            .close_paren();
        if !parts.updatable.is_empty() {
            qb.when()
                .matched()
                .then()
                .update()
                .set()
                .fields_and_aliased_fields_from(&parts.updatable, "T", "S", setting);
        }
        if let Some(key) = &parts.key {
            let inserted = format!("INSERTED.{}", ident::quote(&key.name, setting));
            qb.output().write_text(&base::result_columns(&inserted, index, batched, setting));
        }
        qb.end();
    }
}

impl StatementBuilder for SqlServerStatementBuilder {
    fn db_setting(&self) -> &DbSetting {
        &self.setting
    }

    fn key_column_return_behavior(&self) -> StmtResult<KeyColumnReturnBehavior> {
        match self.key_column_return_behavior {
            Some(behavior) => Ok(behavior),
            None => GlobalConfiguration::key_column_return_behavior(),
        }
    }

    fn count_function(&self) -> &'static str {
        "COUNT_BIG (*)"
    }

    fn row_limit_style(&self) -> RowLimitStyle {
        RowLimitStyle::Top
    }

    fn convert_for_average(&self, column: &str) -> String {
        match &self.setting.averageable_type {
            Some(averageable) => format!("CONVERT({averageable}, {column})"),
            None => column.to_string(),
        }
    }

    fn write_insert_tail(&self, qb: &mut QueryBuilder, key: Option<&DbField>, index: usize, batched: bool) {
        qb.end();
        if let Some(key) = key {
            let expression = self.key_expression(key, index);
            qb.select()
                .write_text(&base::result_columns(&expression, index, batched, &self.setting))
                .end();
        }
    }

    /// A single `INSERT ... OUTPUT ... SELECT ... FROM (VALUES ...)` for the
    /// whole batch, ordered by a synthetic row index column.
    fn create_insert_all(&self, qb: &mut QueryBuilder, request: &StatementRequest) -> StmtResult<String> {
        trace::observe("insert_all", &request.table_name, self.insert_all(qb, request))
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

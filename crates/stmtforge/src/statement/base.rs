//! Dialect-independent statement shapes.
//!
//! Each function clears the builder, runs its guards, writes clauses in the
//! fixed order verb → target → hints → predicate/values → ordering →
//! terminator, and returns the text.

use super::guard;
use super::request::StatementRequest;
use super::{RowLimitStyle, StatementBuilder};
use crate::db_field::DbField;
use crate::error::{StmtError, StmtResult};
use crate::field::Field;
use crate::ident;
use crate::query_builder::QueryBuilder;
use crate::query_group::QueryGroup;
use crate::setting::DbSetting;

#[derive(Debug, Clone, Copy)]
pub(crate) enum Aggregate {
    Average,
    Max,
    Min,
    Sum,
}

impl Aggregate {
    fn function(self) -> &'static str {
        match self {
            Aggregate::Average => "AVG",
            Aggregate::Max => "MAX",
            Aggregate::Min => "MIN",
            Aggregate::Sum => "SUM",
        }
    }

    fn alias(self) -> &'static str {
        match self {
            Aggregate::Average => "AverageValue",
            Aggregate::Max => "MaxValue",
            Aggregate::Min => "MinValue",
            Aggregate::Sum => "SumValue",
        }
    }
}

fn filter_of(request: &StatementRequest, filtered: bool) -> Option<&QueryGroup> {
    if filtered { request.filter.as_ref() } else { None }
}

pub(crate) fn count<B>(builder: &B, qb: &mut QueryBuilder, request: &StatementRequest, filtered: bool) -> StmtResult<String>
where
    B: StatementBuilder + ?Sized,
{
    let setting = builder.db_setting();
    guard::common(request, setting)?;

    qb.clear()
        .select()
        .write_text(builder.count_function())
        .as_alias("CountValue", setting)
        .from()
        .table_name_from(&request.table_name, setting)
        .hints_from(request.hints_str())
        .where_from(filter_of(request, filtered), 0, setting)
        .end();
    Ok(qb.get_string())
}

pub(crate) fn exists<B>(builder: &B, qb: &mut QueryBuilder, request: &StatementRequest) -> StmtResult<String>
where
    B: StatementBuilder + ?Sized,
{
    let setting = builder.db_setting();
    guard::common(request, setting)?;
    let style = builder.row_limit_style();

    qb.clear().select();
    if style == RowLimitStyle::Top {
        qb.top(1);
    }
    qb.write_text("1")
        .as_alias("ExistsValue", setting)
        .from()
        .table_name_from(&request.table_name, setting)
        .hints_from(request.hints_str())
        .where_from(request.filter.as_ref(), 0, setting);
    if style == RowLimitStyle::Limit {
        qb.limit(1);
    }
    qb.end();
    Ok(qb.get_string())
}

pub(crate) fn aggregate<B>(
    builder: &B,
    qb: &mut QueryBuilder,
    request: &StatementRequest,
    field: &Field,
    aggregate: Aggregate,
    filtered: bool,
) -> StmtResult<String>
where
    B: StatementBuilder + ?Sized,
{
    let setting = builder.db_setting();
    guard::common(request, setting)?;

    let column = field.quoted(setting);
    let argument = match aggregate {
        Aggregate::Average => builder.convert_for_average(&column),
        _ => column,
    };
    qb.clear()
        .select()
        .write_text(&format!("{}({argument})", aggregate.function()))
        .as_alias(aggregate.alias(), setting)
        .from()
        .table_name_from(&request.table_name, setting)
        .hints_from(request.hints_str())
        .where_from(filter_of(request, filtered), 0, setting)
        .end();
    Ok(qb.get_string())
}

pub(crate) fn delete<B>(builder: &B, qb: &mut QueryBuilder, request: &StatementRequest, filtered: bool) -> StmtResult<String>
where
    B: StatementBuilder + ?Sized,
{
    let setting = builder.db_setting();
    guard::common(request, setting)?;

    qb.clear()
        .delete()
        .from()
        .table_name_from(&request.table_name, setting)
        .hints_from(request.hints_str())
        .where_from(filter_of(request, filtered), 0, setting)
        .end();
    Ok(qb.get_string())
}

pub(crate) fn truncate<B>(builder: &B, qb: &mut QueryBuilder, request: &StatementRequest) -> StmtResult<String>
where
    B: StatementBuilder + ?Sized,
{
    let setting = builder.db_setting();
    guard::common(request, setting)?;
    no_hints(request, "TRUNCATE")?;

    qb.clear()
        .truncate()
        .table()
        .table_name_from(&request.table_name, setting)
        .end();
    Ok(qb.get_string())
}

/// Statements that cannot carry table hints reject them even where hints exist.
pub(crate) fn no_hints(request: &StatementRequest, statement: &str) -> StmtResult<()> {
    if request.hints_str().is_some_and(|h| !h.trim().is_empty()) {
        return Err(StmtError::not_supported(format!(
            "{statement} does not accept table hints"
        )));
    }
    Ok(())
}

/// The key column reported back by inserts and merges.
pub(crate) fn return_key<B>(builder: &B, request: &StatementRequest) -> StmtResult<Option<DbField>>
where
    B: StatementBuilder + ?Sized,
{
    let behavior = builder.key_column_return_behavior()?;
    Ok(behavior.resolve(request.primary(), request.identity()).cloned())
}

/// The request's fields without the identity column.
pub(crate) fn insertable_fields(request: &StatementRequest, setting: &DbSetting) -> StmtResult<Vec<Field>> {
    let identity: Vec<&str> = request.identity().map(|f| f.name.as_str()).into_iter().collect();
    let insertable = guard::without(&request.fields, &identity, setting);
    if insertable.is_empty() {
        return Err(StmtError::empty(format!(
            "no insertable fields are left for '{}'",
            request.table_name
        )));
    }
    Ok(insertable)
}

/// The request's fields without primary, identity and `qualifiers`.
pub(crate) fn updatable_fields(request: &StatementRequest, qualifiers: &[Field], setting: &DbSetting) -> Vec<Field> {
    let mut excluded: Vec<&str> = qualifiers.iter().map(Field::name).collect();
    excluded.extend(request.primary().map(|f| f.name.as_str()));
    excluded.extend(request.identity().map(|f| f.name.as_str()));
    guard::without(&request.fields, &excluded, setting)
}

/// `<expression> AS [Result]`, plus `, <index> AS [Index]` inside a batch.
pub(crate) fn result_columns(expression: &str, index: usize, batched: bool, setting: &DbSetting) -> String {
    let result = format!("{expression} AS {}", ident::quote("Result", setting));
    if batched {
        format!("{result}, {index} AS {}", ident::quote("Index", setting))
    } else {
        result
    }
}

fn write_insert<B>(
    builder: &B,
    qb: &mut QueryBuilder,
    request: &StatementRequest,
    fields: &[Field],
    key: Option<&DbField>,
    index: usize,
    batched: bool,
) where
    B: StatementBuilder + ?Sized,
{
    let setting = builder.db_setting();
    qb.insert()
        .into_()
        .table_name_from(&request.table_name, setting)
        .hints_from(request.hints_str())
        .open_paren()
        .fields_from(fields, setting)
        .close_paren()
        .values()
        .open_paren()
        .parameters_from(fields, index, setting)
        .close_paren();
    builder.write_insert_tail(qb, key, index, batched);
}

fn insert_guards(request: &StatementRequest, setting: &DbSetting) -> StmtResult<()> {
    guard::common(request, setting)?;
    guard::fields(request)?;
    guard::field_mapping(request, setting)
}

pub(crate) fn insert<B>(builder: &B, qb: &mut QueryBuilder, request: &StatementRequest) -> StmtResult<String>
where
    B: StatementBuilder + ?Sized,
{
    let setting = builder.db_setting();
    insert_guards(request, setting)?;
    let fields = insertable_fields(request, setting)?;
    let key = return_key(builder, request)?;

    qb.clear();
    write_insert(builder, qb, request, &fields, key.as_ref(), 0, false);
    Ok(qb.get_string())
}

pub(crate) fn insert_all<B>(builder: &B, qb: &mut QueryBuilder, request: &StatementRequest) -> StmtResult<String>
where
    B: StatementBuilder + ?Sized,
{
    let setting = builder.db_setting();
    insert_all_guards(request, setting)?;
    let fields = insertable_fields(request, setting)?;
    let key = return_key(builder, request)?;
    let rows = request.effective_batch_size();

    qb.clear();
    for index in 0..rows {
        write_insert(builder, qb, request, &fields, key.as_ref(), index, rows > 1);
    }
    Ok(qb.get_string())
}

pub(crate) fn insert_all_guards(request: &StatementRequest, setting: &DbSetting) -> StmtResult<()> {
    guard::common(request, setting)?;
    guard::batch_size(request, setting)?;
    guard::fields(request)?;
    guard::field_mapping(request, setting)
}

pub(crate) fn update<B>(builder: &B, qb: &mut QueryBuilder, request: &StatementRequest) -> StmtResult<String>
where
    B: StatementBuilder + ?Sized,
{
    let setting = builder.db_setting();
    guard::common(request, setting)?;
    guard::fields(request)?;

    let filter = request
        .filter
        .as_ref()
        .filter(|group| !group.is_empty())
        .map(QueryGroup::for_update);
    let qualifiers = match filter {
        Some(_) => Vec::new(),
        None => guard::qualifiers(request, setting)?,
    };
    let fields = updatable_fields(request, &qualifiers, setting);
    if fields.is_empty() {
        return Err(StmtError::empty(format!(
            "no updatable fields are left for '{}'",
            request.table_name
        )));
    }

    qb.clear()
        .update()
        .table_name_from(&request.table_name, setting)
        .hints_from(request.hints_str())
        .set()
        .fields_and_parameters_from(&fields, 0, setting);
    match &filter {
        Some(group) => qb.where_from(Some(group), 0, setting),
        None => qb.where_from_fields(&qualifiers, 0, setting),
    };
    qb.end();
    Ok(qb.get_string())
}

pub(crate) fn update_all<B>(builder: &B, qb: &mut QueryBuilder, request: &StatementRequest) -> StmtResult<String>
where
    B: StatementBuilder + ?Sized,
{
    let setting = builder.db_setting();
    guard::common(request, setting)?;
    guard::batch_size(request, setting)?;
    guard::fields(request)?;

    let qualifiers = guard::qualifiers(request, setting)?;
    let fields = updatable_fields(request, &qualifiers, setting);
    if fields.is_empty() {
        return Err(StmtError::empty(format!(
            "no updatable fields are left for '{}'",
            request.table_name
        )));
    }

    qb.clear();
    for index in 0..request.effective_batch_size() {
        qb.update()
            .table_name_from(&request.table_name, setting)
            .hints_from(request.hints_str())
            .set()
            .fields_and_parameters_from(&fields, index, setting)
            .where_from_fields(&qualifiers, index, setting)
            .end();
    }
    Ok(qb.get_string())
}

pub(crate) fn query<B>(
    builder: &B,
    qb: &mut QueryBuilder,
    request: &StatementRequest,
    top: Option<usize>,
    filtered: bool,
) -> StmtResult<String>
where
    B: StatementBuilder + ?Sized,
{
    let setting = builder.db_setting();
    guard::common(request, setting)?;
    guard::fields(request)?;
    let style = builder.row_limit_style();
    let top = top.filter(|rows| *rows > 0);

    qb.clear().select();
    if let (RowLimitStyle::Top, Some(rows)) = (style, top) {
        qb.top(rows);
    }
    qb.fields_from(&request.fields, setting)
        .from()
        .table_name_from(&request.table_name, setting)
        .hints_from(request.hints_str())
        .where_from(filter_of(request, filtered), 0, setting)
        .order_by_from(&request.order_by, setting);
    if let (RowLimitStyle::Limit, Some(rows)) = (style, top) {
        qb.limit(rows);
    }
    qb.end();
    Ok(qb.get_string())
}

/// Row window of one batch-query page: rows `offset + 1 ..= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Page {
    pub(crate) offset: usize,
    pub(crate) end: usize,
}

/// Guards of a paged batch query; resolves the page's row window.
pub(crate) fn batch_query_guards(
    request: &StatementRequest,
    setting: &DbSetting,
    page: usize,
    rows_per_batch: usize,
) -> StmtResult<Page> {
    guard::common(request, setting)?;
    guard::fields(request)?;
    if request.order_by.is_empty() {
        return Err(StmtError::missing_input("a batch query needs at least one order field"));
    }
    if rows_per_batch == 0 {
        return Err(StmtError::invalid_operation("rows per batch must be greater than zero"));
    }
    let offset = page.checked_mul(rows_per_batch);
    let end = offset.and_then(|offset| offset.checked_add(rows_per_batch));
    match (offset, end) {
        (Some(offset), Some(end)) => Ok(Page { offset, end }),
        _ => Err(StmtError::invalid_operation(format!(
            "page {page} of {rows_per_batch} rows is out of range"
        ))),
    }
}

/// Everything a dialect's merge writer needs, resolved once per call.
pub(crate) struct MergeParts {
    pub(crate) qualifiers: Vec<Field>,
    /// All requested fields.
    pub(crate) fields: Vec<Field>,
    /// Requested fields without the identity column.
    pub(crate) insertable: Vec<Field>,
    /// Requested fields without qualifiers and key columns.
    pub(crate) updatable: Vec<Field>,
    pub(crate) key: Option<DbField>,
}

/// Run the merge guards and write one merge per row with `write_row`.
pub(crate) fn merge<B, W>(
    builder: &B,
    qb: &mut QueryBuilder,
    request: &StatementRequest,
    all: bool,
    write_row: W,
) -> StmtResult<String>
where
    B: StatementBuilder + ?Sized,
    W: Fn(&mut QueryBuilder, &MergeParts, usize, bool),
{
    let setting = builder.db_setting();
    guard::common(request, setting)?;
    if all {
        guard::batch_size(request, setting)?;
    }
    guard::fields(request)?;
    guard::field_mapping(request, setting)?;

    let qualifiers = guard::qualifiers(request, setting)?;
    let parts = MergeParts {
        fields: request.fields.clone(),
        insertable: insertable_fields(request, setting)?,
        updatable: updatable_fields(request, &qualifiers, setting),
        key: return_key(builder, request)?,
        qualifiers,
    };
    let rows = if all { request.effective_batch_size() } else { 1 };

    qb.clear();
    for index in 0..rows {
        write_row(qb, &parts, index, rows > 1);
    }
    Ok(qb.get_string())
}

/// `[A] = @A AND [B] = @B`-style join of per-field comparisons.
pub(crate) fn join_comparisons(fields: &[Field], render: impl Fn(&Field) -> String) -> String {
    fields.iter().map(render).collect::<Vec<_>>().join(" AND ")
}

/// `a, b, c` join of per-field renderings.
pub(crate) fn join_list(fields: &[Field], render: impl Fn(&Field) -> String) -> String {
    fields.iter().map(render).collect::<Vec<_>>().join(", ")
}

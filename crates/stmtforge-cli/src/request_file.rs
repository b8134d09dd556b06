use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use stmtforge::{
    DbField, DbSettingOverrides, Dialect, Field, GlobalConfigurationOptions, OrderField, QueryGroup,
    StatementRequest,
};

/// Rows per page when a `batch_query` entry does not say.
pub const DEFAULT_ROWS_PER_BATCH: usize = 10;

/// A request file: dialect, optional overrides and the statements to compile.
///
/// ```toml
/// dialect = "sqlserver"
///
/// [global]
/// key_column_return_behavior = "primary_or_else_identity"
///
/// [setting]
/// is_multi_statement_executable = false
///
/// [[statement]]
/// name = "adults"
/// operation = "query"
/// table = "dbo.Person"
/// fields = ["Id", "Name"]
/// filter = { Age = { operation = "ge", value = 18 } }
/// order_by = { Name = "asc" }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestFile {
    pub dialect: Option<Dialect>,
    pub global: Option<GlobalConfigurationOptions>,
    #[serde(default)]
    pub setting: DbSettingOverrides,
    #[serde(default, rename = "statement")]
    pub statements: Vec<StatementEntry>,
}

impl RequestFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read request file {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("failed to parse request file {}", path.display()))
    }

    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let file: RequestFile = toml::from_str(raw)?;
        if file.statements.is_empty() {
            anyhow::bail!("no [[statement]] entries");
        }
        Ok(file)
    }
}

/// Operation a statement entry compiles to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Count,
    CountAll,
    Exists,
    Average,
    AverageAll,
    Max,
    MaxAll,
    Min,
    MinAll,
    Sum,
    SumAll,
    Delete,
    DeleteAll,
    Truncate,
    Insert,
    InsertAll,
    Update,
    UpdateAll,
    Query,
    QueryAll,
    BatchQuery,
    Merge,
    MergeAll,
}

impl OperationKind {
    pub fn name(self) -> &'static str {
        match self {
            OperationKind::Count => "count",
            OperationKind::CountAll => "count_all",
            OperationKind::Exists => "exists",
            OperationKind::Average => "average",
            OperationKind::AverageAll => "average_all",
            OperationKind::Max => "max",
            OperationKind::MaxAll => "max_all",
            OperationKind::Min => "min",
            OperationKind::MinAll => "min_all",
            OperationKind::Sum => "sum",
            OperationKind::SumAll => "sum_all",
            OperationKind::Delete => "delete",
            OperationKind::DeleteAll => "delete_all",
            OperationKind::Truncate => "truncate",
            OperationKind::Insert => "insert",
            OperationKind::InsertAll => "insert_all",
            OperationKind::Update => "update",
            OperationKind::UpdateAll => "update_all",
            OperationKind::Query => "query",
            OperationKind::QueryAll => "query_all",
            OperationKind::BatchQuery => "batch_query",
            OperationKind::Merge => "merge",
            OperationKind::MergeAll => "merge_all",
        }
    }

    /// Whether the compiled statement binds the entry's filter.
    pub fn uses_filter(self) -> bool {
        matches!(
            self,
            OperationKind::Count
                | OperationKind::Exists
                | OperationKind::Average
                | OperationKind::Max
                | OperationKind::Min
                | OperationKind::Sum
                | OperationKind::Delete
                | OperationKind::Update
                | OperationKind::Query
                | OperationKind::BatchQuery
        )
    }
}

/// One `[[statement]]` table.
///
/// `filter` and `order_by` are bags: tables whose keys are column names.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatementEntry {
    pub name: Option<String>,
    pub operation: OperationKind,
    pub table: String,
    #[serde(default)]
    pub fields: Vec<Field>,
    pub filter: Option<serde_json::Value>,
    pub order_by: Option<serde_json::Value>,
    #[serde(default)]
    pub qualifiers: Vec<Field>,
    /// The table's columns, with their key flags.
    #[serde(default)]
    pub columns: Vec<DbField>,
    pub batch_size: Option<usize>,
    pub hints: Option<String>,
    /// Row limit of `query`.
    pub top: Option<usize>,
    /// Zero-based page of `batch_query`.
    #[serde(default)]
    pub page: usize,
    pub rows_per_batch: Option<usize>,
    /// Aggregated column of `average`/`max`/`min`/`sum`.
    pub field: Option<Field>,
}

impl StatementEntry {
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("{name} ({})", self.operation.name()),
            None => format!("{} {}", self.operation.name(), self.table),
        }
    }

    pub fn to_request(&self) -> anyhow::Result<StatementRequest> {
        let mut request = StatementRequest::new(self.table.as_str())
            .fields(self.fields.clone())
            .qualifiers(self.qualifiers.clone())
            .schema(self.columns.clone())
            .batch_size(self.batch_size.unwrap_or(1));
        if let Some(bag) = &self.filter {
            request = request.filter(QueryGroup::parse(bag).context("invalid `filter`")?);
        }
        if let Some(bag) = &self.order_by {
            request = request.order_by(OrderField::parse(bag).context("invalid `order_by`")?);
        }
        if let Some(hints) = &self.hints {
            request = request.hints(hints.as_str());
        }
        Ok(request)
    }

    /// The aggregated column; required by the aggregate operations.
    pub fn target(&self) -> anyhow::Result<&Field> {
        self.field
            .as_ref()
            .with_context(|| format!("`{}` needs a `field`", self.operation.name()))
    }

    pub fn rows_per_batch(&self) -> usize {
        self.rows_per_batch.unwrap_or(DEFAULT_ROWS_PER_BATCH)
    }
}

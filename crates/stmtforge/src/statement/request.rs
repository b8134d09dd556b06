use crate::db_field::{self, DbField};
use crate::field::{Field, OrderField};
use crate::query_group::QueryGroup;

/// Everything a `create_*` call compiles from.
///
/// ```ignore
/// let request = StatementRequest::new("Person")
///     .fields(Field::from_names(&["Id", "Name", "Address"])?)
///     .schema(vec![DbField::identity("Id"), DbField::new("Name"), DbField::new("Address")])
///     .batch_size(3);
/// let sql = builder.create_insert_all(&mut QueryBuilder::new(), &request)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct StatementRequest {
    /// Target table, optionally schema-qualified.
    pub table_name: String,
    /// Columns to read or write, in output order.
    pub fields: Vec<Field>,
    /// WHERE predicate; `None` or an empty group means no WHERE clause.
    pub filter: Option<QueryGroup>,
    pub order_by: Vec<OrderField>,
    /// Columns matching existing rows for update/merge.
    pub qualifiers: Vec<Field>,
    /// Declared primary column; must carry `is_primary`.
    pub primary_field: Option<DbField>,
    /// Declared identity column; must carry `is_identity`.
    pub identity_field: Option<DbField>,
    /// The table's columns; enables field-mapping validation.
    pub db_fields: Vec<DbField>,
    /// Rows per statement text for the `*_all` operations; 0 counts as 1.
    pub batch_size: usize,
    /// Table hints such as `WITH (NOLOCK)`.
    pub hints: Option<String>,
}

impl StatementRequest {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            batch_size: 1,
            ..Self::default()
        }
    }

    pub fn fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }

    pub fn filter(mut self, filter: impl Into<QueryGroup>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn order_by(mut self, order_by: Vec<OrderField>) -> Self {
        self.order_by = order_by;
        self
    }

    pub fn qualifiers(mut self, qualifiers: Vec<Field>) -> Self {
        self.qualifiers = qualifiers;
        self
    }

    pub fn primary_field(mut self, field: DbField) -> Self {
        self.primary_field = Some(field);
        self
    }

    pub fn identity_field(mut self, field: DbField) -> Self {
        self.identity_field = Some(field);
        self
    }

    /// Attach the table's columns.
    pub fn schema(mut self, db_fields: Vec<DbField>) -> Self {
        self.db_fields = db_fields;
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn hints(mut self, hints: impl Into<String>) -> Self {
        self.hints = Some(hints.into());
        self
    }

    /// The declared primary column, else the first primary column of the schema.
    pub fn primary(&self) -> Option<&DbField> {
        self.primary_field
            .as_ref()
            .or_else(|| db_field::find_primary(&self.db_fields))
    }

    /// The declared identity column, else the first identity column of the schema.
    pub fn identity(&self) -> Option<&DbField> {
        self.identity_field
            .as_ref()
            .or_else(|| db_field::find_identity(&self.db_fields))
    }

    pub(crate) fn effective_batch_size(&self) -> usize {
        self.batch_size.max(1)
    }

    pub(crate) fn hints_str(&self) -> Option<&str> {
        self.hints.as_deref()
    }
}

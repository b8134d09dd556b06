//! Append-only SQL text accumulator.
//!
//! Every token written to a [`QueryBuilder`] is followed by one space, so
//! clauses compose without separator bookkeeping; [`QueryBuilder::get_string`]
//! trims the trailing space. Identifiers are quoted and parameters named with
//! the [`DbSetting`] passed to the field-aware helpers.
//!
//! ```ignore
//! let setting = DbSetting::sql_server();
//! let mut qb = QueryBuilder::new();
//! qb.select()
//!     .fields_from(&fields, &setting)
//!     .from()
//!     .table_name_from("Person", &setting)
//!     .end();
//! assert_eq!(qb.get_string(), "SELECT [Id], [Name] FROM [Person] ;");
//! ```
//!
//! A builder is `&mut`-borrowed for the whole of one compilation and must not
//! be shared between concurrent compilations.

use crate::field::{Field, OrderField};
use crate::ident;
use crate::query_group::QueryGroup;
use crate::setting::DbSetting;

/// Mutable SQL text buffer with fluent clause helpers.
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct QueryBuilder {
    text: String,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop everything written so far.
    pub fn clear(&mut self) -> &mut Self {
        self.text.clear();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The accumulated text without the trailing space.
    pub fn get_string(&self) -> String {
        self.text.trim_end().to_string()
    }

    /// Append a raw token followed by a space. Empty text is ignored.
    pub fn write_text(&mut self, text: &str) -> &mut Self {
        if text.is_empty() {
            return self;
        }
        self.text.push_str(text);
        self.text.push(' ');
        self
    }

    /// Append a quoted identifier.
    pub fn write_quoted(&mut self, name: &str, setting: &DbSetting) -> &mut Self {
        let quoted = ident::quote(name, setting);
        self.write_text(&quoted)
    }

    // ==================== Keywords ====================

    pub fn select(&mut self) -> &mut Self {
        self.write_text("SELECT")
    }

    pub fn from(&mut self) -> &mut Self {
        self.write_text("FROM")
    }

    pub fn insert(&mut self) -> &mut Self {
        self.write_text("INSERT")
    }

    pub fn into_(&mut self) -> &mut Self {
        self.write_text("INTO")
    }

    pub fn values(&mut self) -> &mut Self {
        self.write_text("VALUES")
    }

    pub fn update(&mut self) -> &mut Self {
        self.write_text("UPDATE")
    }

    pub fn set(&mut self) -> &mut Self {
        self.write_text("SET")
    }

    pub fn delete(&mut self) -> &mut Self {
        self.write_text("DELETE")
    }

    pub fn truncate(&mut self) -> &mut Self {
        self.write_text("TRUNCATE")
    }

    pub fn table(&mut self) -> &mut Self {
        self.write_text("TABLE")
    }

    pub fn with(&mut self) -> &mut Self {
        self.write_text("WITH")
    }

    pub fn as_(&mut self) -> &mut Self {
        self.write_text("AS")
    }

    /// `AS <quoted-alias>`
    pub fn as_alias(&mut self, alias: &str, setting: &DbSetting) -> &mut Self {
        self.as_().write_quoted(alias, setting)
    }

    pub fn row_number(&mut self) -> &mut Self {
        self.write_text("ROW_NUMBER()")
    }

    pub fn over(&mut self) -> &mut Self {
        self.write_text("OVER")
    }

    pub fn merge(&mut self) -> &mut Self {
        self.write_text("MERGE")
    }

    pub fn using(&mut self) -> &mut Self {
        self.write_text("USING")
    }

    pub fn on(&mut self) -> &mut Self {
        self.write_text("ON")
    }

    pub fn when(&mut self) -> &mut Self {
        self.write_text("WHEN")
    }

    pub fn not(&mut self) -> &mut Self {
        self.write_text("NOT")
    }

    pub fn matched(&mut self) -> &mut Self {
        self.write_text("MATCHED")
    }

    pub fn then(&mut self) -> &mut Self {
        self.write_text("THEN")
    }

    pub fn output(&mut self) -> &mut Self {
        self.write_text("OUTPUT")
    }

    pub fn returning(&mut self) -> &mut Self {
        self.write_text("RETURNING")
    }

    pub fn open_paren(&mut self) -> &mut Self {
        self.write_text("(")
    }

    pub fn close_paren(&mut self) -> &mut Self {
        self.write_text(")")
    }

    /// Statement terminator.
    pub fn end(&mut self) -> &mut Self {
        self.write_text(";")
    }

    /// `TOP (<rows>)`
    pub fn top(&mut self, rows: usize) -> &mut Self {
        self.write_text(&format!("TOP ({rows})"))
    }

    /// `LIMIT <rows>`
    pub fn limit(&mut self, rows: usize) -> &mut Self {
        self.write_text(&format!("LIMIT {rows}"))
    }

    /// `LIMIT <rows> OFFSET <offset>`
    pub fn limit_offset(&mut self, rows: usize, offset: usize) -> &mut Self {
        self.write_text(&format!("LIMIT {rows} OFFSET {offset}"))
    }

    // ==================== Field-aware helpers ====================

    /// The quoted table name.
    pub fn table_name_from(&mut self, table_name: &str, setting: &DbSetting) -> &mut Self {
        self.write_quoted(table_name, setting)
    }

    /// Table hints, written verbatim when present.
    pub fn hints_from(&mut self, hints: Option<&str>) -> &mut Self {
        match hints.map(str::trim) {
            Some(hints) if !hints.is_empty() => self.write_text(hints),
            _ => self,
        }
    }

    /// `[A], [B], ...`
    pub fn fields_from(&mut self, fields: &[Field], setting: &DbSetting) -> &mut Self {
        let list = join(fields, |f| f.quoted(setting));
        self.write_text(&list)
    }

    /// `<alias>.[A], <alias>.[B], ...`
    pub fn aliased_fields_from(&mut self, fields: &[Field], alias: &str, setting: &DbSetting) -> &mut Self {
        let list = join(fields, |f| format!("{alias}.{}", f.quoted(setting)));
        self.write_text(&list)
    }

    /// `@A, @B, ...` with the batch index applied.
    pub fn parameters_from(&mut self, fields: &[Field], index: usize, setting: &DbSetting) -> &mut Self {
        let list = join(fields, |f| ident::parameter(f.name(), index, setting));
        self.write_text(&list)
    }

    /// `@A AS [A], @B AS [B], ...`
    pub fn parameters_as_fields_from(&mut self, fields: &[Field], index: usize, setting: &DbSetting) -> &mut Self {
        let list = join(fields, |f| {
            format!("{} AS {}", ident::parameter(f.name(), index, setting), f.quoted(setting))
        });
        self.write_text(&list)
    }

    /// `[A] = @A, [B] = @B, ...`
    pub fn fields_and_parameters_from(&mut self, fields: &[Field], index: usize, setting: &DbSetting) -> &mut Self {
        let list = join(fields, |f| {
            format!("{} = {}", f.quoted(setting), ident::parameter(f.name(), index, setting))
        });
        self.write_text(&list)
    }

    /// `<left>.[A] = <right>.[A], ...`
    pub fn fields_and_aliased_fields_from(
        &mut self,
        fields: &[Field],
        left_alias: &str,
        right_alias: &str,
        setting: &DbSetting,
    ) -> &mut Self {
        let list = join(fields, |f| {
            let quoted = f.quoted(setting);
            format!("{left_alias}.{quoted} = {right_alias}.{quoted}")
        });
        self.write_text(&list)
    }

    /// `WHERE <group>` unless the group is absent or empty.
    pub fn where_from(&mut self, group: Option<&QueryGroup>, index: usize, setting: &DbSetting) -> &mut Self {
        match group {
            Some(group) if !group.is_empty() => {
                let rendered = group.get_string(index, setting);
                self.write_text("WHERE").write_text(&rendered)
            }
            _ => self,
        }
    }

    /// `WHERE ([A] = @A AND [B] = @B)` built from equality on each field.
    pub fn where_from_fields(&mut self, fields: &[Field], index: usize, setting: &DbSetting) -> &mut Self {
        if fields.is_empty() {
            return self;
        }
        let parts = join_with(fields, " AND ", |f| {
            format!("{} = {}", f.quoted(setting), ident::parameter(f.name(), index, setting))
        });
        self.write_text("WHERE").write_text(&format!("({parts})"))
    }

    /// `ORDER BY [A] ASC, [B] DESC` unless `orders` is empty.
    pub fn order_by_from(&mut self, orders: &[OrderField], setting: &DbSetting) -> &mut Self {
        if orders.is_empty() {
            return self;
        }
        let list = join(orders, |o| o.get_string(setting));
        self.write_text("ORDER BY").write_text(&list)
    }
}

fn join<T>(items: &[T], render: impl Fn(&T) -> String) -> String {
    join_with(items, ", ", render)
}

fn join_with<T>(items: &[T], separator: &str, render: impl Fn(&T) -> String) -> String {
    items.iter().map(render).collect::<Vec<_>>().join(separator)
}

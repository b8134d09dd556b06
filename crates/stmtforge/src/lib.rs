//! # stmtforge
//!
//! A dialect-aware compiler from a small predicate model to parameterized SQL text.
//!
//! ## Features
//!
//! - **Predicate model**: [`Field`], [`OrderField`], [`QueryField`] and the boolean
//!   [`QueryGroup`] tree, built directly, parsed from serde "bags", or lowered from a
//!   [`Predicate`] expression
//! - **Statement compiler**: count, exists, aggregates, delete, truncate, insert,
//!   update, query, paged batch query and merge, with multi-row batch variants
//! - **Dialects**: SQL Server, PostgreSQL, MySQL and SQLite behind one
//!   [`StatementBuilder`] trait
//! - **Guards first**: every precondition is checked before any text is written;
//!   a failed call returns a typed [`StmtError`], never partial SQL
//!
//! No SQL is executed; parameter values travel separately via
//! [`QueryGroup::parameters`].
//!
//! ```ignore
//! use stmtforge::{Dialect, Field, QueryBuilder, QueryField, StatementRequest};
//!
//! let builder = Dialect::SqlServer.statement_builder();
//! let request = StatementRequest::new("Person")
//!     .fields(Field::from_names(&["Id", "Name"])?)
//!     .filter(QueryField::eq("Name", "Alice")?);
//!
//! let sql = builder.create_query(&mut QueryBuilder::new(), &request, Some(10))?;
//! assert_eq!(sql, "SELECT TOP (10) [Id], [Name] FROM [Person] WHERE ([Name] = @Name) ;");
//! ```

mod bag;
pub mod config;
pub mod db_field;
pub mod dialect;
pub mod error;
pub mod field;
mod hash;
pub mod ident;
pub mod predicate;
pub mod query_builder;
pub mod query_field;
pub mod query_group;
pub mod setting;
pub mod statement;
mod trace;
pub mod value;

pub use config::{GlobalConfiguration, GlobalConfigurationOptions, KeyColumnReturnBehavior};
pub use db_field::DbField;
pub use dialect::Dialect;
pub use error::{StmtError, StmtResult};
pub use field::{Field, Order, OrderField};
pub use predicate::{Predicate, col};
pub use query_builder::QueryBuilder;
pub use query_field::{
    FieldFunction, Operation, ParameterDirection, QueryField, QueryFieldKind, QueryParameter,
};
pub use query_group::{Conjunction, QueryGroup, QueryItem};
pub use setting::{DbSetting, DbSettingOverrides};
pub use statement::{
    MySqlStatementBuilder, PostgreSqlStatementBuilder, RowLimitStyle, SqlServerStatementBuilder,
    SqliteStatementBuilder, StatementBuilder, StatementRequest,
};
pub use value::{DbType, Value};

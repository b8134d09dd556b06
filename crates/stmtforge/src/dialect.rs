use crate::error::{StmtError, StmtResult};
use crate::setting::DbSetting;
use crate::statement::{
    MySqlStatementBuilder, PostgreSqlStatementBuilder, SqlServerStatementBuilder,
    SqliteStatementBuilder, StatementBuilder,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Dialect {
    #[default]
    SqlServer,
    PostgreSql,
    MySql,
    Sqlite,
}

impl Dialect {
    pub fn all() -> [Dialect; 4] {
        [
            Dialect::SqlServer,
            Dialect::PostgreSql,
            Dialect::MySql,
            Dialect::Sqlite,
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            Dialect::SqlServer => "sqlserver",
            Dialect::PostgreSql => "postgresql",
            Dialect::MySql => "mysql",
            Dialect::Sqlite => "sqlite",
        }
    }

    /// The dialect's default setting.
    pub fn db_setting(self) -> DbSetting {
        match self {
            Dialect::SqlServer => DbSetting::sql_server(),
            Dialect::PostgreSql => DbSetting::postgresql(),
            Dialect::MySql => DbSetting::mysql(),
            Dialect::Sqlite => DbSetting::sqlite(),
        }
    }

    /// A statement builder with the default setting.
    pub fn statement_builder(self) -> Box<dyn StatementBuilder> {
        self.statement_builder_with(self.db_setting())
    }

    /// A statement builder with a custom setting.
    pub fn statement_builder_with(self, setting: DbSetting) -> Box<dyn StatementBuilder> {
        match self {
            Dialect::SqlServer => Box::new(SqlServerStatementBuilder::new(setting)),
            Dialect::PostgreSql => Box::new(PostgreSqlStatementBuilder::new(setting)),
            Dialect::MySql => Box::new(MySqlStatementBuilder::new(setting)),
            Dialect::Sqlite => Box::new(SqliteStatementBuilder::new(setting)),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = StmtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlserver" | "mssql" => Ok(Dialect::SqlServer),
            "postgresql" | "postgres" | "pg" => Ok(Dialect::PostgreSql),
            "mysql" => Ok(Dialect::MySql),
            "sqlite" => Ok(Dialect::Sqlite),
            other => Err(StmtError::configuration(format!("unknown dialect '{other}'"))),
        }
    }
}

impl TryFrom<String> for Dialect {
    type Error = StmtError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Dialect> for String {
    fn from(dialect: Dialect) -> Self {
        dialect.name().to_string()
    }
}

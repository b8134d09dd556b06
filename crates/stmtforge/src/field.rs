//! Column references and ordering.
//!
//! [`Field`] names a column (optionally with a declared type) and compares equal
//! to its bare name. [`OrderField`] adds an ascending/descending direction.

use crate::bag;
use crate::error::{StmtError, StmtResult};
use crate::ident;
use crate::setting::DbSetting;
use crate::value::DbType;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// A named column reference.
///
/// Equality and hashing use the name only (case-sensitive), so a `Field`
/// is interchangeable with its bare name:
///
/// ```ignore
/// let fields: HashSet<Field> = Field::from_names(&["Id", "Name"])?.into_iter().collect();
/// assert!(fields.contains("Name"));
/// assert!(!fields.contains("name"));
/// ```
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
#[serde(try_from = "FieldRepr")]
pub struct Field {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    db_type: Option<DbType>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FieldRepr {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        db_type: Option<DbType>,
    },
}

impl TryFrom<FieldRepr> for Field {
    type Error = StmtError;

    fn try_from(repr: FieldRepr) -> StmtResult<Self> {
        match repr {
            FieldRepr::Name(name) => Field::new(name),
            FieldRepr::Full { name, db_type } => Ok(Field::new(name)?.with_db_type_opt(db_type)),
        }
    }
}

impl Field {
    /// Create a field; a blank name is a missing-input error.
    pub fn new(name: impl Into<String>) -> StmtResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(StmtError::missing_input("field name cannot be empty"));
        }
        Ok(Self {
            name,
            db_type: None,
        })
    }

    /// Create a field that carries a declared type.
    pub fn typed(name: impl Into<String>, db_type: DbType) -> StmtResult<Self> {
        Ok(Self::new(name)?.with_db_type(db_type))
    }

    /// Build fields from a list of names, preserving order.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> StmtResult<Vec<Field>> {
        names.iter().map(|n| Field::new(n.as_ref())).collect()
    }

    /// Build fields from the member names of a bag (struct or object literal).
    pub fn parse<T: Serialize + ?Sized>(bag: &T) -> StmtResult<Vec<Field>> {
        bag::members(bag)?
            .into_iter()
            .map(|(name, _)| Field::new(name))
            .collect()
    }

    pub(crate) fn unchecked(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            db_type: None,
        }
    }

    /// Attach a declared type.
    pub fn with_db_type(mut self, db_type: DbType) -> Self {
        self.db_type = Some(db_type);
        self
    }

    fn with_db_type_opt(mut self, db_type: Option<DbType>) -> Self {
        self.db_type = db_type;
        self
    }

    /// The column name as given.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared type, if any.
    pub fn db_type(&self) -> Option<DbType> {
        self.db_type
    }

    /// The quoted column name for a dialect.
    pub fn quoted(&self, setting: &DbSetting) -> String {
        ident::quote(&self.name, setting)
    }

    /// The column name without dialect quotes.
    pub fn unquoted(&self, setting: &DbSetting) -> String {
        ident::unquote(&self.name, setting)
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Hash for Field {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl Borrow<str> for Field {
    fn borrow(&self) -> &str {
        &self.name
    }
}

impl PartialEq<str> for Field {
    fn eq(&self, other: &str) -> bool {
        self.name == other
    }
}

impl PartialEq<&str> for Field {
    fn eq(&self, other: &&str) -> bool {
        self.name == *other
    }
}

impl PartialEq<String> for Field {
    fn eq(&self, other: &String) -> bool {
        &self.name == other
    }
}

impl PartialEq<Field> for str {
    fn eq(&self, other: &Field) -> bool {
        self == other.name
    }
}

impl PartialEq<Field> for &str {
    fn eq(&self, other: &Field) -> bool {
        *self == other.name
    }
}

impl TryFrom<&str> for Field {
    type Error = StmtError;

    fn try_from(name: &str) -> StmtResult<Self> {
        Field::new(name)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Order {
    #[default]
    Ascending,
    Descending,
}

impl Order {
    /// The SQL keyword.
    pub fn as_sql(self) -> &'static str {
        match self {
            Order::Ascending => "ASC",
            Order::Descending => "DESC",
        }
    }
}

impl FromStr for Order {
    type Err = StmtError;

    fn from_str(s: &str) -> StmtResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Order::Ascending),
            "desc" | "descending" => Ok(Order::Descending),
            other => Err(StmtError::invalid_operation(format!(
                "'{other}' is not a valid order direction"
            ))),
        }
    }
}

impl TryFrom<String> for Order {
    type Error = StmtError;

    fn try_from(s: String) -> StmtResult<Self> {
        s.parse()
    }
}

impl From<Order> for String {
    fn from(order: Order) -> Self {
        match order {
            Order::Ascending => "Ascending".to_string(),
            Order::Descending => "Descending".to_string(),
        }
    }
}

/// A field with a sort direction, rendered as `<quoted-name> ASC|DESC`.
///
/// Two order fields are equal only if both the name and the direction match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderField {
    name: String,
    #[serde(default)]
    order: Order,
}

impl OrderField {
    /// Create an order field; a blank name is a missing-input error.
    pub fn new(name: impl Into<String>, order: Order) -> StmtResult<Self> {
        let field = Field::new(name)?;
        Ok(Self {
            name: field.name,
            order,
        })
    }

    pub fn ascending(name: impl Into<String>) -> StmtResult<Self> {
        Self::new(name, Order::Ascending)
    }

    pub fn descending(name: impl Into<String>) -> StmtResult<Self> {
        Self::new(name, Order::Descending)
    }

    /// Parse ordered `name -> direction` pairs from a bag.
    ///
    /// Each member value must be a direction string (`"Ascending"`,
    /// `"DESC"`, ...). Member order becomes the ORDER BY column order.
    pub fn parse<T: Serialize + ?Sized>(bag: &T) -> StmtResult<Vec<OrderField>> {
        bag::members(bag)?
            .into_iter()
            .map(|(name, value)| {
                let serde_json::Value::String(direction) = value else {
                    return Err(StmtError::invalid_operation(format!(
                        "the order of '{name}' must be a direction string"
                    )));
                };
                OrderField::new(name, direction.parse()?)
            })
            .collect()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn order(&self) -> Order {
        self.order
    }

    /// Render `<quoted-name> ASC|DESC`.
    pub fn get_string(&self, setting: &DbSetting) -> String {
        format!("{} {}", ident::quote(&self.name, setting), self.order.as_sql())
    }

    /// The plain field this order field sorts by.
    pub fn as_field(&self) -> Field {
        Field::unchecked(self.name.clone())
    }
}

//! Single comparators: `<column> <op> <parameter>`.
//!
//! A [`QueryField`] is one leaf of a predicate tree. Besides the plain form it
//! comes in three kinds:
//!
//! - directional: carries a parameter direction and size (output parameters)
//! - functional: wraps the column in a one-argument function (`LOWER([Name])`)
//! - literal: emits caller text verbatim and binds nothing
//!
//! Equality and hashing look at the *shape* of a comparator (column name,
//! operation, declared type, kind specifics) and never at the bound value,
//! so "is there already a predicate on this column" is a plain set lookup.

use crate::bag;
use crate::error::{StmtError, StmtResult};
use crate::field::Field;
use crate::hash::{HashCache, hash_of};
use crate::ident;
use crate::setting::DbSetting;
use crate::value::{DbType, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Comparison operation of a [`QueryField`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Operation {
    #[default]
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
    Like,
    NotLike,
    Between,
    NotBetween,
    In,
    NotIn,
    IsNull,
    IsNotNull,
}

impl Operation {
    /// The SQL token of the operation.
    pub fn text(self) -> &'static str {
        match self {
            Operation::Equal => "=",
            Operation::NotEqual => "<>",
            Operation::LessThan => "<",
            Operation::GreaterThan => ">",
            Operation::LessThanOrEqual => "<=",
            Operation::GreaterThanOrEqual => ">=",
            Operation::Like => "LIKE",
            Operation::NotLike => "NOT LIKE",
            Operation::Between => "BETWEEN",
            Operation::NotBetween => "NOT BETWEEN",
            Operation::In => "IN",
            Operation::NotIn => "NOT IN",
            Operation::IsNull => "IS NULL",
            Operation::IsNotNull => "IS NOT NULL",
        }
    }

    fn is_range(self) -> bool {
        matches!(self, Operation::Between | Operation::NotBetween)
    }

    fn is_list(self) -> bool {
        matches!(self, Operation::In | Operation::NotIn)
    }

    fn is_null_check(self) -> bool {
        matches!(self, Operation::IsNull | Operation::IsNotNull)
    }
}

impl FromStr for Operation {
    type Err = StmtError;

    /// Accepts the variant name in any case, with or without underscores,
    /// the SQL token, or a short alias (`eq`, `ne`, `gt`, `ge`, `lt`, `le`).
    fn from_str(s: &str) -> StmtResult<Self> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != ' ')
            .flat_map(char::to_lowercase)
            .collect();
        let op = match key.as_str() {
            "equal" | "eq" | "=" | "==" => Operation::Equal,
            "notequal" | "ne" | "<>" | "!=" => Operation::NotEqual,
            "lessthan" | "lt" | "<" => Operation::LessThan,
            "greaterthan" | "gt" | ">" => Operation::GreaterThan,
            "lessthanorequal" | "le" | "lte" | "<=" => Operation::LessThanOrEqual,
            "greaterthanorequal" | "ge" | "gte" | ">=" => Operation::GreaterThanOrEqual,
            "like" => Operation::Like,
            "notlike" => Operation::NotLike,
            "between" => Operation::Between,
            "notbetween" => Operation::NotBetween,
            "in" => Operation::In,
            "notin" => Operation::NotIn,
            "isnull" => Operation::IsNull,
            "isnotnull" => Operation::IsNotNull,
            _ => {
                return Err(StmtError::invalid_operation(format!(
                    "'{s}' is not a known operation"
                )));
            }
        };
        Ok(op)
    }
}

impl TryFrom<String> for Operation {
    type Error = StmtError;

    fn try_from(s: String) -> StmtResult<Self> {
        s.parse()
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Direction of a bound parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ParameterDirection {
    #[default]
    Input,
    Output,
    InputOutput,
    ReturnValue,
}

/// One-argument function wrapped around the column of a functional field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldFunction {
    Lower,
    Upper,
    Trim,
    LTrim,
    RTrim,
    Len,
    Length,
    /// `LEFT({0}, n)`
    Left(usize),
    /// `RIGHT({0}, n)`
    Right(usize),
    /// Any template containing the `{0}` column placeholder.
    Custom(String),
}

impl FieldFunction {
    /// The format template, with `{0}` standing for the quoted column.
    pub fn template(&self) -> String {
        match self {
            FieldFunction::Lower => "LOWER({0})".to_string(),
            FieldFunction::Upper => "UPPER({0})".to_string(),
            FieldFunction::Trim => "TRIM({0})".to_string(),
            FieldFunction::LTrim => "LTRIM({0})".to_string(),
            FieldFunction::RTrim => "RTRIM({0})".to_string(),
            FieldFunction::Len => "LEN({0})".to_string(),
            FieldFunction::Length => "LENGTH({0})".to_string(),
            FieldFunction::Left(n) => format!("LEFT({{0}}, {n})"),
            FieldFunction::Right(n) => format!("RIGHT({{0}}, {n})"),
            FieldFunction::Custom(template) => template.clone(),
        }
    }

    /// Apply the template to a quoted column.
    pub fn apply(&self, column: &str) -> String {
        self.template().replace("{0}", column)
    }
}

/// The kind-specific part of a [`QueryField`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryFieldKind {
    Plain,
    Directional {
        direction: ParameterDirection,
        size: Option<usize>,
    },
    Functional(FieldFunction),
    Literal(String),
}

/// A bound parameter extracted from a predicate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryParameter {
    /// Placeholder name including the dialect prefix, e.g. `@Name_1`.
    pub name: String,
    pub value: Value,
    pub db_type: Option<DbType>,
    pub direction: ParameterDirection,
    pub size: Option<usize>,
}

/// One comparator of a predicate tree.
#[derive(Debug, Clone)]
pub struct QueryField {
    field: Field,
    operation: Operation,
    value: Value,
    prepend_underscore: bool,
    kind: QueryFieldKind,
    hash: HashCache,
}

impl QueryField {
    /// Create a plain comparator.
    ///
    /// `Between`/`NotBetween` need a two-element list, `In`/`NotIn` need a
    /// list; anything else is an invalid-operation error.
    pub fn new(name: impl Into<String>, operation: Operation, value: impl Into<Value>) -> StmtResult<Self> {
        let field = Field::new(name)?;
        Self::with_kind(field, operation, value.into(), QueryFieldKind::Plain)
    }

    fn with_kind(field: Field, operation: Operation, value: Value, kind: QueryFieldKind) -> StmtResult<Self> {
        validate_value(field.name(), operation, &value)?;
        Ok(Self {
            field,
            operation,
            value,
            prepend_underscore: false,
            kind,
            hash: HashCache::default(),
        })
    }

    pub fn eq(name: impl Into<String>, value: impl Into<Value>) -> StmtResult<Self> {
        Self::new(name, Operation::Equal, value)
    }

    pub fn ne(name: impl Into<String>, value: impl Into<Value>) -> StmtResult<Self> {
        Self::new(name, Operation::NotEqual, value)
    }

    pub fn lt(name: impl Into<String>, value: impl Into<Value>) -> StmtResult<Self> {
        Self::new(name, Operation::LessThan, value)
    }

    pub fn gt(name: impl Into<String>, value: impl Into<Value>) -> StmtResult<Self> {
        Self::new(name, Operation::GreaterThan, value)
    }

    pub fn le(name: impl Into<String>, value: impl Into<Value>) -> StmtResult<Self> {
        Self::new(name, Operation::LessThanOrEqual, value)
    }

    pub fn ge(name: impl Into<String>, value: impl Into<Value>) -> StmtResult<Self> {
        Self::new(name, Operation::GreaterThanOrEqual, value)
    }

    pub fn like(name: impl Into<String>, pattern: impl Into<Value>) -> StmtResult<Self> {
        Self::new(name, Operation::Like, pattern)
    }

    pub fn not_like(name: impl Into<String>, pattern: impl Into<Value>) -> StmtResult<Self> {
        Self::new(name, Operation::NotLike, pattern)
    }

    pub fn between(name: impl Into<String>, from: impl Into<Value>, to: impl Into<Value>) -> StmtResult<Self> {
        Self::new(name, Operation::Between, Value::List(vec![from.into(), to.into()]))
    }

    pub fn not_between(name: impl Into<String>, from: impl Into<Value>, to: impl Into<Value>) -> StmtResult<Self> {
        Self::new(name, Operation::NotBetween, Value::List(vec![from.into(), to.into()]))
    }

    pub fn in_list<T: Into<Value>>(name: impl Into<String>, values: Vec<T>) -> StmtResult<Self> {
        Self::new(name, Operation::In, Value::from(values))
    }

    pub fn not_in<T: Into<Value>>(name: impl Into<String>, values: Vec<T>) -> StmtResult<Self> {
        Self::new(name, Operation::NotIn, Value::from(values))
    }

    pub fn is_null(name: impl Into<String>) -> StmtResult<Self> {
        Self::new(name, Operation::IsNull, Value::Null)
    }

    pub fn is_not_null(name: impl Into<String>) -> StmtResult<Self> {
        Self::new(name, Operation::IsNotNull, Value::Null)
    }

    /// An `=` comparator whose parameter carries a direction and size.
    pub fn directional(
        name: impl Into<String>,
        value: impl Into<Value>,
        direction: ParameterDirection,
        size: Option<usize>,
    ) -> StmtResult<Self> {
        let field = Field::new(name)?;
        Self::with_kind(
            field,
            Operation::Equal,
            value.into(),
            QueryFieldKind::Directional { direction, size },
        )
    }

    /// A comparator whose column is wrapped in `function`.
    pub fn functional(
        name: impl Into<String>,
        operation: Operation,
        value: impl Into<Value>,
        function: FieldFunction,
    ) -> StmtResult<Self> {
        if let FieldFunction::Custom(template) = &function
            && !template.contains("{0}")
        {
            return Err(StmtError::invalid_operation(format!(
                "function template '{template}' has no {{0}} placeholder"
            )));
        }
        let field = Field::new(name)?;
        Self::with_kind(field, operation, value.into(), QueryFieldKind::Functional(function))
    }

    /// A comparator rendered exactly as `text`, binding no parameters.
    pub fn literal(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            field: Field::unchecked(text.clone()),
            operation: Operation::Equal,
            value: Value::Null,
            prepend_underscore: false,
            kind: QueryFieldKind::Literal(text),
            hash: HashCache::default(),
        }
    }

    /// One `=` comparator per member of a bag, in member order.
    ///
    /// A member whose value is an object with an `operation` key (and
    /// optionally a `value`) uses that operation instead:
    ///
    /// ```ignore
    /// let fields = QueryField::parse(&json!({
    ///     "Name": "John",
    ///     "Age": { "operation": "GreaterThan", "value": 18 },
    /// }))?;
    /// ```
    pub fn parse<T: Serialize + ?Sized>(bag: &T) -> StmtResult<Vec<QueryField>> {
        bag::members(bag)?
            .into_iter()
            .map(|(name, value)| match value {
                serde_json::Value::Object(mut map) => {
                    let Some(op) = map.remove("operation") else {
                        return Err(StmtError::invalid_operation(format!(
                            "the value of '{name}' is an object without an 'operation'"
                        )));
                    };
                    let serde_json::Value::String(op) = op else {
                        return Err(StmtError::invalid_operation(format!(
                            "the operation of '{name}' must be a string"
                        )));
                    };
                    let value = map.remove("value").map(Value::from).unwrap_or_default();
                    QueryField::new(name, op.parse()?, value)
                }
                other => QueryField::eq(name, Value::from(other)),
            })
            .collect()
    }

    /// One `=` comparator per `(name, value)` pair.
    pub fn from_pairs<K, V, I>(pairs: I) -> StmtResult<Vec<QueryField>>
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        pairs
            .into_iter()
            .map(|(name, value)| QueryField::eq(name, value))
            .collect()
    }

    /// Copy with a declared type attached.
    pub fn with_db_type(&self, db_type: DbType) -> Self {
        Self {
            field: self.field.clone().with_db_type(db_type),
            operation: self.operation,
            value: self.value.clone(),
            prepend_underscore: self.prepend_underscore,
            kind: self.kind.clone(),
            hash: HashCache::default(),
        }
    }

    /// Copy whose parameter is named `@_Name`.
    pub fn with_prepended_underscore(&self) -> Self {
        let mut copy = self.clone();
        copy.prepend_underscore = true;
        copy
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn name(&self) -> &str {
        self.field.name()
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn db_type(&self) -> Option<DbType> {
        self.field.db_type()
    }

    pub fn kind(&self) -> &QueryFieldKind {
        &self.kind
    }

    pub fn prepends_underscore(&self) -> bool {
        self.prepend_underscore
    }

    pub fn is_literal(&self) -> bool {
        matches!(self.kind, QueryFieldKind::Literal(_))
    }

    /// Parameter stem without prefix or batch index (`Name` or `_Name`).
    pub(crate) fn parameter_stem(&self, setting: &DbSetting) -> String {
        let name = ident::parameter_name(self.field.name(), setting);
        if self.prepend_underscore {
            format!("_{name}")
        } else {
            name
        }
    }

    fn binds_null_check(&self) -> bool {
        if matches!(self.kind, QueryFieldKind::Directional { .. }) {
            return false;
        }
        self.operation.is_null_check()
            || (matches!(self.operation, Operation::Equal | Operation::NotEqual) && self.value.is_null())
    }

    /// Render with an explicit parameter stem (already indexed).
    pub(crate) fn render_with(&self, stem: &str, setting: &DbSetting) -> String {
        if let QueryFieldKind::Literal(text) = &self.kind {
            return text.clone();
        }

        let quoted = ident::quote(self.field.name(), setting);
        let left = match &self.kind {
            QueryFieldKind::Functional(function) => function.apply(&quoted),
            _ => quoted,
        };
        let param = format!("{}{stem}", setting.parameter_prefix);

        if self.binds_null_check() {
            let test = match self.operation {
                Operation::NotEqual | Operation::IsNotNull => "IS NOT NULL",
                _ => "IS NULL",
            };
            return format!("{left} {test}");
        }
        if self.operation.is_range() {
            return format!("{left} {} {param}_Left AND {param}_Right", self.operation.text());
        }
        if self.operation.is_list() {
            let len = self.value.as_list().map_or(0, <[Value]>::len);
            if len == 0 {
                return match self.operation {
                    Operation::In => "1 = 0".to_string(),
                    _ => "1 = 1".to_string(),
                };
            }
            let items: Vec<String> = (0..len).map(|i| format!("{param}_In_{i}")).collect();
            return format!("{left} {} ({})", self.operation.text(), items.join(", "));
        }
        format!("{left} {} {param}", self.operation.text())
    }

    /// Render `<quoted-name> <op> <prefix>Name[_<index>]`.
    pub fn get_string(&self, index: usize, setting: &DbSetting) -> String {
        self.render_with(&ident::with_index(&self.parameter_stem(setting), index), setting)
    }

    /// Parameters bound under an explicit stem.
    pub(crate) fn parameters_with(&self, stem: &str, setting: &DbSetting) -> Vec<QueryParameter> {
        if self.is_literal() || self.binds_null_check() {
            return Vec::new();
        }
        let param = format!("{}{stem}", setting.parameter_prefix);
        let db_type = self.field.db_type();
        let input = |name: String, value: Value| QueryParameter {
            name,
            value,
            db_type,
            direction: ParameterDirection::Input,
            size: None,
        };

        if self.operation.is_range() {
            let items = self.value.as_list().unwrap_or_default();
            return ["Left", "Right"]
                .iter()
                .zip(items)
                .map(|(side, v)| input(format!("{param}_{side}"), v.clone()))
                .collect();
        }
        if self.operation.is_list() {
            let items = self.value.as_list().unwrap_or_default();
            return items
                .iter()
                .enumerate()
                .map(|(i, v)| input(format!("{param}_In_{i}"), v.clone()))
                .collect();
        }

        let (direction, size) = match &self.kind {
            QueryFieldKind::Directional { direction, size } => (*direction, *size),
            _ => (ParameterDirection::Input, None),
        };
        vec![QueryParameter {
            name: param,
            value: self.value.clone(),
            db_type,
            direction,
            size,
        }]
    }

    /// The parameters [`get_string`](Self::get_string) refers to.
    pub fn parameters(&self, index: usize, setting: &DbSetting) -> Vec<QueryParameter> {
        self.parameters_with(&ident::with_index(&self.parameter_stem(setting), index), setting)
    }

    fn shape_hash(&self) -> u64 {
        self.hash.get_or_compute(|| {
            hash_of(&(self.field.name(), self.operation, self.field.db_type(), &self.kind))
        })
    }
}

fn validate_value(name: &str, operation: Operation, value: &Value) -> StmtResult<()> {
    if operation.is_range() {
        match value.as_list() {
            Some(items) if items.len() == 2 => {}
            _ => {
                return Err(StmtError::invalid_operation(format!(
                    "'{name}' {} needs exactly two values",
                    operation.text()
                )));
            }
        }
    }
    if operation.is_list() && value.as_list().is_none() {
        return Err(StmtError::invalid_operation(format!(
            "'{name}' {} needs a list of values",
            operation.text()
        )));
    }
    Ok(())
}

impl PartialEq for QueryField {
    fn eq(&self, other: &Self) -> bool {
        self.shape_hash() == other.shape_hash()
            && self.field.name() == other.field.name()
            && self.operation == other.operation
            && self.field.db_type() == other.field.db_type()
            && self.kind == other.kind
    }
}

impl Eq for QueryField {}

impl Hash for QueryField {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.shape_hash());
    }
}

impl PartialEq<str> for QueryField {
    fn eq(&self, other: &str) -> bool {
        self.field.name() == other
    }
}

impl PartialEq<&str> for QueryField {
    fn eq(&self, other: &&str) -> bool {
        self.field.name() == *other
    }
}

impl fmt::Display for QueryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.get_string(0, &DbSetting::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn mssql() -> DbSetting {
        DbSetting::sql_server()
    }

    #[test]
    fn renders_plain_comparator() {
        let f = QueryField::eq("Name", "John").unwrap();
        assert_eq!(f.get_string(0, &mssql()), "[Name] = @Name");
        assert_eq!(f.get_string(2, &mssql()), "[Name] = @Name_2");
    }

    #[test]
    fn renders_every_operation_token() {
        let cases = [
            (Operation::NotEqual, "[Id] <> @Id"),
            (Operation::LessThan, "[Id] < @Id"),
            (Operation::GreaterThan, "[Id] > @Id"),
            (Operation::LessThanOrEqual, "[Id] <= @Id"),
            (Operation::GreaterThanOrEqual, "[Id] >= @Id"),
            (Operation::Like, "[Id] LIKE @Id"),
            (Operation::NotLike, "[Id] NOT LIKE @Id"),
        ];
        for (op, expected) in cases {
            assert_eq!(QueryField::new("Id", op, 1).unwrap().get_string(0, &mssql()), expected);
        }
    }

    #[test]
    fn null_value_renders_is_null() {
        let f = QueryField::eq("Name", Value::Null).unwrap();
        assert_eq!(f.get_string(0, &mssql()), "[Name] IS NULL");
        assert!(f.parameters(0, &mssql()).is_empty());

        let f = QueryField::ne("Name", Value::Null).unwrap();
        assert_eq!(f.get_string(0, &mssql()), "[Name] IS NOT NULL");
        assert_eq!(QueryField::is_not_null("Name").unwrap().get_string(0, &mssql()), "[Name] IS NOT NULL");
    }

    #[test]
    fn between_renders_left_right() {
        let f = QueryField::between("Age", 1, 10).unwrap();
        assert_eq!(f.get_string(1, &mssql()), "[Age] BETWEEN @Age_1_Left AND @Age_1_Right");
        let names: Vec<String> = f.parameters(1, &mssql()).into_iter().map(|p| p.name).collect();
        assert_eq!(names, ["@Age_1_Left", "@Age_1_Right"]);
    }

    #[test]
    fn between_requires_two_values() {
        let err = QueryField::new("Age", Operation::Between, vec![1]).unwrap_err();
        assert!(err.is_invalid_operation());
        let err = QueryField::new("Age", Operation::In, 1).unwrap_err();
        assert!(err.is_invalid_operation());
    }

    #[test]
    fn in_list_renders_each_item() {
        let f = QueryField::in_list("Id", vec![1, 2, 3]).unwrap();
        assert_eq!(f.get_string(0, &mssql()), "[Id] IN (@Id_In_0, @Id_In_1, @Id_In_2)");
        assert_eq!(f.parameters(0, &mssql()).len(), 3);
    }

    #[test]
    fn empty_in_list_is_constant() {
        let f = QueryField::in_list::<i32>("Id", vec![]).unwrap();
        assert_eq!(f.get_string(0, &mssql()), "1 = 0");
        let f = QueryField::not_in::<i32>("Id", vec![]).unwrap();
        assert_eq!(f.get_string(0, &mssql()), "1 = 1");
    }

    #[test]
    fn functional_wraps_column() {
        let f = QueryField::functional("Name", Operation::Equal, "x", FieldFunction::Lower).unwrap();
        assert_eq!(f.get_string(0, &mssql()), "LOWER([Name]) = @Name");
        let f = QueryField::functional("Name", Operation::Equal, "ab", FieldFunction::Left(2)).unwrap();
        assert_eq!(f.get_string(0, &mssql()), "LEFT([Name], 2) = @Name");
    }

    #[test]
    fn functional_custom_template_needs_placeholder() {
        let err = QueryField::functional("Name", Operation::Equal, "x", FieldFunction::Custom("SOUNDEX(x)".into()))
            .unwrap_err();
        assert!(err.is_invalid_operation());
    }

    #[test]
    fn literal_is_verbatim() {
        let f = QueryField::literal("[Age] > 18 /* raw */");
        assert_eq!(f.get_string(3, &mssql()), "[Age] > 18 /* raw */");
        assert!(f.parameters(0, &mssql()).is_empty());
    }

    #[test]
    fn underscore_parameter() {
        let f = QueryField::eq("Id", 1).unwrap().with_prepended_underscore();
        assert_eq!(f.get_string(0, &mssql()), "[Id] = @_Id");
    }

    #[test]
    fn directional_parameter_keeps_direction() {
        let f = QueryField::directional("Result", Value::Null, ParameterDirection::Output, Some(8)).unwrap();
        assert_eq!(f.get_string(0, &mssql()), "[Result] = @Result");
        assert_eq!(f.parameters(0, &mssql())[0].direction, ParameterDirection::Output);

        let f = QueryField::directional("Result", 0, ParameterDirection::InputOutput, Some(8)).unwrap();
        let params = f.parameters(0, &mssql());
        assert_eq!(params[0].direction, ParameterDirection::InputOutput);
        assert_eq!(params[0].size, Some(8));
    }

    #[test]
    fn equality_ignores_value() {
        let a = QueryField::eq("Id", 1).unwrap();
        let b = QueryField::eq("Id", 2).unwrap();
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));

        let set: HashSet<QueryField> = [a].into_iter().collect();
        assert!(set.contains(&b));
    }

    #[test]
    fn equality_uses_operation_and_type() {
        let a = QueryField::eq("Id", 1).unwrap();
        assert_ne!(a, QueryField::gt("Id", 1).unwrap());
        assert_ne!(a, a.with_db_type(DbType::Int64));
        assert_ne!(
            QueryField::functional("Id", Operation::Equal, 1, FieldFunction::Left(1)).unwrap(),
            QueryField::functional("Id", Operation::Equal, 1, FieldFunction::Left(2)).unwrap(),
        );
    }

    #[test]
    fn equality_with_name_is_case_sensitive() {
        let f = QueryField::eq("FieldName", 1).unwrap();
        assert!(f == "FieldName");
        assert!(f != "fieldname");
    }

    #[test]
    fn parse_bag_with_operations() {
        let fields = QueryField::parse(&serde_json::json!({
            "Name": "John",
            "Age": { "operation": "GreaterThan", "value": 18 },
        }))
        .unwrap();
        let rendered: Vec<String> = fields.iter().map(|f| f.get_string(0, &mssql())).collect();
        assert_eq!(rendered, ["[Name] = @Name", "[Age] > @Age"]);
    }

    #[test]
    fn parse_bag_rejects_nested_object() {
        let err = QueryField::parse(&serde_json::json!({ "Age": { "value": 18 } })).unwrap_err();
        assert!(err.is_invalid_operation());
    }

    #[test]
    fn operation_from_str_aliases() {
        assert_eq!("greater_than".parse::<Operation>().unwrap(), Operation::GreaterThan);
        assert_eq!("NotIn".parse::<Operation>().unwrap(), Operation::NotIn);
        assert_eq!(">=".parse::<Operation>().unwrap(), Operation::GreaterThanOrEqual);
        assert!("approximately".parse::<Operation>().is_err());
    }
}

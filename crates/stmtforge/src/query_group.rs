//! Boolean predicate trees.
//!
//! A [`QueryGroup`] joins an ordered list of [`QueryField`] leaves and nested
//! groups with one conjunction, optionally negated. Rendering is fully
//! parenthesized:
//!
//! ```ignore
//! let group = QueryGroup::and(vec![QueryField::eq("Id", 1)?, QueryField::gt("Age", 18)?])
//!     .with_group(QueryGroup::or(vec![
//!         QueryField::eq("Name", "a")?,
//!         QueryField::eq("Name", "b")?,
//!     ]));
//! assert_eq!(
//!     group.get_string(0, &DbSetting::sql_server()),
//!     "([Id] = @Id AND [Age] > @Age AND ([Name] = @Name OR [Name] = @Name_1))"
//! );
//! ```
//!
//! When one parameter stem occurs several times in a tree, later occurrences
//! are suffixed in traversal order (`@Name`, `@Name_1`, ...). The batch index
//! passed to [`QueryGroup::get_string`] is appended after that suffix.

use crate::bag;
use crate::error::{StmtError, StmtResult};
use crate::hash::{HashCache, hash_of};
use crate::ident;
use crate::query_field::{QueryField, QueryParameter};
use crate::setting::DbSetting;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// How the children of a group are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Conjunction {
    #[default]
    And,
    Or,
}

impl Conjunction {
    pub fn text(self) -> &'static str {
        match self {
            Conjunction::And => "AND",
            Conjunction::Or => "OR",
        }
    }
}

impl FromStr for Conjunction {
    type Err = StmtError;

    fn from_str(s: &str) -> StmtResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "and" | "&&" => Ok(Conjunction::And),
            "or" | "||" => Ok(Conjunction::Or),
            other => Err(StmtError::invalid_operation(format!(
                "'{other}' is not a conjunction"
            ))),
        }
    }
}

impl fmt::Display for Conjunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// A child of a [`QueryGroup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryItem {
    Field(QueryField),
    Group(QueryGroup),
}

impl QueryItem {
    fn shape_hash(&self) -> u64 {
        match self {
            QueryItem::Field(field) => hash_of(field),
            QueryItem::Group(group) => group.shape_hash(),
        }
    }
}

impl From<QueryField> for QueryItem {
    fn from(field: QueryField) -> Self {
        QueryItem::Field(field)
    }
}

impl From<QueryGroup> for QueryItem {
    fn from(group: QueryGroup) -> Self {
        QueryItem::Group(group)
    }
}

/// An ordered boolean combination of comparators and sub-groups.
#[derive(Debug, Clone, Default)]
pub struct QueryGroup {
    conjunction: Conjunction,
    negated: bool,
    items: Vec<QueryItem>,
    hash: HashCache,
}

/// Hands out de-duplicated parameter stems while a tree is walked.
#[derive(Default)]
struct ParameterNamer {
    issued: HashSet<String>,
    suffixes: HashMap<String, usize>,
}

impl ParameterNamer {
    fn next(&mut self, field: &QueryField, index: usize, setting: &DbSetting) -> String {
        let stem = field.parameter_stem(setting);
        let mut name = stem.clone();
        if self.issued.contains(&name) {
            // A suffixed name may already belong to a column such as `Id_1`.
            let suffix = self.suffixes.entry(stem.clone()).or_insert(0);
            loop {
                *suffix += 1;
                name = format!("{stem}_{suffix}");
                if !self.issued.contains(&name) {
                    break;
                }
            }
        }
        self.issued.insert(name.clone());
        ident::with_index(&name, index)
    }
}

impl QueryGroup {
    /// An empty group joined by `conjunction`.
    pub fn new(conjunction: Conjunction) -> Self {
        Self {
            conjunction,
            ..Self::default()
        }
    }

    /// `(f1 AND f2 AND ...)`
    pub fn and(fields: Vec<QueryField>) -> Self {
        Self::from_items(Conjunction::And, fields.into_iter().map(QueryItem::Field).collect())
    }

    /// `(f1 OR f2 OR ...)`
    pub fn or(fields: Vec<QueryField>) -> Self {
        Self::from_items(Conjunction::Or, fields.into_iter().map(QueryItem::Field).collect())
    }

    pub fn from_items(conjunction: Conjunction, items: Vec<QueryItem>) -> Self {
        Self {
            conjunction,
            negated: false,
            items,
            hash: HashCache::default(),
        }
    }

    /// AND of one `=` comparator per bag member.
    pub fn parse<T: Serialize + ?Sized>(bag: &T) -> StmtResult<Self> {
        Ok(Self::and(QueryField::parse(bag)?))
    }

    /// Toggle negation (`NOT (...)`).
    pub fn negate(mut self) -> Self {
        self.negated = !self.negated;
        self.hash = HashCache::default();
        self
    }

    pub fn with_field(mut self, field: QueryField) -> Self {
        self.items.push(QueryItem::Field(field));
        self.hash = HashCache::default();
        self
    }

    pub fn with_group(mut self, group: QueryGroup) -> Self {
        self.items.push(QueryItem::Group(group));
        self.hash = HashCache::default();
        self
    }

    pub fn conjunction(&self) -> Conjunction {
        self.conjunction
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    pub fn items(&self) -> &[QueryItem] {
        &self.items
    }

    pub(crate) fn into_items(self) -> Vec<QueryItem> {
        self.items
    }

    /// True when the tree holds no comparator at any depth.
    pub fn is_empty(&self) -> bool {
        self.items.iter().all(|item| match item {
            QueryItem::Field(_) => false,
            QueryItem::Group(group) => group.is_empty(),
        })
    }

    /// All leaves in traversal order.
    pub fn fields(&self) -> Vec<&QueryField> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a QueryField>) {
        for item in &self.items {
            match item {
                QueryItem::Field(field) => out.push(field),
                QueryItem::Group(group) => group.collect_fields(out),
            }
        }
    }

    /// Copy whose every leaf names its parameter `@_Name`.
    pub fn for_update(&self) -> Self {
        let items = self
            .items
            .iter()
            .map(|item| match item {
                QueryItem::Field(field) => QueryItem::Field(field.with_prepended_underscore()),
                QueryItem::Group(group) => QueryItem::Group(group.for_update()),
            })
            .collect();
        Self {
            conjunction: self.conjunction,
            negated: self.negated,
            items,
            hash: HashCache::default(),
        }
    }

    /// Render the parenthesized tree; an empty tree renders as `""`.
    pub fn get_string(&self, index: usize, setting: &DbSetting) -> String {
        self.render(&mut ParameterNamer::default(), index, setting)
    }

    fn render(&self, namer: &mut ParameterNamer, index: usize, setting: &DbSetting) -> String {
        let parts: Vec<String> = self
            .items
            .iter()
            .filter_map(|item| match item {
                QueryItem::Field(field) if field.is_literal() => Some(field.render_with("", setting)),
                QueryItem::Field(field) => {
                    let stem = namer.next(field, index, setting);
                    Some(field.render_with(&stem, setting))
                }
                QueryItem::Group(group) if group.is_empty() => None,
                QueryItem::Group(group) => Some(group.render(namer, index, setting)),
            })
            .collect();
        if parts.is_empty() {
            return String::new();
        }
        let separator = format!(" {} ", self.conjunction.text());
        let body = format!("({})", parts.join(&separator));
        if self.negated {
            format!("NOT {body}")
        } else {
            body
        }
    }

    /// Parameters named exactly as in [`get_string`](Self::get_string).
    pub fn parameters(&self, index: usize, setting: &DbSetting) -> Vec<QueryParameter> {
        let mut out = Vec::new();
        self.collect_parameters(&mut ParameterNamer::default(), index, setting, &mut out);
        out
    }

    fn collect_parameters(
        &self,
        namer: &mut ParameterNamer,
        index: usize,
        setting: &DbSetting,
        out: &mut Vec<QueryParameter>,
    ) {
        for item in &self.items {
            match item {
                QueryItem::Field(field) if field.is_literal() => {}
                QueryItem::Field(field) => {
                    let stem = namer.next(field, index, setting);
                    out.extend(field.parameters_with(&stem, setting));
                }
                QueryItem::Group(group) if group.is_empty() => {}
                QueryItem::Group(group) => group.collect_parameters(namer, index, setting, out),
            }
        }
    }

    fn shape_hash(&self) -> u64 {
        self.hash.get_or_compute(|| {
            let children: Vec<u64> = self.items.iter().map(QueryItem::shape_hash).collect();
            hash_of(&(self.conjunction, self.negated, children))
        })
    }
}

impl PartialEq for QueryGroup {
    fn eq(&self, other: &Self) -> bool {
        self.shape_hash() == other.shape_hash()
            && self.conjunction == other.conjunction
            && self.negated == other.negated
            && self.items == other.items
    }
}

impl Eq for QueryGroup {}

impl Hash for QueryGroup {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.shape_hash());
    }
}

impl From<QueryField> for QueryGroup {
    fn from(field: QueryField) -> Self {
        QueryGroup::and(vec![field])
    }
}

impl From<Vec<QueryField>> for QueryGroup {
    fn from(fields: Vec<QueryField>) -> Self {
        QueryGroup::and(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn mssql() -> DbSetting {
        DbSetting::sql_server()
    }

    #[test]
    fn renders_nested_groups() {
        let group = QueryGroup::and(vec![
            QueryField::eq("Id", 1).unwrap(),
            QueryField::gt("Age", 18).unwrap(),
        ])
        .with_group(QueryGroup::or(vec![
            QueryField::eq("City", "A").unwrap(),
            QueryField::eq("Country", "B").unwrap(),
        ]));
        assert_eq!(
            group.get_string(0, &mssql()),
            "([Id] = @Id AND [Age] > @Age AND ([City] = @City OR [Country] = @Country))"
        );
    }

    #[test]
    fn negation_wraps_in_not() {
        let group = QueryGroup::from(QueryField::eq("Id", 1).unwrap()).negate();
        assert_eq!(group.get_string(0, &mssql()), "NOT ([Id] = @Id)");
        assert!(!group.clone().negate().is_negated());
    }

    #[test]
    fn empty_group_renders_nothing() {
        let group = QueryGroup::new(Conjunction::And).with_group(QueryGroup::new(Conjunction::Or));
        assert!(group.is_empty());
        assert_eq!(group.get_string(0, &mssql()), "");
    }

    #[test]
    fn empty_children_are_skipped() {
        let group = QueryGroup::from(QueryField::eq("Id", 1).unwrap())
            .with_group(QueryGroup::new(Conjunction::Or));
        assert_eq!(group.get_string(0, &mssql()), "([Id] = @Id)");
    }

    #[test]
    fn repeated_fields_get_distinct_parameters() {
        let group = QueryGroup::or(vec![
            QueryField::eq("Id", 1).unwrap(),
            QueryField::eq("Id", 2).unwrap(),
            QueryField::eq("Id", 3).unwrap(),
        ]);
        assert_eq!(group.get_string(0, &mssql()), "([Id] = @Id OR [Id] = @Id_1 OR [Id] = @Id_2)");

        let params = group.parameters(0, &mssql());
        let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["@Id", "@Id_1", "@Id_2"]);
        assert_eq!(params[2].value, Value::Int(3));
    }

    #[test]
    fn suffixed_parameters_skip_existing_columns() {
        let group = QueryGroup::and(vec![
            QueryField::eq("Id_1", 10).unwrap(),
            QueryField::eq("Id", 1).unwrap(),
            QueryField::eq("Id", 2).unwrap(),
            QueryField::eq("Id_1", 11).unwrap(),
        ]);
        assert_eq!(
            group.get_string(0, &mssql()),
            "([Id_1] = @Id_1 AND [Id] = @Id AND [Id] = @Id_2 AND [Id_1] = @Id_1_1)"
        );

        let params = group.parameters(0, &mssql());
        let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["@Id_1", "@Id", "@Id_2", "@Id_1_1"]);
        assert_eq!(params[2].value, Value::Int(2));
    }

    #[test]
    fn batch_index_follows_occurrence() {
        let group = QueryGroup::and(vec![
            QueryField::eq("Id", 1).unwrap(),
            QueryField::eq("Name", "x").unwrap(),
        ]);
        assert_eq!(group.get_string(2, &mssql()), "([Id] = @Id_2 AND [Name] = @Name_2)");
    }

    #[test]
    fn for_update_prefixes_every_leaf() {
        let group = QueryGroup::and(vec![QueryField::eq("Id", 1).unwrap()])
            .with_group(QueryGroup::or(vec![QueryField::eq("Code", "x").unwrap()]));
        assert_eq!(
            group.for_update().get_string(0, &mssql()),
            "([Id] = @_Id AND ([Code] = @_Code))"
        );
    }

    #[test]
    fn parse_bag_is_and_of_equals() {
        let group = QueryGroup::parse(&serde_json::json!({ "Name": "John", "Age": 30 })).unwrap();
        assert_eq!(group.conjunction(), Conjunction::And);
        assert_eq!(group.get_string(0, &mssql()), "([Name] = @Name AND [Age] = @Age)");
    }

    #[test]
    fn equality_is_structural_and_value_blind() {
        let a = QueryGroup::and(vec![QueryField::eq("Id", 1).unwrap()]);
        let b = QueryGroup::and(vec![QueryField::eq("Id", 2).unwrap()]);
        let c = QueryGroup::or(vec![QueryField::eq("Id", 1).unwrap()]);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_ne!(a, c);
        assert_ne!(a, a.clone().negate());
    }

    #[test]
    fn child_order_matters() {
        let a = QueryGroup::and(vec![QueryField::eq("A", 1).unwrap(), QueryField::eq("B", 1).unwrap()]);
        let b = QueryGroup::and(vec![QueryField::eq("B", 1).unwrap(), QueryField::eq("A", 1).unwrap()]);
        assert_ne!(a, b);
    }

    #[test]
    fn literal_leaves_bind_nothing() {
        let group = QueryGroup::and(vec![
            QueryField::literal("[Deleted] = 0"),
            QueryField::eq("Id", 1).unwrap(),
        ]);
        assert_eq!(group.get_string(0, &mssql()), "([Deleted] = 0 AND [Id] = @Id)");
        assert_eq!(group.parameters(0, &mssql()).len(), 1);
    }
}

//! Identifier quoting and parameter naming.
//!
//! Identifiers may be dotted (`schema.table`) and any segment may already be
//! quoted with the dialect's quote pair (`[dbo].[Person]`). Quoting is applied
//! per segment and never doubles an existing quote pair.
//!
//! # Example
//! ```ignore
//! use stmtforge::{DbSetting, ident};
//!
//! let setting = DbSetting::sql_server();
//! assert_eq!(ident::quote("dbo.Person", &setting), "[dbo].[Person]");
//! assert_eq!(ident::unquote("[dbo].[Person]", &setting), "dbo.Person");
//! assert_eq!(ident::parameter("Name", 2, &setting), "@Name_2");
//! ```

use crate::setting::DbSetting;

/// Split a possibly-quoted dotted identifier into its raw segments.
///
/// Separators inside a quoted segment are kept as part of the segment.
fn segments<'a>(name: &'a str, setting: &DbSetting) -> Vec<&'a str> {
    let open = setting.opening_quote.as_str();
    let close = setting.closing_quote.as_str();
    let sep = setting.schema_separator.as_str();

    let mut out = Vec::new();
    let mut start = 0;
    let mut in_quote = false;
    let mut i = 0;
    while i < name.len() {
        let rest = &name[i..];
        if !in_quote && !open.is_empty() && rest.starts_with(open) {
            in_quote = true;
            i += open.len();
            continue;
        }
        if in_quote && !close.is_empty() && rest.starts_with(close) {
            // An escaped closing quote inside a quoted segment.
            if rest[close.len()..].starts_with(close) {
                i += close.len() * 2;
                continue;
            }
            in_quote = false;
            i += close.len();
            continue;
        }
        if !in_quote && !sep.is_empty() && rest.starts_with(sep) {
            out.push(&name[start..i]);
            i += sep.len();
            start = i;
            continue;
        }
        i += rest.chars().next().map_or(1, char::len_utf8);
    }
    out.push(&name[start..]);
    out
}

fn is_quoted(segment: &str, setting: &DbSetting) -> bool {
    let open = setting.opening_quote.as_str();
    let close = setting.closing_quote.as_str();
    segment.len() >= open.len() + close.len()
        && segment.starts_with(open)
        && segment.ends_with(close)
}

fn quote_segment(segment: &str, setting: &DbSetting, out: &mut String) {
    let segment = segment.trim();
    if is_quoted(segment, setting) {
        out.push_str(segment);
        return;
    }
    out.push_str(&setting.opening_quote);
    if setting.closing_quote.is_empty() {
        out.push_str(segment);
    } else {
        let escaped = format!("{0}{0}", setting.closing_quote);
        out.push_str(&segment.replace(&setting.closing_quote, &escaped));
    }
    out.push_str(&setting.closing_quote);
}

/// Quote an identifier with the dialect's quote pair, segment by segment.
pub fn quote(name: &str, setting: &DbSetting) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, seg) in segments(name.trim(), setting).into_iter().enumerate() {
        if i > 0 {
            out.push_str(&setting.schema_separator);
        }
        quote_segment(seg, setting, &mut out);
    }
    out
}

/// Strip the dialect's quote pair from every segment of an identifier.
pub fn unquote(name: &str, setting: &DbSetting) -> String {
    let mut out = String::with_capacity(name.len());
    for (i, seg) in segments(name.trim(), setting).into_iter().enumerate() {
        if i > 0 {
            out.push_str(&setting.schema_separator);
        }
        let seg = seg.trim();
        if is_quoted(seg, setting) {
            let inner =
                &seg[setting.opening_quote.len()..seg.len() - setting.closing_quote.len()];
            if setting.closing_quote.is_empty() {
                out.push_str(inner);
            } else {
                let escaped = format!("{0}{0}", setting.closing_quote);
                out.push_str(&inner.replace(&escaped, &setting.closing_quote));
            }
        } else {
            out.push_str(seg);
        }
    }
    out
}

/// Case-insensitive comparison of two identifiers after un-quoting.
pub fn same_name(a: &str, b: &str, setting: &DbSetting) -> bool {
    unquote(a, setting).eq_ignore_ascii_case(&unquote(b, setting))
}

/// Turn a column name into a bare parameter name (no prefix, no index).
///
/// Quotes are removed and any character that cannot appear in a parameter
/// name becomes `_`.
pub fn parameter_name(name: &str, setting: &DbSetting) -> String {
    unquote(name, setting)
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Append the positional batch suffix: `Name` for index 0, `Name_<index>` otherwise.
pub fn with_index(name: &str, index: usize) -> String {
    if index > 0 {
        format!("{name}_{index}")
    } else {
        name.to_string()
    }
}

/// Render a parameter placeholder: `<prefix>Name[_<index>]`.
pub fn parameter(name: &str, index: usize, setting: &DbSetting) -> String {
    format!(
        "{}{}",
        setting.parameter_prefix,
        with_index(&parameter_name(name, setting), index)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mssql() -> DbSetting {
        DbSetting::sql_server()
    }

    #[test]
    fn quote_simple() {
        assert_eq!(quote("Person", &mssql()), "[Person]");
    }

    #[test]
    fn quote_dotted() {
        assert_eq!(quote("dbo.Person", &mssql()), "[dbo].[Person]");
    }

    #[test]
    fn quote_keeps_existing_quotes() {
        assert_eq!(quote("[dbo].Person", &mssql()), "[dbo].[Person]");
        assert_eq!(quote("[Field Name]", &mssql()), "[Field Name]");
    }

    #[test]
    fn quote_keeps_separator_inside_quotes() {
        assert_eq!(quote("[my.schema].T", &mssql()), "[my.schema].[T]");
    }

    #[test]
    fn quote_escapes_closing_quote() {
        assert_eq!(quote("we]ird", &mssql()), "[we]]ird]");
        assert_eq!(unquote("[we]]ird]", &mssql()), "we]ird");
    }

    #[test]
    fn quote_postgres() {
        assert_eq!(quote("public.Person", &DbSetting::postgresql()), "\"public\".\"Person\"");
    }

    #[test]
    fn unquote_dotted() {
        assert_eq!(unquote("[dbo].[Person]", &mssql()), "dbo.Person");
        assert_eq!(unquote("Person", &mssql()), "Person");
    }

    #[test]
    fn same_name_ignores_case_and_quotes() {
        assert!(same_name("[Name]", "name", &mssql()));
        assert!(!same_name("[Name]", "Names", &mssql()));
    }

    #[test]
    fn parameter_index_suffix() {
        assert_eq!(parameter("Name", 0, &mssql()), "@Name");
        assert_eq!(parameter("Name", 3, &mssql()), "@Name_3");
        assert_eq!(parameter("[Field Name]", 0, &mssql()), "@Field_Name");
    }
}

//! Pre-conditions checked before any SQL is written.

use super::request::StatementRequest;
use crate::db_field;
use crate::error::{StmtError, StmtResult};
use crate::field::Field;
use crate::ident;
use crate::setting::DbSetting;

/// Checks shared by every operation, in this order: hints, table name, key flags.
pub(crate) fn common(request: &StatementRequest, setting: &DbSetting) -> StmtResult<()> {
    hints(request, setting)?;
    table_name(request)?;
    key_flags(request)
}

fn hints(request: &StatementRequest, setting: &DbSetting) -> StmtResult<()> {
    let requested = request.hints_str().is_some_and(|h| !h.trim().is_empty());
    if requested && !setting.are_table_hints_supported {
        return Err(StmtError::not_supported(
            "table hints are not supported by this dialect",
        ));
    }
    Ok(())
}

fn table_name(request: &StatementRequest) -> StmtResult<()> {
    if request.table_name.trim().is_empty() {
        return Err(StmtError::missing_input("the table name is required"));
    }
    Ok(())
}

fn key_flags(request: &StatementRequest) -> StmtResult<()> {
    if let Some(primary) = &request.primary_field
        && !primary.is_primary
    {
        return Err(StmtError::configuration(format!(
            "'{}' is used as the primary field but is not flagged as primary",
            primary.name
        )));
    }
    if let Some(identity) = &request.identity_field
        && !identity.is_identity
    {
        return Err(StmtError::configuration(format!(
            "'{}' is used as the identity field but is not flagged as identity",
            identity.name
        )));
    }
    Ok(())
}

/// Batches of more than one row need multi-statement execution.
pub(crate) fn batch_size(request: &StatementRequest, setting: &DbSetting) -> StmtResult<()> {
    if request.effective_batch_size() > 1 && !setting.is_multi_statement_executable {
        return Err(StmtError::not_supported(format!(
            "batch size {} needs multi-statement execution, which this dialect does not allow",
            request.batch_size
        )));
    }
    Ok(())
}

pub(crate) fn fields(request: &StatementRequest) -> StmtResult<()> {
    if request.fields.is_empty() {
        return Err(StmtError::missing_input("the field list is required"));
    }
    Ok(())
}

/// Every requested field must resolve to a known column when a schema is given.
pub(crate) fn field_mapping(request: &StatementRequest, setting: &DbSetting) -> StmtResult<()> {
    if request.db_fields.is_empty() {
        return Ok(());
    }
    match request
        .fields
        .iter()
        .find(|f| db_field::find_by_name(&request.db_fields, f.name(), setting).is_none())
    {
        Some(unmapped) => Err(StmtError::schema_mismatch(format!(
            "field '{}' is not a column of '{}'",
            unmapped.name(),
            request.table_name
        ))),
        None => Ok(()),
    }
}

/// Whether `name` appears in `fields` (case-insensitive, quotes ignored).
pub(crate) fn contains(fields: &[Field], name: &str, setting: &DbSetting) -> bool {
    fields.iter().any(|f| ident::same_name(f.name(), name, setting))
}

/// Fields whose name is not one of `excluded`.
pub(crate) fn without(fields: &[Field], excluded: &[&str], setting: &DbSetting) -> Vec<Field> {
    fields
        .iter()
        .filter(|f| !excluded.iter().any(|e| ident::same_name(f.name(), e, setting)))
        .cloned()
        .collect()
}

/// Qualifiers for update/merge: explicit ones, else the primary column.
///
/// Every qualifier must be one of the request's fields.
pub(crate) fn qualifiers(request: &StatementRequest, setting: &DbSetting) -> StmtResult<Vec<Field>> {
    let qualifiers = if !request.qualifiers.is_empty() {
        request.qualifiers.clone()
    } else {
        match request.primary() {
            Some(primary) => vec![primary.as_field()],
            None => {
                return Err(StmtError::missing_qualifiers(format!(
                    "no qualifiers were given and '{}' has no primary field",
                    request.table_name
                )));
            }
        }
    };
    if let Some(missing) = qualifiers
        .iter()
        .find(|q| !contains(&request.fields, q.name(), setting))
    {
        return Err(StmtError::schema_mismatch(format!(
            "qualifier '{}' is not present in the field list",
            missing.name()
        )));
    }
    Ok(qualifiers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db_field::DbField;

    fn setting() -> DbSetting {
        DbSetting::sql_server()
    }

    #[test]
    fn hints_are_checked_before_table_name() {
        let request = StatementRequest::new("").hints("WITH (NOLOCK)");
        let err = common(&request, &DbSetting::postgresql()).unwrap_err();
        assert!(err.is_not_supported());
    }

    #[test]
    fn blank_table_name_is_missing_input() {
        let err = common(&StatementRequest::new("  "), &setting()).unwrap_err();
        assert!(err.is_missing_input());
    }

    #[test]
    fn unflagged_key_is_configuration_error() {
        let request = StatementRequest::new("T").primary_field(DbField::new("Id"));
        assert!(common(&request, &setting()).unwrap_err().is_configuration());

        let request = StatementRequest::new("T").identity_field(DbField::primary("Id"));
        assert!(common(&request, &setting()).unwrap_err().is_configuration());
    }

    #[test]
    fn batch_needs_multi_statement() {
        let mut single = DbSetting::sqlite();
        single.is_multi_statement_executable = false;
        let request = StatementRequest::new("T").batch_size(2);
        assert!(batch_size(&request, &single).unwrap_err().is_not_supported());
        assert!(batch_size(&request.batch_size(1), &single).is_ok());
    }

    #[test]
    fn unmapped_field_is_schema_mismatch() {
        let request = StatementRequest::new("T")
            .fields(Field::from_names(&["Id", "Nmae"]).unwrap())
            .schema(vec![DbField::identity("id"), DbField::new("Name")]);
        let err = field_mapping(&request, &setting()).unwrap_err();
        assert!(err.is_schema_mismatch());
    }

    #[test]
    fn qualifiers_fall_back_to_primary() {
        let request = StatementRequest::new("T")
            .fields(Field::from_names(&["Id", "Name"]).unwrap())
            .primary_field(DbField::primary("Id"));
        let qualifiers = qualifiers(&request, &setting()).unwrap();
        assert_eq!(qualifiers, ["Id"].map(|n| Field::new(n).unwrap()));
    }

    #[test]
    fn qualifier_outside_fields_is_schema_mismatch() {
        let request = StatementRequest::new("T")
            .fields(Field::from_names(&["Name"]).unwrap())
            .primary_field(DbField::primary("Id"));
        assert!(qualifiers(&request, &setting()).unwrap_err().is_schema_mismatch());
    }

    #[test]
    fn no_qualifier_and_no_primary() {
        let request = StatementRequest::new("T").fields(Field::from_names(&["Name"]).unwrap());
        assert!(qualifiers(&request, &setting()).unwrap_err().is_missing_qualifiers());
    }
}

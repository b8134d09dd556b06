use anyhow::Context;
use colored::Colorize;
use stmtforge::{
    Dialect, GlobalConfiguration, QueryBuilder, QueryParameter, StatementBuilder,
};

use crate::cli::CompileArgs;
use crate::request_file::{OperationKind, RequestFile, StatementEntry};

/// One compiled entry with the filter parameters it binds.
#[derive(Debug, Clone)]
pub struct CompiledStatement {
    pub label: String,
    pub sql: String,
    pub parameters: Vec<QueryParameter>,
}

pub fn run(args: CompileArgs) -> anyhow::Result<()> {
    let file = RequestFile::load(&args.file)?;
    if let Some(options) = file.global {
        GlobalConfiguration::setup(options);
    }
    let dialect = args.dialect.or(file.dialect).unwrap_or_default();

    println!("{} {}", "-- dialect:".dimmed(), dialect.to_string().cyan());
    for (i, compiled) in compile(&file, dialect)?.iter().enumerate() {
        println!();
        println!("{}", format!("-- [{}] {}", i + 1, compiled.label).dimmed());
        println!("{}", compiled.sql);
        for parameter in &compiled.parameters {
            let value = serde_json::to_string(&parameter.value)?;
            println!("{}", format!("--   {} = {value}", parameter.name).dimmed());
        }
    }
    Ok(())
}

/// Compile every entry of `file` with `dialect`; stops at the first failure.
pub fn compile(file: &RequestFile, dialect: Dialect) -> anyhow::Result<Vec<CompiledStatement>> {
    let setting = file.setting.clone().apply(dialect.db_setting());
    let builder = dialect.statement_builder_with(setting);
    let mut qb = QueryBuilder::new();

    file.statements
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            compile_entry(builder.as_ref(), &mut qb, entry)
                .with_context(|| format!("statement #{} ({})", i + 1, entry.label()))
        })
        .collect()
}

fn compile_entry(
    builder: &dyn StatementBuilder,
    qb: &mut QueryBuilder,
    entry: &StatementEntry,
) -> anyhow::Result<CompiledStatement> {
    let request = entry.to_request()?;
    let sql = match entry.operation {
        OperationKind::Count => builder.create_count(qb, &request),
        OperationKind::CountAll => builder.create_count_all(qb, &request),
        OperationKind::Exists => builder.create_exists(qb, &request),
        OperationKind::Average => builder.create_average(qb, &request, entry.target()?),
        OperationKind::AverageAll => builder.create_average_all(qb, &request, entry.target()?),
        OperationKind::Max => builder.create_max(qb, &request, entry.target()?),
        OperationKind::MaxAll => builder.create_max_all(qb, &request, entry.target()?),
        OperationKind::Min => builder.create_min(qb, &request, entry.target()?),
        OperationKind::MinAll => builder.create_min_all(qb, &request, entry.target()?),
        OperationKind::Sum => builder.create_sum(qb, &request, entry.target()?),
        OperationKind::SumAll => builder.create_sum_all(qb, &request, entry.target()?),
        OperationKind::Delete => builder.create_delete(qb, &request),
        OperationKind::DeleteAll => builder.create_delete_all(qb, &request),
        OperationKind::Truncate => builder.create_truncate(qb, &request),
        OperationKind::Insert => builder.create_insert(qb, &request),
        OperationKind::InsertAll => builder.create_insert_all(qb, &request),
        OperationKind::Update => builder.create_update(qb, &request),
        OperationKind::UpdateAll => builder.create_update_all(qb, &request),
        OperationKind::Query => builder.create_query(qb, &request, entry.top),
        OperationKind::QueryAll => builder.create_query_all(qb, &request),
        OperationKind::BatchQuery => {
            builder.create_batch_query(qb, &request, entry.page, entry.rows_per_batch())
        }
        OperationKind::Merge => builder.create_merge(qb, &request),
        OperationKind::MergeAll => builder.create_merge_all(qb, &request),
    }?;

    let setting = builder.db_setting();
    let parameters = match &request.filter {
        Some(filter) if entry.operation == OperationKind::Update => {
            filter.for_update().parameters(0, setting)
        }
        Some(filter) if entry.operation.uses_filter() => filter.parameters(0, setting),
        _ => Vec::new(),
    };

    Ok(CompiledStatement {
        label: entry.label(),
        sql,
        parameters,
    })
}

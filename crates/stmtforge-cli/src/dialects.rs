use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use stmtforge::{DbSetting, Dialect};

const HEADER: [&str; 6] = ["Dialect", "Quotes", "Prefix", "Hints", "Multi-statement", "Average as"];

pub fn run() {
    let rows = Dialect::all().into_iter().map(|d| (d, d.db_setting()));
    println!("{}", dialects_table(rows));
}

fn dialects_table(rows: impl IntoIterator<Item = (Dialect, DbSetting)>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            HEADER
                .iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold).fg(Color::Cyan)),
        );

    for (dialect, setting) in rows {
        let [name, quotes, prefix, hints, multi, average] = describe(dialect, &setting);
        table.add_row(vec![
            Cell::new(name).fg(Color::Yellow),
            Cell::new(quotes),
            Cell::new(prefix),
            Cell::new(&hints).fg(flag_color(setting.are_table_hints_supported)),
            Cell::new(&multi).fg(flag_color(setting.is_multi_statement_executable)),
            Cell::new(average).fg(Color::DarkGrey),
        ]);
    }

    table
}

fn describe(dialect: Dialect, setting: &DbSetting) -> [String; 6] {
    [
        dialect.name().to_string(),
        format!("{}{}", setting.opening_quote, setting.closing_quote),
        setting.parameter_prefix.clone(),
        yes_no(setting.are_table_hints_supported).to_string(),
        yes_no(setting.is_multi_statement_executable).to_string(),
        setting.averageable_type.clone().unwrap_or_else(|| "-".to_string()),
    ]
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

fn flag_color(flag: bool) -> Color {
    if flag { Color::Green } else { Color::Red }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(table: &Table, row: usize) -> Vec<String> {
        table.row(row).unwrap().cell_iter().map(|c| c.content()).collect()
    }

    #[test]
    fn describes_sql_server() {
        assert_eq!(
            describe(Dialect::SqlServer, &DbSetting::sql_server()),
            ["sqlserver", "[]", "@", "yes", "yes", "FLOAT"]
        );
    }

    #[test]
    fn table_lists_every_dialect() {
        let table = dialects_table(Dialect::all().into_iter().map(|d| (d, d.db_setting())));
        assert_eq!(table.row_count(), 4);

        let header: Vec<String> = table.header().unwrap().cell_iter().map(|c| c.content()).collect();
        assert_eq!(header, HEADER);

        let postgres = (0..4)
            .map(|i| contents(&table, i))
            .find(|row| row[0] == "postgresql")
            .unwrap();
        assert_eq!(postgres[1], "\"\"");
        assert_eq!(postgres[3], "no");
        assert_eq!(postgres[5], "DOUBLE PRECISION");
    }

    #[test]
    fn missing_average_type_renders_dash() {
        let mut setting = DbSetting::mysql();
        setting.averageable_type = None;
        let table = dialects_table([(Dialect::MySql, setting)]);
        assert_eq!(contents(&table, 0)[5], "-");
    }
}

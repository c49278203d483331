use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use storm_model::DefectLog;

use crate::types::{CheckResult, PreprocessResult, RunResult};

pub fn print_run_summary(result: &RunResult) {
    match &result.outputs {
        Some(outputs) => {
            println!("Merged table: {}", outputs.table.display());
            println!("Quality report: {}", outputs.report.display());
        }
        None => println!("Dry run: no files written"),
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Source"),
        header_cell("Rows loaded"),
        header_cell("Rows cleaned"),
        header_cell("Columns"),
        header_cell("Corrections"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 1..5 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for source in &result.sources {
        table.add_row(vec![
            Cell::new(&source.name),
            Cell::new(source.rows_loaded),
            Cell::new(source.rows_cleaned),
            Cell::new(source.columns),
            count_cell(source.corrections, Color::Yellow),
        ]);
    }
    table.add_row(vec![
        Cell::new("MERGED")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(result.merged_rows).add_attribute(Attribute::Bold),
        Cell::new(result.merged_columns).add_attribute(Attribute::Bold),
        count_cell(result.defects.len(), Color::Yellow).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
    print_defect_table(&result.defects);
    print_verdict(result.issues);
}

pub fn print_preprocess_summary(result: &PreprocessResult) {
    println!("Input: {} ({})", result.input.display(), result.kind);
    println!("Output: {}", result.output.display());
    println!("Profile report: {}", result.report.display());
    print_shape(result.rows_loaded, result.rows, result.columns);
    print_defect_table(&result.defects);
}

pub fn print_check_summary(result: &CheckResult) {
    println!("Input: {}", result.input.display());
    println!("Quality report: {}", result.report.display());
    print_shape(result.rows, result.rows, result.columns);
    print_verdict(result.issues);
}

fn print_shape(rows_loaded: usize, rows: usize, columns: usize) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Rows loaded"),
        header_cell("Rows kept"),
        header_cell("Columns"),
    ]);
    apply_table_style(&mut table);
    table.add_row(vec![
        Cell::new(rows_loaded),
        Cell::new(rows),
        Cell::new(columns),
    ]);
    println!("{table}");
}

fn print_defect_table(defects: &DefectLog) {
    if defects.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Stage"),
        header_cell("Level"),
        header_cell("Column"),
        header_cell("Correction"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    for entry in defects.entries() {
        let level = if entry.defect.is_warning() {
            Cell::new("warn").fg(Color::Yellow)
        } else {
            dim_cell("info")
        };
        table.add_row(vec![
            Cell::new(&entry.stage),
            level,
            Cell::new(entry.defect.column().unwrap_or("-")),
            Cell::new(entry.defect.to_string()),
        ]);
    }
    println!();
    println!("Corrections:");
    println!("{table}");
}

fn print_verdict(issues: usize) {
    if issues == 0 {
        println!("No problems found.");
    } else {
        println!("{issues} issue(s) found, see the quality report.");
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

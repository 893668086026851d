use anyhow::Result;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use polars::prelude::DataFrame;

use cardio_common::{float_values, text_values};
use cardio_model::Region;

use crate::commands::{Resolution, RunOutcome};

pub fn print_run_summary(outcome: &RunOutcome) {
    let report = &outcome.output.report;
    match &outcome.snapshot {
        Some(path) => println!("Snapshot: {}", path.display()),
        None => println!("Snapshot: not written (dry run)"),
    }
    if let Some(path) = &outcome.report {
        println!("Run report: {}", path.display());
    }

    let mut sources = Table::new();
    sources.set_header(vec![
        header_cell("Dataset"),
        header_cell("Rows"),
        header_cell("Files"),
        header_cell("Dropped"),
    ]);
    apply_table_style(&mut sources);
    align_column(&mut sources, 1, CellAlignment::Right);
    align_column(&mut sources, 2, CellAlignment::Right);
    for source in &report.sources {
        let dropped = if source.dropped_rows.is_empty() {
            dim_cell("-")
        } else {
            Cell::new(
                source
                    .dropped_rows
                    .iter()
                    .map(|(reason, count)| format!("{reason}: {count}"))
                    .collect::<Vec<_>>()
                    .join("\n"),
            )
        };
        sources.add_row(vec![
            Cell::new(&source.dataset)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(source.rows),
            Cell::new(source.source_files.len()),
            dropped,
        ]);
    }
    println!("{sources}");

    let mut imputation = Table::new();
    imputation.set_header(vec![
        header_cell("Column"),
        header_cell("Strategy"),
        header_cell("Filled"),
        header_cell("Overwritten"),
        header_cell("Missing"),
    ]);
    apply_table_style(&mut imputation);
    for index in 2..5 {
        align_column(&mut imputation, index, CellAlignment::Right);
    }
    for outcome in &report.imputation {
        let strategy = if outcome.is_skipped() {
            Cell::new(format!("{} (skipped)", outcome.strategy)).fg(Color::Yellow)
        } else {
            Cell::new(outcome.strategy)
        };
        imputation.add_row(vec![
            Cell::new(&outcome.column),
            strategy,
            count_cell(outcome.filled, Color::Green),
            count_cell(outcome.overwritten, Color::Cyan),
            count_cell(outcome.remaining_missing, Color::Red),
        ]);
    }
    println!("{imputation}");

    println!(
        "Rows: {} merged, {} written ({} negative GDP masked) in {} ms",
        report.merged_rows, report.output_rows, report.masked_negative_gdp, outcome.duration_ms
    );
    if !report.dropped_columns.is_empty() {
        println!("Dropped columns: {}", report.dropped_columns.join(", "));
    }
}

pub fn print_resolutions(resolutions: &[Resolution]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Name"),
        header_cell("Code"),
        header_cell("Display name"),
    ]);
    apply_table_style(&mut table);
    for resolution in resolutions {
        let (code, display) = match (&resolution.code, &resolution.display_name) {
            (Some(code), display) => (
                Cell::new(code).add_attribute(Attribute::Bold),
                display.as_deref().map_or_else(|| dim_cell("-"), Cell::new),
            ),
            (None, _) => (Cell::new("unresolved").fg(Color::Yellow), dim_cell("-")),
        };
        table.add_row(vec![Cell::new(&resolution.name), code, display]);
    }
    println!("{table}");
}

pub fn print_regions(regions: &[(String, Region)]) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Code"), header_cell("Region")]);
    apply_table_style(&mut table);
    for (code, region) in regions {
        let region_cell = match region {
            Region::Unknown => dim_cell(region),
            _ => Cell::new(region),
        };
        table.add_row(vec![Cell::new(code), region_cell]);
    }
    println!("{table}");
}

/// Prints a query result with means rounded to two decimals.
pub fn print_frame(frame: &DataFrame) -> Result<()> {
    let names: Vec<String> = frame
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect();
    let mut columns = Vec::with_capacity(names.len());
    for column in frame.get_columns() {
        let values: Vec<Option<String>> = if column.dtype().is_float() {
            float_values(frame, column.name().as_str())?
                .into_iter()
                .map(|value| value.map(|v| format!("{v:.2}")))
                .collect()
        } else {
            text_values(frame, column.name().as_str())?
        };
        columns.push((column.dtype().is_float(), values));
    }

    let mut table = Table::new();
    table.set_header(names.iter().map(|name| header_cell(name)).collect::<Vec<_>>());
    apply_table_style(&mut table);
    for (index, (numeric, _)) in columns.iter().enumerate() {
        if *numeric {
            align_column(&mut table, index, CellAlignment::Right);
        }
    }
    for row in 0..frame.height() {
        table.add_row(
            columns
                .iter()
                .map(|(_, values)| match &values[row] {
                    Some(value) => Cell::new(value),
                    None => dim_cell("-"),
                })
                .collect::<Vec<_>>(),
        );
    }
    println!("{table}");
    Ok(())
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
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
        Cell::new(count).fg(color)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

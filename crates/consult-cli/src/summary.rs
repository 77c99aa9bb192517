use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use consult_cli::pipeline::RunResult;

pub fn print_summary(result: &RunResult) {
    println!(
        "Patients: {}  Consultations: {}",
        result.patients, result.consultations
    );
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Month"),
        header_cell("Valid"),
        header_cell("Total"),
        header_cell("Proportion"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);

    let mut total_valid = 0usize;
    let mut total_dated = 0usize;
    for month in &result.months {
        total_valid += month.valid;
        total_dated += month.total;
        table.add_row(vec![
            Cell::new(&month.month)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(month.valid),
            Cell::new(month.total),
            proportion_cell(month.proportion()),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total").add_attribute(Attribute::Bold),
        Cell::new(total_valid).add_attribute(Attribute::Bold),
        Cell::new(total_dated).add_attribute(Attribute::Bold),
        if total_dated == 0 {
            dim_cell("-")
        } else {
            proportion_cell(total_valid as f64 / total_dated as f64).add_attribute(Attribute::Bold)
        },
    ]);
    println!("{table}");

    println!(
        "Values mapped to missing: {}  Unparseable dates: {}",
        result.cleared, result.unparsed_dates
    );
    if result.orphans > 0 {
        println!("Consultations with unknown patient: {}", result.orphans);
    }
    if result.undated > 0 {
        println!("Consultations without a usable date: {}", result.undated);
    }
    println!("Outputs:");
    for path in result.outputs.iter() {
        println!("- {}", path.display());
    }
}

fn proportion_cell(value: f64) -> Cell {
    let color = if value >= 1.0 {
        Color::Green
    } else if value >= 0.9 {
        Color::Yellow
    } else {
        Color::Red
    };
    Cell::new(format!("{value:.3}")).fg(color)
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(80);
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

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

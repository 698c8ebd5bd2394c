use std::path::Path;

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use diarisk_model::{ClinicalField, FieldKind, RiskLabel, StoredEvaluation, format_decimal};
use diarisk_store::{AccessDecision, DATE_FORMAT};

use diarisk_cli::pipeline::EvaluationOutcome;

pub fn print_evaluation(outcome: &EvaluationOutcome) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Campo"), header_cell("Valor")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    let record = &outcome.stored.record;
    for field in ClinicalField::ALL {
        let spec = field.spec();
        table.add_row(vec![
            Cell::new(spec.label),
            Cell::new(spec.format_value(record.get(field))),
        ]);
    }
    println!("{table}");

    let label = outcome.result.label;
    let mut result = Table::new();
    apply_table_style(&mut result);
    result.add_row(vec![
        Cell::new(label.log_text())
            .fg(label_color(label))
            .add_attribute(Attribute::Bold),
        Cell::new(label.headline()).fg(label_color(label)),
        Cell::new(outcome.result.percentage()).set_alignment(CellAlignment::Right),
    ]);
    println!("{result}");
    println!("Umbral de decisión: {}", format_decimal(outcome.threshold));

    print_path("Informe PDF", outcome.pdf_path.as_deref());
    print_path("Exportación CSV", outcome.csv_path.as_deref());
    match &outcome.log_path {
        Some(path) => println!("Registrado en: {}", path.display()),
        None => println!("No registrado"),
    }
}

pub fn print_fields() {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Columna"),
        header_cell("Etiqueta"),
        header_cell("Tipo"),
        header_cell("Mínimo"),
        header_cell("Máximo"),
        header_cell("Por defecto"),
    ]);
    apply_table_style(&mut table);
    for index in 3..6 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for field in ClinicalField::ALL {
        let spec = field.spec();
        let kind = match spec.kind {
            FieldKind::Float => "decimal",
            FieldKind::Integer => "entero",
        };
        table.add_row(vec![
            Cell::new(field.column()).add_attribute(Attribute::Bold),
            Cell::new(spec.label),
            dim_cell(kind),
            Cell::new(spec.format_value(spec.min)),
            Cell::new(spec.format_value(spec.max)),
            Cell::new(spec.format_value(spec.default)),
        ]);
    }
    println!("{table}");
}

/// Short listing on stderr, so stdout stays clean CSV.
pub fn print_records_summary(decision: &AccessDecision, evaluations: &[StoredEvaluation]) {
    let scope = match decision {
        AccessDecision::Leader => "todos los registros".to_string(),
        AccessDecision::Professional(email) => format!("registros de {email}"),
        AccessDecision::Denied => return,
    };
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Fecha"),
        header_cell("Resultado"),
        header_cell("Probabilidad"),
        header_cell("Nombre"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for evaluation in evaluations {
        table.add_row(vec![
            match evaluation.date {
                Some(date) => Cell::new(date.format(DATE_FORMAT)),
                None => dim_cell("-"),
            },
            match evaluation.label {
                Some(label) => Cell::new(label.log_text()).fg(label_color(label)),
                None => dim_cell("-"),
            },
            match evaluation.probability {
                Some(probability) => Cell::new(format_decimal(probability)),
                None => dim_cell("-"),
            },
            match &evaluation.metadata.patient_name {
                Some(name) => Cell::new(name),
                None => dim_cell("-"),
            },
        ]);
    }
    eprintln!("{table}");
    eprintln!("{} filas ({scope})", evaluations.len());
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn print_path(label: &str, path: Option<&Path>) {
    if let Some(path) = path {
        println!("{label}: {}", path.display());
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn label_color(label: RiskLabel) -> Color {
    match label {
        RiskLabel::Risk => Color::Red,
        RiskLabel::NoRisk => Color::Green,
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

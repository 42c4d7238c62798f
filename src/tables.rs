use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{
    experiment::{ChargerRow, GridRow, SolarRow, TargetRow},
    runner::SessionMetrics,
    solver::SolveStatus,
};

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.set_header(header);
    table
}

fn numeric(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

fn status_cell(status: SolveStatus) -> Cell {
    let color = match status {
        SolveStatus::Optimal => Color::Green,
        SolveStatus::Infeasible | SolveStatus::Other => Color::Red,
        SolveStatus::Unbounded => Color::DarkYellow,
    };
    Cell::new(format!("{status:?}")).fg(color)
}

/// Cost/shortfall cells render `n/a` for sessions without an optimal solve.
fn optional(value: Option<String>) -> Cell {
    match value {
        Some(text) => numeric(text),
        None => Cell::new("n/a").add_attribute(Attribute::Dim),
    }
}

#[must_use]
pub fn session_table(sessions: &[SessionMetrics]) -> Table {
    let mut table = new_table(vec!["Start", "End", "Steps", "Status", "Cost", "Shortfall"]);
    for metrics in sessions {
        table.add_row(vec![
            numeric(metrics.session.start.to_string()),
            numeric(metrics.session.end.to_string()),
            numeric(metrics.session.len().to_string()),
            status_cell(metrics.status),
            optional(metrics.cost.map(|cost| cost.to_string())),
            optional(metrics.shortfall.map(|shortfall| shortfall.to_string())),
        ]);
    }
    table
}

#[must_use]
pub fn solar_table(rows: &[SolarRow]) -> Table {
    let mut table =
        new_table(vec!["Multiplier", "Operational cost", "Install cost", "Net cost"]);
    for row in rows {
        table.add_row(vec![
            numeric(format!("{:.2}", row.multiplier)),
            numeric(row.operational_cost.to_string()),
            numeric(row.install_cost.to_string()),
            numeric(row.net_cost.to_string()),
        ]);
    }
    table
}

#[must_use]
pub fn grid_table(rows: &[GridRow]) -> Table {
    let mut table =
        new_table(vec!["Grid capacity", "Avg shortfall", "Miss fraction", "Avg cost/session"]);
    for row in rows {
        table.add_row(vec![
            numeric(row.grid_power.to_string()),
            numeric(row.average_shortfall.to_string()),
            numeric(format!("{:.2}%", row.miss_fraction * 100.0)),
            numeric(row.average_cost.to_string()),
        ]);
    }
    table
}

#[must_use]
pub fn charger_table(rows: &[ChargerRow]) -> Table {
    let mut table = new_table(vec!["Charger power", "Total cost", "Avg cost/session"]);
    for row in rows {
        table.add_row(vec![
            numeric(row.charger_power.to_string()),
            numeric(row.total_cost.to_string()),
            numeric(row.average_cost.to_string()),
        ]);
    }
    table
}

#[must_use]
pub fn target_table(rows: &[TargetRow]) -> Table {
    let mut table =
        new_table(vec!["SoC target", "Total cost", "Avg shortfall", "Avg cost/session"]);
    for row in rows {
        table.add_row(vec![
            numeric(format!("{:.2}", row.target_fraction)),
            numeric(row.total_cost.to_string()),
            numeric(row.average_shortfall.to_string()),
            numeric(row.average_cost.to_string()),
        ]);
    }
    table
}

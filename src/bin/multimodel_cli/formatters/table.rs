use anyhow::Result;
use colored::*;
use prettytable::{Cell, Row, Table};
use multimodel::airfare::RouteReport;
use multimodel::{DefinitionState, GlobalRef, ResultSet, Subscript};

use crate::formatters::Formatter;
use crate::formatters::text::child_ref;

/// Table formatter
pub struct TableFormatter {
    /// Whether colors are enabled
    colored: bool,
}

impl TableFormatter {
    pub fn new() -> Self {
        TableFormatter {
            colored: true,
        }
    }

    fn header(&self, titles: &[&str]) -> Row {
        Row::new(
            titles
                .iter()
                .map(|title| {
                    let title = if self.colored { title.bold().to_string() } else { title.to_string() };
                    Cell::new(&title)
                })
                .collect(),
        )
    }
}

impl Formatter for TableFormatter {
    fn format_result_set(&self, result: &ResultSet) -> Result<String> {
        let mut table = Table::new();

        let titles: Vec<&str> = result.columns().iter().map(String::as_str).collect();
        table.add_row(self.header(&titles));

        for row in result.rows() {
            table.add_row(Row::new(
                row.iter().map(|cell| Cell::new(cell.as_deref().unwrap_or(""))).collect(),
            ));
        }

        Ok(table.to_string())
    }

    fn format_value(&self, global: &GlobalRef, value: &str) -> Result<String> {
        let mut table = Table::new();
        table.add_row(self.header(&["Global", "Value"]));
        table.add_row(Row::new(vec![
            Cell::new(&global.to_string()),
            Cell::new(value),
        ]));
        Ok(table.to_string())
    }

    fn format_definition(&self, global: &GlobalRef, state: DefinitionState) -> Result<String> {
        let mut table = Table::new();
        table.add_row(self.header(&["Global", "State", "Code"]));
        table.add_row(Row::new(vec![
            Cell::new(&global.to_string()),
            Cell::new(&state.to_string()),
            Cell::new(&state.code().to_string()),
        ]));
        Ok(table.to_string())
    }

    fn format_children(&self, global: &GlobalRef, children: &[Subscript]) -> Result<String> {
        let mut table = Table::new();
        table.add_row(self.header(&["Subscript", "Global"]));
        for child in children {
            table.add_row(Row::new(vec![
                Cell::new(&child.to_string()),
                Cell::new(&child_ref(global, child).to_string()),
            ]));
        }
        Ok(table.to_string())
    }

    fn format_globals(&self, namespace: &str, names: &[String]) -> Result<String> {
        let mut table = Table::new();
        table.add_row(self.header(&["Namespace", "Global"]));
        for name in names {
            table.add_row(Row::new(vec![
                Cell::new(namespace),
                Cell::new(&format!("^{}", name)),
            ]));
        }
        Ok(table.to_string())
    }

    fn format_route(&self, report: &RouteReport) -> Result<String> {
        let mut table = Table::new();
        table.add_row(self.header(&["Route", "Distance", "Flight", "Fare"]));

        let route = format!("{} -> {}", report.from, report.to);
        let distance = report.distance.as_deref().unwrap_or("unknown");

        if report.flights.is_empty() {
            table.add_row(Row::new(vec![
                Cell::new(&route),
                Cell::new(distance),
                Cell::new(""),
                Cell::new(""),
            ]));
        }
        for (flight, fare) in &report.flights {
            table.add_row(Row::new(vec![
                Cell::new(&route),
                Cell::new(distance),
                Cell::new(flight),
                Cell::new(fare),
            ]));
        }

        Ok(format!("{}{}", table, report))
    }

    fn format_error(&self, error: &str) -> String {
        if self.colored {
            format!("{}", error.red().bold())
        } else {
            format!("Error: {}", error)
        }
    }

    fn format_info(&self, info: &str) -> String {
        if self.colored {
            format!("{}", info.blue())
        } else {
            info.to_string()
        }
    }

    fn format_success(&self, success: &str) -> String {
        if self.colored {
            format!("{}", success.green())
        } else {
            success.to_string()
        }
    }
}

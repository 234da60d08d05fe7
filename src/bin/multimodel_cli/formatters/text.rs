use anyhow::Result;
use colored::*;
use multimodel::airfare::RouteReport;
use multimodel::{DefinitionState, GlobalRef, ResultSet, Subscript};

use crate::formatters::Formatter;

/// Plain text formatter
pub struct TextFormatter {
    /// Whether colors are enabled
    colored: bool,
}

impl TextFormatter {
    pub fn new() -> Self {
        TextFormatter {
            colored: true,
        }
    }
}

/// Reference to the node one level below `global`
pub(crate) fn child_ref(global: &GlobalRef, child: &Subscript) -> GlobalRef {
    GlobalRef {
        name: global.name.clone(),
        path: global.path.child(child.clone()),
    }
}

impl Formatter for TextFormatter {
    fn format_result_set(&self, result: &ResultSet) -> Result<String> {
        let header = result.columns().join("\t\t");
        let mut lines = vec![if self.colored { header.bold().to_string() } else { header }];

        for row in result.rows() {
            let cells: Vec<&str> = row.iter().map(|cell| cell.as_deref().unwrap_or("")).collect();
            lines.push(cells.join("\t\t"));
        }

        Ok(lines.join("\n"))
    }

    fn format_value(&self, global: &GlobalRef, value: &str) -> Result<String> {
        Ok(format!("{} = {}", global, value))
    }

    fn format_definition(&self, global: &GlobalRef, state: DefinitionState) -> Result<String> {
        Ok(format!("{}: {} ({})", global, state, state.code()))
    }

    fn format_children(&self, global: &GlobalRef, children: &[Subscript]) -> Result<String> {
        let lines: Vec<String> = children
            .iter()
            .map(|child| child_ref(global, child).to_string())
            .collect();
        Ok(lines.join("\n"))
    }

    fn format_globals(&self, _namespace: &str, names: &[String]) -> Result<String> {
        let lines: Vec<String> = names.iter().map(|name| format!("^{}", name)).collect();
        Ok(lines.join("\n"))
    }

    fn format_route(&self, report: &RouteReport) -> Result<String> {
        let mut lines = vec![report.to_string()];
        for (flight, fare) in &report.flights {
            lines.push(format!("  {}: ${}", flight, fare));
        }
        Ok(lines.join("\n"))
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

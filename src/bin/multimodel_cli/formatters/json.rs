use anyhow::Result;
use serde_json::json;
use multimodel::airfare::RouteReport;
use multimodel::{DefinitionState, GlobalRef, ResultSet, Subscript};

use crate::formatters::Formatter;
use crate::formatters::text::child_ref;

/// JSON formatter
pub struct JsonFormatter {
    /// Whether output is indented
    pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        JsonFormatter {
            pretty: true,
        }
    }

    fn render(&self, value: &serde_json::Value) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(value)?)
        } else {
            Ok(serde_json::to_string(value)?)
        }
    }
}

impl Formatter for JsonFormatter {
    fn format_result_set(&self, result: &ResultSet) -> Result<String> {
        self.render(&result.to_json())
    }

    fn format_value(&self, global: &GlobalRef, value: &str) -> Result<String> {
        self.render(&json!({
            "global": global.to_string(),
            "value": value,
        }))
    }

    fn format_definition(&self, global: &GlobalRef, state: DefinitionState) -> Result<String> {
        self.render(&json!({
            "global": global.to_string(),
            "state": state.to_string(),
            "code": state.code(),
        }))
    }

    fn format_children(&self, global: &GlobalRef, children: &[Subscript]) -> Result<String> {
        let children: Vec<String> = children.iter().map(|child| child_ref(global, child).to_string()).collect();
        self.render(&json!(children))
    }

    fn format_globals(&self, namespace: &str, names: &[String]) -> Result<String> {
        self.render(&json!({
            "namespace": namespace,
            "globals": names,
        }))
    }

    fn format_route(&self, report: &RouteReport) -> Result<String> {
        let flights: serde_json::Map<String, serde_json::Value> = report
            .flights
            .iter()
            .map(|(flight, fare)| (flight.clone(), json!(fare)))
            .collect();

        self.render(&json!({
            "from": report.from,
            "to": report.to,
            "distance": report.distance,
            "state": report.state.code(),
            "has_routes": report.has_routes(),
            "flights": flights,
        }))
    }

    fn format_error(&self, error: &str) -> String {
        json!({ "error": error }).to_string()
    }

    fn format_info(&self, info: &str) -> String {
        json!({ "info": info }).to_string()
    }

    fn format_success(&self, success: &str) -> String {
        json!({ "success": success }).to_string()
    }
}

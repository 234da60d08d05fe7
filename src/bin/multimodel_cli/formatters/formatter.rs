use anyhow::Result;
use multimodel::airfare::RouteReport;
use multimodel::{DefinitionState, GlobalRef, ResultSet, Subscript};

/// Output formatter
pub trait Formatter {
    /// Format the rows of a query
    fn format_result_set(&self, result: &ResultSet) -> Result<String>;

    /// Format the value stored at a node
    fn format_value(&self, global: &GlobalRef, value: &str) -> Result<String>;

    /// Format what exists at and beneath a node
    fn format_definition(&self, global: &GlobalRef, state: DefinitionState) -> Result<String>;

    /// Format the subscripts one level below a node
    fn format_children(&self, global: &GlobalRef, children: &[Subscript]) -> Result<String>;

    /// Format the global names of a namespace
    fn format_globals(&self, namespace: &str, names: &[String]) -> Result<String>;

    /// Format an airfare lookup
    fn format_route(&self, report: &RouteReport) -> Result<String>;

    /// Format an error message
    fn format_error(&self, error: &str) -> String;

    /// Format an informational message
    fn format_info(&self, info: &str) -> String;

    /// Format a success message
    fn format_success(&self, success: &str) -> String;
}

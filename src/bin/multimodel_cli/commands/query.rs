use anyhow::Result;
use multimodel::Connection;

use crate::context::Context;

/// Run a SELECT and print its rows
pub fn execute(context: &Context, sql: &str) -> Result<()> {
    let mut connection = context.connect()?;

    let result = connection.execute_query(sql)?;
    println!("{}", context.formatter().format_result_set(&result)?);

    if result.is_empty() {
        println!("{}", context.formatter().format_info("No rows"));
    }

    connection.close()?;
    Ok(())
}

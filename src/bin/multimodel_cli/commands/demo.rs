use anyhow::Result;
use log::{info, warn};
use multimodel::airfare::{route_report, store_airfare};
use multimodel::driver::store_records;
use multimodel::model::{Airport, Location, Persistent};
use multimodel::Connection;

use crate::context::Context;
use crate::prompt;

const AIRPORT_QUERY: &str = "SELECT name, code, location_city FROM demo.airport";

/// Store the sample airports as objects, read them back with SQL and
/// optionally look up a route in the airfare global
pub fn execute(context: &Context, airfare: bool, route: Option<(String, String)>) -> Result<()> {
    let formatter = context.formatter();
    let mut connection = context.connect()?;
    println!("{}", formatter.format_success(&format!("Connected to namespace {}", context.namespace())));

    for schema in [Airport::schema().name, Location::schema().name] {
        connection.delete_extent(&schema)?;
        connection.import_schema(&schema)?;
    }

    println!("{}", formatter.format_info("Generating airport table..."));
    let ids = store_records(&mut connection, &Airport::sample_set())?;
    info!("Stored airports with ids {:?}", ids);
    println!("{}", formatter.format_success(&format!("Stored {} airports", ids.len())));

    // A failing listing is reported and the demo carries on
    match connection.execute_query(AIRPORT_QUERY) {
        Ok(result) => println!("{}", formatter.format_result_set(&result)?),
        Err(e) => {
            warn!("Airport listing failed: {}", e);
            eprintln!("{}", formatter.format_error(&format!("Error printing airport data: {}", e)));
        }
    }

    if airfare {
        store_airfare(&mut connection)?;
        println!("{}", formatter.format_success("Stored natively successfully"));

        let (from, to) = match route {
            Some(route) => route,
            None => prompt::ask_route()?,
        };
        let report = route_report(&mut connection, &from, &to)?;
        println!("{}", formatter.format_route(&report)?);
    }

    connection.close()?;
    Ok(())
}

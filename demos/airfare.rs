//! Objects, SQL and a native global over one in-memory namespace
//!
//! Run with `cargo run --example airfare`.

use multimodel::airfare::{route_report, store_airfare};
use multimodel::driver::{load_records, store_records};
use multimodel::model::{Airport, Location, Persistent};
use multimodel::{Connection, ConnectionConfig, Driver, EmbeddedDriver};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let driver = EmbeddedDriver::in_memory();
    let mut connection = driver.connect(&ConnectionConfig::default())?;

    for schema in [Airport::schema().name, Location::schema().name] {
        connection.delete_extent(&schema)?;
        connection.import_schema(&schema)?;
    }

    let ids = store_records(&mut connection, &Airport::sample_set())?;
    println!("Stored {} airports", ids.len());

    let result = connection.execute_query("SELECT name, code, location_city FROM demo.airport ORDER BY code")?;
    println!("{}", result.columns().join("\t"));
    for row in result.rows() {
        let cells: Vec<&str> = row.iter().map(|cell| cell.as_deref().unwrap_or("")).collect();
        println!("{}", cells.join("\t"));
    }

    let airports: Vec<(u64, Airport)> = load_records(&mut connection)?;
    for (id, airport) in &airports {
        println!("#{} {} is in {}, {}", id, airport.code, airport.location.city, airport.location.state);
    }

    store_airfare(&mut connection)?;
    for (from, to) in [("BOS", "AUS"), ("BOS", "BIS"), ("AUS", "BOS")] {
        let report = route_report(&mut connection, from, to)?;
        println!("{}", report);
        for (flight, fare) in &report.flights {
            println!("  {}: ${}", flight, fare);
        }
    }

    connection.close()?;
    Ok(())
}

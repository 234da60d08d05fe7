//! The canonical airport records
//!
//! One record type serves both the object adapter and the SQL adapter.

use serde::{Serialize, Deserialize};
use super::schema::{Column, Persistent, Schema};

/// An airport with its embedded location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    pub name: String,
    pub code: String,
    pub location: Location,
}

/// Where an airport is, stored inside the airport record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    pub state: String,
}

impl Airport {
    pub fn new(name: &str, code: &str, city: &str, state: &str) -> Self {
        Airport {
            name: name.to_string(),
            code: code.to_string(),
            location: Location {
                city: city.to_string(),
                state: state.to_string(),
            },
        }
    }

    /// The five airports loaded by the quickstart
    pub fn sample_set() -> Vec<Airport> {
        vec![
            Airport::new("Boston Logan International", "BOS", "Boston", "MA"),
            Airport::new("Philadelphia International", "PHL", "Philadelphia", "PA"),
            Airport::new("Austin–Bergstrom International", "AUS", "Austin", "TX"),
            Airport::new("San Francisco International", "SFO", "San Francisco", "CA"),
            Airport::new("O'hare International", "ORD", "Chicago", "IL"),
        ]
    }
}

impl Persistent for Airport {
    fn schema() -> Schema {
        Schema::persistent(
            "Demo.Airport",
            vec![
                Column::scalar("name"),
                Column::scalar("code"),
                Column::embedded("location", "Demo.Location"),
            ],
        )
    }
}

impl Persistent for Location {
    fn schema() -> Schema {
        Schema::serial("Demo.Location", vec![Column::scalar("city"), Column::scalar("state")])
    }
}

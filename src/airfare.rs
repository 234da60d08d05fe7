//! Airfare routes kept in a native global
//!
//! `^AIRPORT(from,to)` holds the distance of a route and
//! `^AIRPORT(from,to,flight)` the fare of one flight on it.

use std::fmt;

use log::info;

use crate::core::definition::DefinitionState;
use crate::core::errors::{DriverError, DriverResult};
use crate::core::path::Path;
use crate::driver::Connection;

pub const AIRFARE_GLOBAL: &str = "AIRPORT";

const ROUTES: [(&[&str], &str); 6] = [
    (&["BOS", "AUS"], "1698"),
    (&["BOS", "AUS", "AA150"], "450"),
    (&["BOS", "AUS", "AA290"], "550"),
    (&["BOS", "PHL", "UA110"], "200"),
    (&["BOS", "BIS", "AA330"], "700"),
    (&["BOS", "BIS", "UA208"], "710"),
];

/// Write the sample routes, distances and fares
pub fn store_airfare<C: Connection + ?Sized>(connection: &mut C) -> DriverResult<()> {
    for (path, value) in ROUTES {
        connection.set_path(AIRFARE_GLOBAL, &Path::from(path.to_vec()), value)?;
    }
    info!("Stored {} airfare nodes in ^{}", ROUTES.len(), AIRFARE_GLOBAL);
    Ok(())
}

/// What the global knows about travel between two airports
#[derive(Debug, Clone, PartialEq)]
pub struct RouteReport {
    pub from: String,
    pub to: String,
    /// Distance in miles, when stored
    pub distance: Option<String>,
    pub state: DefinitionState,
    /// Flights on the route with their fares
    pub flights: Vec<(String, String)>,
}

impl RouteReport {
    /// Any node at or beneath the route counts, including a route with
    /// flights but no distance
    pub fn has_routes(&self) -> bool {
        self.state.is_defined()
    }
}

impl fmt::Display for RouteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "The distance in miles between {} and {} is: {}. {}",
            self.from,
            self.to,
            self.distance.as_deref().unwrap_or("unknown"),
            if self.has_routes() { "This path has routes" } else { "This path has no routes" }
        )
    }
}

/// Look up a route between two airports
pub fn route_report<C: Connection + ?Sized>(connection: &mut C, from: &str, to: &str) -> DriverResult<RouteReport> {
    let route = Path::from([from, to]);
    let state = connection.is_path_defined(AIRFARE_GLOBAL, &route)?;

    let distance = match connection.get_path(AIRFARE_GLOBAL, &route) {
        Ok(distance) => Some(distance),
        Err(DriverError::NotFound(_)) => None,
        Err(e) => return Err(e),
    };

    let mut flights = Vec::new();
    if state.has_children() {
        for flight in connection.children(AIRFARE_GLOBAL, &route)? {
            // a flight node holding only sub-nodes has no fare to list
            match connection.get_path(AIRFARE_GLOBAL, &route.child(flight.clone())) {
                Ok(fare) => flights.push((flight.as_str().to_string(), fare)),
                Err(DriverError::NotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }
    }

    Ok(RouteReport {
        from: from.to_string(),
        to: to.to_string(),
        distance,
        state,
        flights,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{ConnectionConfig, Driver, EmbeddedDriver};

    fn connection_with_fares() -> crate::driver::EmbeddedConnection {
        let driver = EmbeddedDriver::in_memory();
        let mut connection = driver.connect(&ConnectionConfig::default()).unwrap();
        store_airfare(&mut connection).unwrap();
        connection
    }

    #[test]
    fn test_route_with_distance_and_flights() {
        let mut connection = connection_with_fares();
        let report = route_report(&mut connection, "BOS", "AUS").unwrap();

        assert_eq!(report.state, DefinitionState::ValueAndChildren);
        assert_eq!(report.distance.as_deref(), Some("1698"));
        assert_eq!(report.flights, vec![
            ("AA150".to_string(), "450".to_string()),
            ("AA290".to_string(), "550".to_string()),
        ]);
        assert_eq!(
            report.to_string(),
            "The distance in miles between BOS and AUS is: 1698. This path has routes"
        );
    }

    #[test]
    fn test_route_with_flights_only_has_routes() {
        let mut connection = connection_with_fares();
        let report = route_report(&mut connection, "BOS", "BIS").unwrap();

        assert_eq!(report.state, DefinitionState::ChildrenOnly);
        assert!(report.has_routes());
        assert_eq!(report.distance, None);
        assert_eq!(report.flights.len(), 2);
        assert!(report.to_string().contains("is: unknown. This path has routes"));
    }

    #[test]
    fn test_flight_without_fare_is_skipped() {
        let mut connection = connection_with_fares();
        connection
            .set_path(AIRFARE_GLOBAL, &Path::from(["BOS", "PHL", "DL1", "note"]), "red-eye")
            .unwrap();

        let report = route_report(&mut connection, "BOS", "PHL").unwrap();
        assert_eq!(report.state, DefinitionState::ChildrenOnly);
        assert_eq!(report.flights, vec![("UA110".to_string(), "200".to_string())]);
        assert!(report.has_routes());
    }

    #[test]
    fn test_unknown_route() {
        let mut connection = connection_with_fares();
        let report = route_report(&mut connection, "AUS", "BOS").unwrap();

        assert_eq!(report.state, DefinitionState::Undefined);
        assert!(!report.has_routes());
        assert!(report.flights.is_empty());
        assert!(report.to_string().ends_with("This path has no routes"));
    }
}

//! Client for the OJ Electronics cloud API behind WiFi floor-heating thermostats.
//!
//! ```no_run
//! use ojelectronics::{CustomerId, OjClient, Temperature};
//!
//! # fn main() -> Result<(), ojelectronics::OjError> {
//! let client = OjClient::new("<api-key>", CustomerId(1));
//! let session = client.session("user@example.com", "password")?;
//! for group in session.groups()? {
//!     for t in group.thermostats() {
//!         println!("{}: room {}, floor {}", t.name, t.room_temperature, t.floor_temperature);
//!     }
//!     group.manual_mode(Temperature::of_celsius(21.0))?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod models {
    pub mod oj;
}

pub mod client;
pub mod config;
pub mod group;
pub mod observer;
pub mod session;
pub mod temperature;
pub mod timestamp;
pub mod transport;

#[cfg(test)]
mod testing;

pub use client::{OjClient, OjError};
pub use group::{Group, ThermostatSnapshot, VacationWindow};
pub use models::oj::{CustomerId, GroupId, RegulationMode};
pub use observer::{LogObserver, ResponseObserver};
pub use session::Session;
pub use temperature::Temperature;
pub use transport::{HttpTransport, TransportError, UreqTransport};

//! Record types for the Booker API.
//!
//! Records keep the vendor's PascalCase keys. Keys a type does not name are
//! preserved in its `extra` map so nothing the server sends is lost.

pub mod appointment;
pub mod customer;
pub mod resource;
pub mod sale;
pub mod treatment;

pub use appointment::Appointment;
pub use customer::Customer;
pub use resource::{map_record, map_resources, pluralize, Mapped, Resource, ResourceKind};
pub use sale::Sale;
pub use treatment::Treatment;

pub mod address;
pub mod employee;
pub mod logging;

pub use address::{AddressError, Mailbox};
pub use employee::Employee;

pub use tracing;

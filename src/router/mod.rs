pub mod guard;
pub mod routes;

pub use guard::{decide, Admission, Navigation, NavigationError, NavigationGuard};
pub use routes::{RouteDescriptor, RouteTable};

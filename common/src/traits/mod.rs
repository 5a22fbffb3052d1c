pub mod publisher;
pub mod transport;

pub use crate::traits::publisher::Notifiable;
pub use crate::traits::transport::{BoardPort, RoutePort, TransportPort};

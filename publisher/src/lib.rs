//! # Crate publisher
//!
//! ## publisher
//!
//! The `publisher` crate provides a mechanism for registering and notifying listeners
//! of new events of type `T`. Device adapters use it to fan each sensor signal out to
//! the data routes subscribed to it.
//!
//! ### Example
//!
//! ```
//! use std::sync::Arc;
//! use publisher::{listener, Listener, Publishable, Publisher};
//! use uuid::Uuid;
//!
//! struct Printer;
//!
//! impl Printer {
//!     fn handle(&self, _id: Uuid, value: Arc<String>) {
//!         println!("Listener received: {}", value);
//!     }
//! }
//!
//! let publisher = Publisher::new();
//! let printer = Arc::new(Printer);
//! let mut listener = listener!(printer.handle);
//!
//! // Register a listener
//! let listener_id = publisher.register_listener(&mut listener);
//!
//! // Notify all listeners
//! publisher.notify_listeners(Arc::new("Hello, World!".to_string()));
//!
//! // Unregister the listener
//! publisher.unregister_listener(listener_id);
//! assert!(publisher.is_empty());
//! ```

pub mod listener;
pub mod macros;
pub mod publisher;
pub mod publisher_manager;

pub use listener::Listener;
pub use publisher::{Publishable, Publisher};
pub use publisher_manager::PublisherManager;

use std::sync::Arc;
use uuid::Uuid;

use crate::types::timed::Sample;

/// Listener callback registered in a publisher. Receives the listener id and the
/// published value.
pub type Callback<T> = Arc<dyn Fn(Uuid, Arc<T>) + Send + Sync>;

/// Per-sample delivery callback bound to a data route.
pub type SampleCallback = Arc<dyn Fn(Sample) + Send + Sync>;

/// Invoked by a board when its wireless link drops without being asked to.
pub type DisconnectCallback = Arc<dyn Fn() + Send + Sync>;

//! Base trait for intents (application actions).

use std::fmt::Debug;

/// Marker trait for intent objects.
///
/// Intents represent:
/// - User actions (button clicks, key presses)
/// - System events (API responses, timers)
/// - Follow-up actions dispatched by task bodies
///
/// Intents are processed by reducers to produce new states. They are
/// `Debug` so the logging interceptor can describe them.
pub trait Intent: Debug + Send + 'static {}

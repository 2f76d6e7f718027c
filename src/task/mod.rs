//! Task actions: asynchronous work started from a dispatch.
//!
//! ## Ownership
//! ```text
//! TaskAction          ──► handles stored on the action value
//!                         (last clone dropped → every handle cancelled)
//!
//! RetainedTaskAction  ──► TaskInterceptor ──► TaskRegistry[id]
//!                         (released after one cleanup per handle,
//!                          or when the store is dropped)
//! ```
//!
//! ## Rules
//! - Task actions never reach the reducer; the interceptor swallows them
//! - Bodies run synchronously inside `dispatch`, their work runs on tokio
//! - Each retained dispatch gets its own registry entry
//! - A failing body still registers the handles it produced

mod action;
mod cleanup;
mod handle;
mod interceptor;
mod registry;
mod retained;
mod scope;

pub use action::TaskAction;
pub use cleanup::Cleanup;
pub use handle::CancellationHandle;
pub use interceptor::TaskInterceptor;
pub use registry::{Completion, TaskId, TaskRegistry};
pub use retained::RetainedTaskAction;
pub use scope::{TaskContext, TaskScope};

//! Model-View-Intent (MVI) primitives behind the store.
//!
//! # Architecture
//!
//! ```text
//! Intent ──→ Interceptors ──→ Reducer ──→ State ──→ Subscribers
//!    ↑                                                  │
//!    └──────────────────────────────────────────────────┘
//! ```
//!
//! - **State**: Immutable snapshot, replaced wholesale on every commit
//! - **Intent**: Application actions understood by reducers
//! - **Reducer**: Pure function that transforms state based on intents

mod intent;
mod reducer;
mod state;

pub use intent::Intent;
pub use reducer::{combine, Combined, FnReducer, Reducer};
pub use state::StoreState;

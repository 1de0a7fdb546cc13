//! # Hagg Core
//!
//! Core types shared by every layer of the request pipeline:
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`transport`]: Full-page vs. partial-update request classification
//! - [`events`]: Per-request event buffer committed as headers or markup
//! - [`notify`]: Toast notifications and message levels
//!
//! # Example
//!
//! ```ignore
//! use hagg_core::events::{EventBus, Phase};
//! use hagg_core::notify::Toast;
//!
//! let mut bus = EventBus::new();
//! Toast::new("Saved.").success().notify(&mut bus);
//! bus.add(Phase::AfterSettle, "auth-changed", true);
//!
//! assert!(bus.commit(Phase::Immediate).is_some());
//! assert!(bus.commit(Phase::AfterSwap).is_none());
//! ```

pub mod errors;
pub mod events;
pub mod notify;
pub mod transport;

// Re-export commonly used types at crate root
pub use errors::{AppError, ErrorReport};
pub use events::{Event, EventBus, Phase};
pub use notify::{MessageLevel, Toast};
pub use transport::TransportMode;

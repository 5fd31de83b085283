// packages/engine/src/pipeline/mod.rs
//! Pipeline stages
//!
//! A stage is a single string transformation with access to the
//! environment's shared memory. An agent chains stages in registration order.
//!
//! ```text
//! "Hello world" → Lowercase → Keyword{hello} → Echo → "Agent says: Hi there!"
//! ```

pub mod stage;
pub mod stages;

pub use stage::{FnStage, Stage};
pub use stages::{EchoStage, KeywordStage, LowercaseStage, NO_ACTION};

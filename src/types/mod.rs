//! Core types for Palaver.

pub mod message;
pub mod model;
pub mod stream;
pub mod tool;

pub use message::*;
pub use model::*;
pub use stream::*;
pub use tool::*;

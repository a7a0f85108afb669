//! Request handlers.

pub mod health;
pub mod info;
pub mod rpc;
pub mod shot_detection;

pub use health::*;
pub use info::*;
pub use rpc::*;
pub use shot_detection::*;

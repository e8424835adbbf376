//! Token material returned by grants, redacted secrets, and the per-client bearer state.

pub mod material;
pub mod secret;
pub mod state;

pub use material::*;
pub use secret::*;
pub use state::*;

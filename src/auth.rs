//! Token values, redacted secrets, and the token lifecycle state.

pub mod response;
pub mod secret;
pub mod state;

pub use response::*;
pub use secret::*;
pub use state::*;

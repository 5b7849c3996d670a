pub mod auth;
pub mod call;
pub mod verify;

pub use auth::*;
pub use call::*;
pub use verify::*;

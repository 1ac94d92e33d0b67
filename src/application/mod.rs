// Application layer: services the presentation layer drives.
// Every call takes the acting user explicitly; nothing here remembers who is
// logged in.

mod auth;
pub mod error;
mod password;
mod quick;
pub mod reporting;
mod service;
mod session;
mod tracker;

pub use auth::*;
pub use error::*;
pub use password::*;
pub use quick::*;
pub use reporting::*;
pub use service::*;
pub use session::*;
pub use tracker::*;

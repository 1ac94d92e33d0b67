mod category;
mod expense;
mod money;
mod user;

pub use category::*;
pub use expense::*;
pub use money::*;
pub use user::*;

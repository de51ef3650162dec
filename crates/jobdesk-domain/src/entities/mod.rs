//! Domain entities.

mod job;
mod record;
mod user;

pub use job::*;
pub use record::*;
pub use user::*;

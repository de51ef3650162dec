//! Domain value objects.

mod email;
mod job_status;

pub use email::*;
pub use job_status::*;

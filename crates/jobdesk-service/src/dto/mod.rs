//! Data Transfer Objects (DTOs).

mod job_dto;
mod user_dto;

pub use job_dto::*;
pub use user_dto::*;

pub mod chain;
pub mod classify;
pub mod error;
pub mod forum;
pub mod merge;
pub mod note;
pub mod paper;
pub mod structure;
pub mod util;

pub type DomainResult<T> = Result<T, error::DomainError>;

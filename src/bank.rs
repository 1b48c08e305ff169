pub mod error;
pub mod service;

pub use error::{Error, ErrorKind};
pub use service::{NewService, Result, Service};

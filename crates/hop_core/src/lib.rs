pub mod animation;
pub mod error;
pub mod input;
pub mod shell;
pub mod time;

pub use error::ResourceError;

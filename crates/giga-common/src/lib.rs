pub mod errors;
pub mod id;
pub mod model;

pub use errors::{ConfigError, GigaError};
pub use id::{turn_tag, SessionId};
pub use model::Model;

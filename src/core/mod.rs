pub mod derive;
pub mod rules;
pub mod session;

pub use crate::domain::model::{FormState, ValidationResult};
pub use crate::domain::ports::{Catalog, OrderGateway};
pub use crate::utils::error::Result;

pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::gateway::SimulatedGateway;
pub use config::CheckoutConfig;
pub use crate::core::derive::{
    card_preview, classify_card_network, format_grouped_digits, CardPreview, NetworkLabel,
    PreviewPlaceholders,
};
pub use crate::core::rules::{validate, RuleEngine, RuleMessages};
pub use crate::core::session::{CheckoutSession, FieldEdit};
pub use domain::model::{Field, FormState, PaymentMethod, Product, ValidationResult};
pub use utils::error::{CheckoutError, Result};

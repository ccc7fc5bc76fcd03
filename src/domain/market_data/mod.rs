//! Market data aggregate: quotes, the quote store and validation.

pub mod entities;
pub mod services;
pub mod value_objects;

pub use entities::*;
pub use services::DataValidationService;
pub use value_objects::*;

//! Domain layer: strong types with validation and invariants (no I/O).

mod request;
mod response;
mod validation;
mod value;

pub use request::{SendByTemplate, SendVerificationCode};
pub use response::{CreditResponse, SendResponse};
pub use validation::ValidationError;
pub use value::{MobileNumber, PhoneNumber, TemplateId, TemplateParameter, VerificationCode};

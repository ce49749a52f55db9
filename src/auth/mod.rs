//! Authentication module
//!
//! Registration, password login, JWT issuing and the bearer-token
//! extractor that guards the API routes.

mod extractor;
pub mod handlers;
mod service;

pub use extractor::AuthenticatedUser;
pub use service::{AuthService, Claims, RegisterRequest};

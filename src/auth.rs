//! Access tokens and the providers that resolve them before every request.

pub mod cache;
pub mod provider;
pub mod token;

pub use cache::*;
pub use provider::*;
pub use token::*;

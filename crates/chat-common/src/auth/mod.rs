//! Token checks
//!
//! Tokens are issued by the external identity service; this side only needs
//! to verify them (and to mint them for tests and tooling).

mod jwt;

pub use jwt::{Claims, JwtService};

//! Session token helpers

mod claims;

pub use claims::SessionClaims;

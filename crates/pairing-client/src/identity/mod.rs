//! Identity provider adapter and the ambient session context

mod callback;
mod http;
mod provider;
mod session;

pub use callback::{AuthCallback, CallbackKind};
pub use http::HttpIdentityProvider;
pub use provider::{
    AuthSession, IdentityProvider, IdentityUser, OAuthRequest, SignUpOutcome, SignUpRequest,
};
pub use session::{SessionContext, SessionEvent, SessionSnapshot};

#[cfg(test)]
pub(crate) use session::tests::{profile as test_profile, StubProvider};

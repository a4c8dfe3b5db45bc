//! # pairing-client
//!
//! Data access for the pairing app: typed GraphQL operations over HTTP with a
//! query cache, the identity-provider session (sign-in, refresh, callbacks),
//! browser-session storage flows and form validation.

pub mod debounce;
pub mod error;
pub mod forms;
pub mod graphql;
pub mod identity;
pub mod operations;
pub mod storage;

// Re-export commonly used types at crate root
pub use debounce::Debouncer;
pub use error::{ClientError, ClientResult, CODE_FORBIDDEN, CODE_UNAUTHENTICATED};
pub use forms::{check, FieldErrors, FormLayout};
pub use graphql::{
    BanGuard, GraphqlClient, GraphqlTransport, HttpTransport, NoVariables, Operation,
    OperationKind, QueryCache,
};
pub use identity::{
    AuthCallback, AuthSession, CallbackKind, HttpIdentityProvider, IdentityProvider,
    SessionContext, SessionEvent, SessionSnapshot,
};
pub use storage::{
    CalendarOAuthHandoff, CalendarOAuthOutcome, MemorySessionStorage, RatingPromptTracker,
};

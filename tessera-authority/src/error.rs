//! Authority error types.

use tessera_auth::CertError;

/// Failures reported by user and session collaborators.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StoreError {
    /// A uniqueness constraint was violated (e.g. duplicate username).
    #[error("record already exists")]
    Conflict,

    /// The backing store failed.
    #[error("store backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Box::new(err))
    }
}

/// Errors surfaced by the session lifecycle operations.
///
/// Policy outcomes (`UserAlreadyExists`, `LoginFailed`, `AlreadyLoggedIn`) are
/// expected, user-facing results. `NoSessionFound` and `ExpiredSession` are
/// recovered by signing in again. Nothing here is retried automatically.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("user already exists")]
    UserAlreadyExists,

    /// Unknown user or wrong password; deliberately indistinguishable.
    #[error("login failed")]
    LoginFailed,

    /// The session creation policy refused a new session.
    #[error("already logged in")]
    AlreadyLoggedIn,

    #[error("no session found")]
    NoSessionFound,

    /// The session is past its expiry and cannot be renewed.
    #[error("session expired")]
    ExpiredSession,

    /// The renewal policy vetoed renewal (e.g. account disabled).
    #[error("renewal denied")]
    RenewalDenied,

    #[error("certificate creation failed: {0}")]
    CertificateCreationFailed(#[source] CertError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SessionError {
    /// HTTP status a front end should answer with.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::AlreadyLoggedIn => 409,
            Self::UserAlreadyExists => 412,
            Self::LoginFailed | Self::NoSessionFound | Self::ExpiredSession => 401,
            Self::RenewalDenied => 403,
            Self::CertificateCreationFailed(_) | Self::Store(_) => 500,
        }
    }
}

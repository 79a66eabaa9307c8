//! Identity session, consumed from a hosted provider.
//!
//! Protected screens need three things: whether the session has resolved,
//! whether someone is signed in, and who. `IdentityProvider` is that
//! contract; the placeholder implementation stands in for the hosted
//! service, which owns all real authentication.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// The provider has not answered yet.
    Loading,
    SignedOut,
    SignedIn(UserAccount),
}

pub trait IdentityProvider {
    /// Resolve the session present at startup, if any.
    fn resolve(&self) -> SessionState;
    /// Run the provider's sign-in surface.
    fn sign_in(&self) -> SessionState;
}

/// The session as screens consume it.
#[derive(Debug)]
pub struct Session {
    state: SessionState,
}

impl Session {
    pub fn loading() -> Self {
        Self { state: SessionState::Loading }
    }

    /// Ask the provider for the session present at startup.
    pub fn resolve(&mut self, provider: &dyn IdentityProvider) {
        self.state = provider.resolve();
    }

    pub fn is_loaded(&self) -> bool {
        !matches!(self.state, SessionState::Loading)
    }

    pub fn is_signed_in(&self) -> bool {
        matches!(self.state, SessionState::SignedIn(_))
    }

    pub fn user(&self) -> Option<&UserAccount> {
        match &self.state {
            SessionState::SignedIn(user) => Some(user),
            _ => None,
        }
    }

    pub fn sign_in(&mut self, provider: &dyn IdentityProvider) {
        self.state = provider.sign_in();
    }

    pub fn sign_out(&mut self) {
        self.state = SessionState::SignedOut;
    }
}

/// Stand-in for the hosted identity service: no session at startup, and
/// sign-in always succeeds with the demo patient account.
pub struct PlaceholderIdentity;

impl IdentityProvider for PlaceholderIdentity {
    fn resolve(&self) -> SessionState {
        SessionState::SignedOut
    }

    fn sign_in(&self) -> SessionState {
        SessionState::SignedIn(UserAccount {
            name: "John Doe".to_string(),
            email: "john.doe@example.com".to_string(),
        })
    }
}

//! Identity-provider capability: session watching and email/password
//! sign-in. No map or store resource exists before a session does, so the
//! session stream is the first thing the core asks for.

use crux_core::capability::{Capability, CapabilityContext, Operation};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum AuthOperation {
    WatchSession,
    SignIn { email: String, password: String },
    SignOut,
}

impl Operation for AuthOperation {
    type Output = AuthResult;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthOutput {
    /// Current session holder; `None` means signed out.
    Session { user_id: Option<String> },
    SignedIn { user_id: String },
    SignedOut,
}

#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthError {
    #[error("{message}")]
    InvalidCredentials { message: String },

    #[error("network error: {message}")]
    Network { message: String },

    #[error("{message}")]
    Unknown { message: String },
}

pub type AuthResult = Result<AuthOutput, AuthError>;

pub struct Auth<Ev> {
    context: CapabilityContext<AuthOperation, Ev>,
}

impl<Ev> Capability<Ev> for Auth<Ev> {
    type Operation = AuthOperation;
    type MappedSelf<MappedEv> = Auth<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static,
    {
        Auth::new(self.context.map_event(f))
    }
}

impl<Ev> Auth<Ev>
where
    Ev: 'static,
{
    #[must_use]
    pub fn new(context: CapabilityContext<AuthOperation, Ev>) -> Self {
        Self { context }
    }

    /// Streams session changes for the lifetime of the app: once on
    /// subscription with the current state, then on every sign-in/out.
    pub fn watch_session<F>(&self, make_event: F)
    where
        F: Fn(AuthResult) -> Ev + Send + 'static,
    {
        self.context.spawn({
            let context = self.context.clone();
            async move {
                let mut stream = context.stream_from_shell(AuthOperation::WatchSession);
                while let Some(result) = stream.next().await {
                    context.update_app(make_event(result));
                }
            }
        });
    }

    pub fn sign_in<F>(&self, email: impl Into<String>, password: impl Into<String>, make_event: F)
    where
        F: FnOnce(AuthResult) -> Ev + Send + 'static,
    {
        let operation = AuthOperation::SignIn {
            email: email.into(),
            password: password.into(),
        };
        self.context.spawn({
            let context = self.context.clone();
            async move {
                let result = context.request_from_shell(operation).await;
                context.update_app(make_event(result));
            }
        });
    }

    /// Fire-and-forget; the session stream reports the resulting sign-out.
    pub fn sign_out(&self) {
        self.context.spawn({
            let context = self.context.clone();
            async move {
                context.notify_shell(AuthOperation::SignOut).await;
            }
        });
    }
}

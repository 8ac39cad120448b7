use std::sync::Arc;

use axum::extract::Request;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use crate::domain::identity::models::Identity;
use crate::domain::identity::models::LoginKey;
use crate::domain::identity::ports::IdentityRepository;
use crate::inbound::http::router::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Identity established for the current request, with its granted authorities.
#[derive(Debug, Clone)]
pub struct AuthenticatedIdentity {
    pub identity: Identity,
    pub authorities: Vec<&'static str>,
}

impl AuthenticatedIdentity {
    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.iter().any(|granted| *granted == authority)
    }
}

impl From<Identity> for AuthenticatedIdentity {
    fn from(identity: Identity) -> Self {
        let authorities = identity.authorities();
        Self {
            identity,
            authorities,
        }
    }
}

/// Per-request authentication state, stored in request extensions.
///
/// Starts empty. Once populated it is never replaced for the same request.
#[derive(Debug, Clone, Default)]
pub struct IdentityContext {
    identity: Option<AuthenticatedIdentity>,
}

impl IdentityContext {
    pub fn identity(&self) -> Option<&AuthenticatedIdentity> {
        self.identity.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Populate an empty context. Returns false and leaves the context
    /// unchanged if it is already authenticated.
    pub fn authenticate(&mut self, identity: AuthenticatedIdentity) -> bool {
        if self.identity.is_some() {
            return false;
        }
        self.identity = Some(identity);
        true
    }
}

/// Where the pipeline stopped for a request.
///
/// Every variant except `Authenticated` leaves the context as it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    NoHeader,
    NotBearer,
    TokenRejected(auth::JwtError),
    AlreadyAuthenticated,
    IdentityNotFound,
    LookupFailed,
    SubjectMismatch,
    Authenticated,
}

/// Resolves the caller of a request from its bearer token.
///
/// Never rejects a request. Routes that need an identity enforce it with
/// the extractors in [`crate::inbound::http::extractors`].
pub struct AuthenticationPipeline {
    token_codec: Arc<auth::TokenCodec>,
    identities: Arc<dyn IdentityRepository>,
}

impl AuthenticationPipeline {
    pub fn new(token_codec: Arc<auth::TokenCodec>, identities: Arc<dyn IdentityRepository>) -> Self {
        Self {
            token_codec,
            identities,
        }
    }

    pub async fn run(&self, headers: &HeaderMap, context: &mut IdentityContext) -> PipelineOutcome {
        let Some(header) = headers.get(AUTHORIZATION) else {
            return PipelineOutcome::NoHeader;
        };

        let Some(token) = header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        else {
            return PipelineOutcome::NotBearer;
        };

        let subject = match self.token_codec.extract_subject(token) {
            Ok(subject) => subject,
            Err(e) => return PipelineOutcome::TokenRejected(e),
        };

        if context.is_authenticated() {
            return PipelineOutcome::AlreadyAuthenticated;
        }

        // A subject that is not a valid login key cannot match any identity.
        let Ok(login_key) = LoginKey::new(&subject) else {
            return PipelineOutcome::IdentityNotFound;
        };

        let identity = match self.identities.find_by_login_key(&login_key).await {
            Ok(Some(identity)) => identity,
            Ok(None) => return PipelineOutcome::IdentityNotFound,
            Err(e) => {
                tracing::warn!(error = %e, "Identity lookup failed during authentication");
                return PipelineOutcome::LookupFailed;
            }
        };

        if !self.token_codec.is_valid(token, &identity) {
            return PipelineOutcome::SubjectMismatch;
        }

        context.authenticate(identity.into());
        PipelineOutcome::Authenticated
    }
}

/// Middleware that runs the authentication pipeline and always forwards
/// the request exactly once.
pub async fn authenticate(State(state): State<AppState>, req: Request, next: Next) -> Response {
    // The body is not `Sync`; only `Parts` may be borrowed across the await.
    let (mut parts, body) = req.into_parts();
    let mut context = parts
        .extensions
        .remove::<IdentityContext>()
        .unwrap_or_default();

    let outcome = state.pipeline.run(&parts.headers, &mut context).await;
    match &outcome {
        PipelineOutcome::Authenticated => {
            if let Some(authenticated) = context.identity() {
                tracing::debug!(identity_id = %authenticated.identity.id, "Request authenticated");
            }
        }
        PipelineOutcome::NoHeader => {}
        other => tracing::debug!(outcome = ?other, "Request continues unauthenticated"),
    }

    parts.extensions.insert(context);

    next.run(Request::from_parts(parts, body)).await
}

use crate::common::errors::BusinessError;
use crate::common::state::AppState;
use crate::config::Config;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_keycloak_auth::decode::KeycloakToken;
use axum_keycloak_auth::{PassthroughMode, layer::KeycloakAuthLayer};
use utoipa_axum::router::OpenApiRouter;
use uuid::Uuid;

/// A Keycloak realm role, compared by name
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Role(String);

impl Role {
    /// The role that grants access to the lab routes, `ADMIN_ROLE` in the config
    pub fn administrator(config: &Config) -> Self {
        Role(config.admin_role.clone())
    }
}

impl axum_keycloak_auth::role::Role for Role {}
impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Role(value)
    }
}

/// Require a valid Keycloak token carrying `required_roles` on every route of
/// `router`. Without a configured Keycloak instance the routes stay open.
pub fn protect(
    router: OpenApiRouter,
    state: &AppState,
    resource: &str,
    required_roles: Vec<Role>,
) -> OpenApiRouter {
    if let Some(instance) = state.keycloak_auth_instance.clone() {
        router.layer(
            KeycloakAuthLayer::<Role>::builder()
                .instance(instance)
                .passthrough_mode(PassthroughMode::Block)
                .persist_raw_claims(false)
                .expected_audiences(vec![String::from("account")])
                .required_roles(required_roles)
                .build(),
        )
    } else {
        if !state.config.tests_running {
            tracing::warn!("Routes of the {resource} router are not protected");
        }
        router
    }
}

/// The signed-in lab member a request acts on behalf of.
///
/// Passed explicitly into every operation that needs it instead of living in
/// global session state. It is derived per request from the Keycloak token
/// subject, or from an `Identity` request extension when authentication is
/// terminated upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub auth_id: Uuid,
}

impl Identity {
    pub fn new(auth_id: Uuid) -> Self {
        Self { auth_id }
    }

    pub fn owns(&self, auth_id: Uuid) -> bool {
        self.auth_id == auth_id
    }
}

/// Extractor that rejects anonymous requests with 401
pub struct CurrentIdentity(pub Identity);

fn identity_from_parts(parts: &Parts) -> Option<Identity> {
    if let Some(identity) = parts.extensions.get::<Identity>() {
        return Some(*identity);
    }
    parts
        .extensions
        .get::<KeycloakToken<Role>>()
        .and_then(|token| Uuid::parse_str(&token.subject).ok())
        .map(Identity::new)
}

impl<S> FromRequestParts<S> for CurrentIdentity
where
    S: Send + Sync,
{
    type Rejection = BusinessError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        identity_from_parts(parts)
            .map(CurrentIdentity)
            .ok_or(BusinessError::Unauthenticated)
    }
}

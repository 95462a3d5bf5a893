use crate::common::state::AppState;
use crate::config::Config;
use crate::{archive, breeding_logs, dashboard, strains, tanks, users};
use axum::Router;
use axum_keycloak_auth::{Url, instance::KeycloakAuthInstance, instance::KeycloakConfig};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

fn keycloak_instance(config: &Config) -> Option<Arc<KeycloakAuthInstance>> {
    if config.keycloak_url.is_empty() {
        // Tests and local runs without an identity provider
        return None;
    }

    match Url::parse(&config.keycloak_url) {
        Ok(server) => Some(Arc::new(KeycloakAuthInstance::new(
            KeycloakConfig::builder()
                .server(server)
                .realm(String::from(&config.keycloak_realm))
                .build(),
        ))),
        Err(err) => {
            tracing::error!(url = %config.keycloak_url, error = %err, "Invalid KEYCLOAK_URL, routes are not protected");
            None
        }
    }
}

pub fn build_router(db: &DatabaseConnection, config: &Config) -> Router {
    #[derive(OpenApi)]
    #[openapi(
        modifiers(&SecurityAddon),
        security(
            ("bearerAuth" = [])
        )
    )]
    struct ApiDoc;

    struct SecurityAddon;

    impl utoipa::Modify for SecurityAddon {
        fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
            if let Some(components) = openapi.components.as_mut() {
                components.add_security_scheme(
                    "bearerAuth",
                    utoipa::openapi::security::SecurityScheme::Http(
                        utoipa::openapi::security::HttpBuilder::new()
                            .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                            .bearer_format("JWT")
                            .build(),
                    ),
                );
            }
        }
    }

    let app_state = AppState::new(db.clone(), config.clone(), keycloak_instance(config));

    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(crate::common::views::router(&app_state)) // Root routes
        .nest("/api/strains", strains::views::router(&app_state))
        .nest("/api/tanks", tanks::views::router(&app_state))
        .nest("/api/archive", archive::views::router(&app_state))
        .nest(
            "/api/breeding_logs",
            breeding_logs::views::router(&app_state),
        )
        .nest("/api/users", users::views::router(&app_state))
        .nest("/api/dashboard", dashboard::views::router(&app_state))
        .split_for_parts();

    router.merge(Scalar::with_url("/api/docs", api))
}

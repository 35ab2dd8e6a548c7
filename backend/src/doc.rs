//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: All HTTP endpoints from the inbound layer (usernames,
//!   profiles, links, notifications, payments, health)
//! - **Schemas**: The error envelope plus the request/response payloads
//!   defined alongside their handlers
//!
//! The WebSocket change feed at `/ws/{user_id}` is outside the OpenAPI
//! surface; its frames reuse the change event shape documented in the
//! domain layer.

use utoipa::OpenApi;

use crate::domain::{Error, ErrorCode, UsernameCheck};
use crate::inbound::http::links::{CreateLinkRequest, LinkResponse, UpdateLinkRequest};
use crate::inbound::http::notifications::NotificationResponse;
use crate::inbound::http::payments::{CreatePaymentRequest, PaymentResponse, TipResponse};
use crate::inbound::http::profiles::{ProfileResponse, UpdateProfileRequest};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Droplink backend API",
        description = "HTTP interface for link-in-bio profiles, Pi tips, and health probes."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::usernames::check_availability,
        crate::inbound::http::profiles::get_profile,
        crate::inbound::http::profiles::put_profile,
        crate::inbound::http::links::list_links,
        crate::inbound::http::links::create_link,
        crate::inbound::http::links::update_link,
        crate::inbound::http::links::delete_link,
        crate::inbound::http::links::record_click,
        crate::inbound::http::notifications::list_notifications,
        crate::inbound::http::notifications::mark_read,
        crate::inbound::http::payments::create_payment,
        crate::inbound::http::payments::get_payment,
        crate::inbound::http::payments::list_tips,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        UsernameCheck,
        ProfileResponse,
        UpdateProfileRequest,
        LinkResponse,
        CreateLinkRequest,
        UpdateLinkRequest,
        NotificationResponse,
        CreatePaymentRequest,
        PaymentResponse,
        TipResponse,
    )),
    tags(
        (name = "usernames", description = "Handle validation and availability"),
        (name = "profiles", description = "Public profile records"),
        (name = "links", description = "Profile link management"),
        (name = "notifications", description = "Per-user notifications"),
        (name = "payments", description = "Pi payments and received tips"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn openapi_error_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get("Error").expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
    }

    #[test]
    fn openapi_registers_every_endpoint() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        for path in [
            "/api/v1/usernames/{candidate}/availability",
            "/api/v1/users/{user_id}/profile",
            "/api/v1/users/{user_id}/links",
            "/api/v1/users/{user_id}/links/{link_id}",
            "/api/v1/users/{user_id}/links/{link_id}/clicks",
            "/api/v1/users/{user_id}/notifications",
            "/api/v1/users/{user_id}/notifications/{notification_id}/read",
            "/api/v1/users/{user_id}/tips",
            "/api/v1/payments",
            "/api/v1/payments/{payment_id}",
            "/healthz/ready",
            "/healthz/live",
        ] {
            assert!(paths.contains_key(path), "missing path {path}");
        }
    }
}

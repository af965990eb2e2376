use crate::{errors::ServiceError, services::settings::SettingsService};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::warn;

/// Answers 503 on storefront routes while the site is in maintenance mode.
/// A settings lookup failure lets the request through.
pub async fn maintenance_middleware(
    State(settings): State<Arc<SettingsService>>,
    request: Request,
    next: Next,
) -> Response {
    match settings.get().await {
        Ok(current) if current.maintenance_mode => ServiceError::ServiceUnavailable(format!(
            "{} is under maintenance",
            current.site_name
        ))
        .into_response(),
        Ok(_) => next.run(request).await,
        Err(e) => {
            warn!(error = %e, "Could not read maintenance flag");
            next.run(request).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::site_settings;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        routing::get,
        Router,
    };
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use tower::ServiceExt;

    fn settings_row(maintenance_mode: bool) -> site_settings::Model {
        site_settings::Model {
            id: 1,
            site_name: "Modas Pathy".into(),
            tagline: None,
            logo: None,
            favicon: None,
            meta_description: None,
            meta_keywords: None,
            show_prices: true,
            maintenance_mode,
            exchange_rate: None,
            qr_image: None,
            updated_at: Utc::now(),
        }
    }

    async fn status_with(maintenance_mode: bool) -> StatusCode {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([vec![settings_row(maintenance_mode)]])
            .into_connection();
        let settings = Arc::new(SettingsService::new(Arc::new(db), None));
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(axum::middleware::from_fn_with_state(settings, maintenance_middleware));

        app.oneshot(HttpRequest::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn blocks_while_in_maintenance() {
        assert_eq!(status_with(true).await, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn passes_through_otherwise() {
        assert_eq!(status_with(false).await, StatusCode::OK);
    }
}

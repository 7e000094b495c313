//! Extractores con errores en el formato de la API
//!
//! Igual que `Query`, `Json` y `Path` de axum, pero un parámetro mal formado
//! devuelve el sobre JSON de `AppError` en vez de texto plano.

use axum::extract::{FromRequest, FromRequestParts};

use crate::utils::errors::AppError;

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Router};
    use axum_test::TestServer;
    use serde_json::Value;
    use uuid::Uuid;

    use crate::utils::pagination::PageQuery;

    fn server() -> TestServer {
        let app = Router::new()
            .route(
                "/page",
                get(|ApiQuery(page): ApiQuery<PageQuery>| async move { format!("{:?}", page.page) }),
            )
            .route(
                "/item/:id",
                get(|ApiPath(id): ApiPath<Uuid>| async move { id.to_string() }),
            );
        TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn malformed_query_uses_json_envelope() {
        let response = server().get("/page").add_query_param("page", "abc").await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn malformed_path_uses_json_envelope() {
        let response = server().get("/item/not-a-uuid").await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn valid_query_passes_through() {
        let response = server().get("/page").add_query_param("page", "3").await;

        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.text(), "Some(3)");
    }
}

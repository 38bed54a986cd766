pub mod analytics;
pub mod games;
pub mod ml;
pub mod players;
pub mod system;
pub mod teams;

pub use analytics::*;
pub use games::*;
pub use ml::*;
pub use players::*;
pub use system::*;
pub use teams::*;

#[cfg(test)]
pub(crate) mod test_support {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::Value;
    use std::sync::Arc;
    use tower::util::ServiceExt;

    use crate::api::{create_router, AppState};
    use crate::config::AppConfig;
    use crate::ml::{GamePredictor, ModelRegistry};
    use crate::persistence::MockNbaRepository;

    pub fn app(repo: MockNbaRepository) -> Router {
        let config = AppConfig::default_config().unwrap();
        let cors = config.cors.clone();
        let models = ModelRegistry::new(std::env::temp_dir(), GamePredictor::default());
        create_router(AppState::new(Arc::new(repo), config, models), &cors)
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let resp = app.oneshot(request).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn send_json(app: Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(app, request).await
    }
}

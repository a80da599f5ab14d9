//! AxumRoutes - RouteSink を axum::Router に載せる実装
//!
//! 各ルートは `POST <path>` で、ボディ全体を `Bytes` として受け取り、
//! リクエストヘッダから RequestContext を組み立てて handler に渡します。

use std::mem;

use axum::{
    Router,
    body::Bytes,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};

use crate::domain::envelope::Reply;
use crate::ports::context::RequestContext;
use crate::ports::route_sink::{RouteHandler, RouteSink};

/// AxumRoutes は POST ルートを axum::Router に積み上げる
///
/// # 使用例
/// ```ignore
/// let mut routes = AxumRoutes::new();
/// app.attach(&mut routes);
/// let router = routes.into_router().layer(...);
/// ```
#[derive(Debug, Default)]
pub struct AxumRoutes {
    router: Router,
}

impl AxumRoutes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_router(self) -> Router {
        self.router
    }
}

impl RouteSink for AxumRoutes {
    fn post(&mut self, path: &str, handler: RouteHandler) {
        let route = post(move |headers: HeaderMap, body: Bytes| {
            let handler = handler.clone();
            async move { handler(context_from(&headers), body).await }
        });
        self.router = mem::take(&mut self.router).route(path, route);
    }
}

/// ヘッダを RequestContext にコピーする（UTF-8 でない値は捨てる）
fn context_from(headers: &HeaderMap) -> RequestContext {
    headers
        .iter()
        .filter_map(|(name, value)| Some((name.as_str(), value.to_str().ok()?)))
        .fold(RequestContext::new(), |ctx, (name, value)| {
            ctx.with_header(name, value)
        })
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let header = self.header();
        (status, [header], self.into_body()).into_response()
    }
}

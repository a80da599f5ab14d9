//! MemoryRoutes - プロセス内で完結する RouteSink
//!
//! HTTP サーバを立てずに登録済みルートを直接呼び出します。
//! テストやツールから Dispatcher を駆動するのに使います。

use std::collections::HashMap;

use bytes::Bytes;

use crate::domain::envelope::Reply;
use crate::ports::context::RequestContext;
use crate::ports::route_sink::{RouteHandler, RouteSink};

/// MemoryRoutes はパス → handler の表
#[derive(Default)]
pub struct MemoryRoutes {
    routes: HashMap<String, RouteHandler>,
}

impl MemoryRoutes {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登録済みのパス（辞書順）
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.routes.keys().cloned().collect();
        paths.sort();
        paths
    }

    pub fn contains(&self, path: &str) -> bool {
        self.routes.contains_key(path)
    }

    /// `POST <path>` 相当の呼び出し（未登録なら `None`）
    pub async fn call(&self, path: &str, ctx: RequestContext, body: Bytes) -> Option<Reply> {
        let handler = self.routes.get(path)?.clone();
        Some(handler(ctx, body).await)
    }
}

impl RouteSink for MemoryRoutes {
    fn post(&mut self, path: &str, handler: RouteHandler) {
        self.routes.insert(path.to_string(), handler);
    }
}

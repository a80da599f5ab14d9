//! Dispatcher - binding ごとのリクエスト処理
//!
//! # 状態遷移（1 リクエスト）
//! ```text
//! body ──decode──▶ argument ──validate──▶ invoke ──▶ Ok(result) ──encode──▶ Success
//!        │                    │                     └─▶ Err(e) ─────────────▶ Failure(e)
//!        └─▶ Failure(decode)  └─▶ Failure(validation)
//! ```
//! 引数なしの binding は decode / validate を飛ばして直接 invoke します。
//!
//! リクエストは互いに独立で、共有するのは HandlerObject（`Arc<H>`）だけです。
//! Dispatcher 自身はロックを取りません。

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;

use super::binder::BoundMethod;
use crate::domain::envelope::Reply;
use crate::ports::context::RequestContext;
use crate::ports::route_sink::{RouteFuture, RouteHandler, RouteSink};

/// Dispatcher は binding 名 → 呼び出し口のテーブル
pub struct Dispatcher<H: Send + Sync + 'static> {
    handler: Arc<H>,
    routes: HashMap<String, BoundMethod<H>>,
}

impl<H: Send + Sync + 'static> Dispatcher<H> {
    pub fn new(handler: Arc<H>, methods: Vec<BoundMethod<H>>) -> Self {
        let routes = methods
            .into_iter()
            .map(|m| (m.binding.name.clone(), m))
            .collect();
        Self { handler, routes }
    }

    /// 1 リクエストを処理する（未登録の名前なら `None`）
    pub async fn dispatch(&self, name: &str, ctx: RequestContext, body: Bytes) -> Option<Reply> {
        let method = self.routes.get(name)?;
        let ctx = ctx.for_method(name);
        let request_id = ctx.request_id();
        debug!(method = name, %request_id, body_len = body.len(), "dispatching");

        let reply = match method
            .invoker
            .call(Arc::clone(&self.handler), ctx, body)
            .await
        {
            Ok(encoded) => Reply::Success(encoded),
            Err(err) => {
                debug!(method = name, %request_id, kind = err.kind(), error = %err, "rpc failed");
                Reply::Failure(err.to_string())
            }
        };
        Some(reply)
    }

    /// 全 binding を `<prefix>/<name>` として RouteSink に登録する
    pub fn attach(self: &Arc<Self>, prefix: &str, sink: &mut impl RouteSink) {
        for method in self.routes.values() {
            let path = method.binding.path(prefix);
            let name = method.binding.name.clone();
            let dispatcher = Arc::clone(self);
            let handler: RouteHandler = Arc::new(move |ctx: RequestContext, body: Bytes| -> RouteFuture {
                let dispatcher = Arc::clone(&dispatcher);
                let name = name.clone();
                Box::pin(async move {
                    match dispatcher.dispatch(&name, ctx, body).await {
                        Some(reply) => reply,
                        None => Reply::failure(format!("unknown method '{name}'")),
                    }
                })
            });
            sink.post(&path, handler);
        }
    }
}

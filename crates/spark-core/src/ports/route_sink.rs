//! RouteSink port - HTTP 層のルーティンググループへの登録フック
//!
//! Dispatcher は `(path, handler)` の組をここに流し込むだけで、
//! HTTP サーバの起動やミドルウェアには関与しません。

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;

use super::context::RequestContext;
use crate::domain::envelope::Reply;

/// ルート 1 件の処理結果を返す Future
pub type RouteFuture = Pin<Box<dyn Future<Output = Reply> + Send + 'static>>;

/// リクエスト 1 件を処理するクロージャ（body はリクエストボディ全体）
pub type RouteHandler = Arc<dyn Fn(RequestContext, Bytes) -> RouteFuture + Send + Sync>;

/// RouteSink は POST ルートを受け取る
///
/// # 実装
/// - `impls::AxumRoutes`: axum::Router に載せる
/// - `impls::MemoryRoutes`: プロセス内で直接呼ぶ（テスト用）
pub trait RouteSink {
    fn post(&mut self, path: &str, handler: RouteHandler);
}

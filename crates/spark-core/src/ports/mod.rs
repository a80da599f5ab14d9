//! Ports - 外部コラボレータとの境界
//!
//! HTTP サーバそのものはこのクレートの外側にあります。
//! ここではリクエストごとのコンテキストと、ルート登録のフックだけを定義します。

pub mod context;
pub mod route_sink;

pub use self::context::RequestContext;
pub use self::route_sink::{RouteFuture, RouteHandler, RouteSink};

//! spark-core
//!
//! Core building blocks for the Spark RPC binder.
//!
//! ハンドラオブジェクトのメソッドを検査して HTTP POST の RPC として公開し、
//! 引数・結果の型からクライアント用の TypeScript 型定義を生成します。
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（descriptor, binding, signature, envelope, errors, time）
//! - **ports**: 抽象化レイヤー（RequestContext, RouteSink）
//! - **typed**: 型付きメソッド API（Service, Describe, Validate, DynMethod, PayloadCodec）
//! - **app**: アプリケーションロジック（signature_check, projector, binder, dispatcher, emitter, builder）
//! - **impls**: 実装（AxumRoutes, MemoryRoutes）
//!
//! # 使用例
//! ```ignore
//! use spark_core::{RequestContext, RpcApp, Service, MethodSet};
//!
//! struct App;
//!
//! impl App {
//!     async fn ping(self: Arc<Self>, _ctx: RequestContext) -> Result<String, String> {
//!         Ok("pong".into())
//!     }
//! }
//!
//! impl Service for App {
//!     const NAME: &'static str = "App";
//!     fn methods(set: &mut MethodSet<Self>) {
//!         set.method("Ping", App::ping);
//!     }
//! }
//!
//! let app = RpcApp::builder(Arc::new(App)).build()?;
//! let router = app.router();
//! ```

// derive が生成する `::spark_core::...` をこのクレート内でも解決させる
extern crate self as spark_core;

pub mod app;
pub mod domain;
pub mod impls;
pub mod ports;
pub mod typed;

pub use crate::app::{BuildError, ProjectorConfig, RpcApp, RpcAppBuilder, TypeOverrides};
pub use crate::domain::{MethodBinding, Reply, RpcError, UnixTime, ValidationErrors};
pub use crate::ports::RequestContext;
pub use crate::typed::{Describe, MethodSet, Rules, Service, Validate};

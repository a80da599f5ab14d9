//! RpcAppBuilder - HandlerObject から RPC アプリを組み立てる
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）
//! - bind → emit → dispatch のワイヤリングを 1 か所に集める

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;

use super::binder::bind;
use super::dispatcher::Dispatcher;
use super::emitter::emit;
use super::projector::{Projector, ProjectorConfig, TypeOverrides};
use crate::domain::binding::MethodBinding;
use crate::domain::envelope::Reply;
use crate::domain::errors::BindError;
use crate::impls::axum_routes::AxumRoutes;
use crate::ports::context::RequestContext;
use crate::ports::route_sink::RouteSink;
use crate::typed::registry::Service;

/// 既定のパス prefix
pub const DEFAULT_PREFIX: &str = "/rpc";

/// RpcAppBuilder は RpcApp を構築
///
/// # 使用例
/// ```ignore
/// let app = RpcApp::builder(Arc::new(App::default()))
///     .prefix("/rpc")
///     .expect_methods(&["Example", "GetTime"])
///     .build()?;
/// app.write_typedefs("frontend/gotypes.ts")?;
/// let router = app.router();
/// ```
///
/// # Fail-fast 設計
/// - expect_methods() で公開されるべきメソッド名を宣言
/// - build() 時に「期待集合 ⊆ bind 済み集合」をチェック
/// - Signature 不合格で読み飛ばされたメソッドもここで検出できる
pub struct RpcAppBuilder<H: Service> {
    handler: Arc<H>,
    prefix: String,
    config: ProjectorConfig,
    expected_methods: Option<Vec<String>>,
}

/// BuildError はアプリケーション構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Bind(#[from] BindError),

    #[error("Missing RPC methods: {0:?}. These methods were expected but not bound.")]
    MissingMethods(Vec<String>),
}

impl<H: Service> RpcAppBuilder<H> {
    pub fn new(handler: Arc<H>) -> Self {
        Self {
            handler,
            prefix: DEFAULT_PREFIX.to_string(),
            config: ProjectorConfig::default(),
            expected_methods: None,
        }
    }

    /// ルートの prefix（既定は `/rpc`）
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// 型生成の設定をまとめて差し替える
    pub fn config(mut self, config: ProjectorConfig) -> Self {
        self.config = config;
        self
    }

    /// 型の置換表だけを差し替える
    pub fn overrides(mut self, overrides: TypeOverrides) -> Self {
        self.config.overrides = overrides;
        self
    }

    /// bind されるべきメソッド名のリストを設定
    pub fn expect_methods(mut self, names: &[&str]) -> Self {
        self.expected_methods = Some(names.iter().map(|n| n.to_string()).collect());
        self
    }

    /// bind して型定義を生成し、RpcApp を返す
    ///
    /// # 検証
    /// - 名前の重複・不正は BuildError::Bind
    /// - expect_methods() の名前が bind されていなければ BuildError::MissingMethods
    pub fn build(self) -> Result<RpcApp<H>, BuildError> {
        let bound = bind::<H>()?;
        let bindings = bound.bindings();

        if let Some(expected) = &self.expected_methods {
            let missing: Vec<String> = expected
                .iter()
                .filter(|name| !bindings.iter().any(|b| &b.name == *name))
                .cloned()
                .collect();
            if !missing.is_empty() {
                return Err(BuildError::MissingMethods(missing));
            }
        }

        let mut projector = Projector::new(self.config);
        let typedefs = emit(H::NAME, &bindings, &bound.graph, &mut projector);

        Ok(RpcApp {
            prefix: self.prefix,
            bindings,
            skipped: bound.skipped,
            typedefs,
            dispatcher: Arc::new(Dispatcher::new(self.handler, bound.methods)),
        })
    }
}

/// RpcApp は bind 済みの RPC アプリ
///
/// binding の一覧は構築後に変わりません。
pub struct RpcApp<H: Service> {
    prefix: String,
    bindings: Vec<MethodBinding>,
    skipped: Vec<String>,
    typedefs: String,
    dispatcher: Arc<Dispatcher<H>>,
}

impl<H: Service> RpcApp<H> {
    pub fn builder(handler: Arc<H>) -> RpcAppBuilder<H> {
        RpcAppBuilder::new(handler)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// 登録順の binding 一覧
    pub fn bindings(&self) -> &[MethodBinding] {
        &self.bindings
    }

    /// Signature 不合格で公開されなかったメソッド名
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    /// 生成済みの TypeScript 型定義
    pub fn typedefs(&self) -> &str {
        &self.typedefs
    }

    /// 型定義をファイルに書き出す（親ディレクトリがなければ作る）
    pub fn write_typedefs(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, &self.typedefs)?;
        tracing::info!(path = %path.display(), bytes = self.typedefs.len(), "wrote typedefs");
        Ok(())
    }

    /// 全 binding を `<prefix>/<name>` として RouteSink に登録する
    pub fn attach(&self, sink: &mut impl RouteSink) {
        self.dispatcher.attach(&self.prefix, sink);
    }

    /// ルートを登録した axum::Router
    pub fn router(&self) -> axum::Router {
        let mut routes = AxumRoutes::new();
        self.attach(&mut routes);
        routes.into_router()
    }

    /// HTTP を通さずに 1 リクエストを処理する
    pub async fn dispatch(&self, name: &str, ctx: RequestContext, body: Bytes) -> Option<Reply> {
        self.dispatcher.dispatch(name, ctx, body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typed::MethodSet;

    struct Tiny;

    impl Tiny {
        async fn ping(self: Arc<Self>, _ctx: RequestContext) -> Result<String, String> {
            Ok("pong".to_string())
        }
    }

    impl Service for Tiny {
        const NAME: &'static str = "Tiny";

        fn methods(set: &mut MethodSet<Self>) {
            set.method("Ping", Tiny::ping);
        }
    }

    struct Twice;

    impl Service for Twice {
        const NAME: &'static str = "Twice";

        fn methods(set: &mut MethodSet<Self>) {
            set.method("Ping", |_: Arc<Self>, _: RequestContext| async {
                Ok::<_, String>(1u8)
            })
            .method("Ping", |_: Arc<Self>, _: RequestContext| async {
                Ok::<_, String>(2u8)
            });
        }
    }

    #[test]
    fn test_build_success() {
        let app = RpcApp::builder(Arc::new(Tiny))
            .expect_methods(&["Ping"])
            .build()
            .unwrap();

        assert_eq!(app.prefix(), "/rpc");
        assert_eq!(app.bindings().len(), 1);
        assert!(app.typedefs().contains("\tPing(): Promise<string>\n"));
    }

    #[test]
    fn test_build_missing_methods() {
        let app = RpcApp::builder(Arc::new(Tiny))
            .expect_methods(&["Ping", "Pong"])
            .build();
        assert!(matches!(
            app,
            Err(BuildError::MissingMethods(missing)) if missing == vec!["Pong".to_string()]
        ));
    }

    #[test]
    fn test_build_duplicate_method() {
        let app = RpcApp::builder(Arc::new(Twice)).build();
        assert!(matches!(
            app,
            Err(BuildError::Bind(BindError::DuplicateMethod(name))) if name == "Ping"
        ));
    }

    #[test]
    fn test_write_typedefs_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frontend").join("gotypes.ts");
        let app = RpcApp::builder(Arc::new(Tiny)).build().unwrap();

        app.write_typedefs(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, app.typedefs());
        assert!(written.starts_with("// AUTOMATICALLY GENERATED - DO NOT EDIT\n"));
    }

    #[tokio::test]
    async fn test_dispatch_without_http() {
        let app = RpcApp::builder(Arc::new(Tiny)).build().unwrap();
        let reply = app
            .dispatch("Ping", RequestContext::new(), Bytes::new())
            .await
            .unwrap();
        assert_eq!(reply.status(), 200);
    }
}

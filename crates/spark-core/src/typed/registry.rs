//! Service / MethodSet - HandlerObject のメソッド一覧
//!
//! Rust には実行時にメソッド集合を列挙する手段がないので、
//! `Service::methods` で宣言順に明示登録します。
//! 名前の検査や Signature の検査は Binder（`app::binder`）が行い、
//! ここでは登録順を保持するだけです。

use std::sync::Arc;

use super::handler::{DynMethod, IntoMethod};
use crate::domain::signature::Signature;

/// Service は RPC として公開するハンドラオブジェクト
///
/// # 使用例
/// ```ignore
/// struct App;
///
/// impl App {
///     async fn echo(self: Arc<Self>, _ctx: RequestContext, req: Echo) -> Result<Echo, String> {
///         Ok(Echo { message: format!("echo: {}", req.message) })
///     }
/// }
///
/// impl Service for App {
///     const NAME: &'static str = "App";
///
///     fn methods(set: &mut MethodSet<Self>) {
///         set.method("Echo", App::echo);
///     }
/// }
/// ```
pub trait Service: Send + Sync + Sized + 'static {
    /// クライアント側インターフェースの名前
    const NAME: &'static str;

    fn methods(set: &mut MethodSet<Self>);
}

/// MethodEntry は登録されたメソッド候補 1 件（未検証）
pub struct MethodEntry<H: Send + Sync + 'static> {
    pub name: String,
    pub signature: Signature,
    pub invoker: Arc<dyn DynMethod<H>>,
}

/// MethodSet はメソッド候補を登録順に集める
pub struct MethodSet<H: Send + Sync + 'static> {
    entries: Vec<MethodEntry<H>>,
}

impl<H: Send + Sync + 'static> MethodSet<H> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// 型付き関数を登録（Signature は関数の型から組み立てる）
    pub fn method<M, F: IntoMethod<H, M>>(&mut self, name: impl Into<String>, f: F) -> &mut Self {
        self.entries.push(MethodEntry {
            name: name.into(),
            signature: F::signature(),
            invoker: f.into_dyn(),
        });
        self
    }

    /// 型消去済みの呼び出し口を Signature つきで登録
    ///
    /// コード生成器などが使うフックです。Signature が RPC の形をしていなければ
    /// Binder が警告して読み飛ばします。
    pub fn raw(
        &mut self,
        name: impl Into<String>,
        signature: Signature,
        invoker: Arc<dyn DynMethod<H>>,
    ) -> &mut Self {
        self.entries.push(MethodEntry {
            name: name.into(),
            signature,
            invoker,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn into_entries(self) -> Vec<MethodEntry<H>> {
        self.entries
    }

    /// `H::methods` を実行して MethodSet を作る
    pub fn collect() -> Self
    where
        H: Service,
    {
        let mut set = Self::new();
        H::methods(&mut set);
        set
    }
}

impl<H: Send + Sync + 'static> Default for MethodSet<H> {
    fn default() -> Self {
        Self::new()
    }
}

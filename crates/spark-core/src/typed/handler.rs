//! Method handler - 型付きメソッドと object-safe な呼び出し口
//!
//! # 二層構造
//! - **表層**: `async fn m(self: Arc<Self>, ctx: RequestContext, arg: A) -> Result<R, E>`
//! - **内部**: `DynMethod<H>` - decode → validate → invoke → encode を 1 つに閉じ込めた trait object
//!
//! `IntoMethod` は関数の型から Signature を組み立て、`TypedMethod` で包んで
//! `Arc<dyn DynMethod<H>>` に変換します。結果型の `WireShape` もこのとき 1 回だけ作るので、
//! リクエスト時に型を調べる必要はありません。

use std::fmt::Display;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::codec::{PayloadCodec, WireShape};
use super::describe::Describe;
use super::validate::Validate;
use crate::domain::errors::RpcError;
use crate::domain::signature::Signature;
use crate::ports::context::RequestContext;

/// DynMethod は object-safe なメソッド呼び出し
///
/// `body` はリクエストボディ全体。成功時はエンコード済みの結果を返します。
#[async_trait]
pub trait DynMethod<H: Send + Sync + 'static>: Send + Sync {
    async fn call(
        &self,
        handler: Arc<H>,
        ctx: RequestContext,
        body: Bytes,
    ) -> Result<Bytes, RpcError>;
}

/// 引数なし（receiver, context）のメソッド
pub struct NoArg;

/// 引数あり（receiver, context, argument）のメソッド
pub struct WithArg<A>(PhantomData<fn() -> A>);

/// 関数を DynMethod に変換する
///
/// `M` はアリティを区別するマーカー（`NoArg` / `WithArg<A>`）で、
/// 呼び出し側が書く必要はありません。
pub trait IntoMethod<H: Send + Sync + 'static, M>: Sized + Send + Sync + 'static {
    /// 関数の型から組み立てた Signature
    fn signature() -> Signature;

    fn into_dyn(self) -> Arc<dyn DynMethod<H>>;
}

/// TypedMethod は関数、結果型の WireShape、アリティのマーカーを保持する
pub struct TypedMethod<F, M> {
    f: F,
    result: WireShape,
    _marker: PhantomData<fn() -> M>,
}

impl<F, M> TypedMethod<F, M> {
    pub fn new(f: F, result: WireShape) -> Self {
        Self {
            f,
            result,
            _marker: PhantomData,
        }
    }
}

fn handler_failure<E: Display>(err: E) -> RpcError {
    RpcError::Handler(err.to_string())
}

// ========================================
// (receiver, context) -> Result<R, E>
// ========================================

impl<H, F, Fut, R, E> IntoMethod<H, NoArg> for F
where
    H: Send + Sync + 'static,
    F: Fn(Arc<H>, RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
    R: Serialize + Describe + Send,
    E: Display + Send,
{
    fn signature() -> Signature {
        Signature::new()
            .receiver()
            .context()
            .returns(R::descriptor())
            .fails()
    }

    fn into_dyn(self) -> Arc<dyn DynMethod<H>> {
        Arc::new(TypedMethod::<F, NoArg>::new(self, WireShape::of::<R>()))
    }
}

#[async_trait]
impl<H, F, Fut, R, E> DynMethod<H> for TypedMethod<F, NoArg>
where
    H: Send + Sync + 'static,
    F: Fn(Arc<H>, RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
    R: Serialize + Describe + Send,
    E: Display + Send,
{
    async fn call(
        &self,
        handler: Arc<H>,
        ctx: RequestContext,
        _body: Bytes,
    ) -> Result<Bytes, RpcError> {
        let result = (self.f)(handler, ctx).await.map_err(handler_failure)?;
        self.result.encode(&result)
    }
}

// ========================================
// (receiver, context, argument) -> Result<R, E>
// ========================================

impl<H, F, Fut, A, R, E> IntoMethod<H, WithArg<A>> for F
where
    H: Send + Sync + 'static,
    F: Fn(Arc<H>, RequestContext, A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
    A: DeserializeOwned + Validate + Describe + Send,
    R: Serialize + Describe + Send,
    E: Display + Send,
{
    fn signature() -> Signature {
        Signature::new()
            .receiver()
            .context()
            .param(A::descriptor())
            .returns(R::descriptor())
            .fails()
    }

    fn into_dyn(self) -> Arc<dyn DynMethod<H>> {
        Arc::new(TypedMethod::<F, WithArg<A>>::new(
            self,
            WireShape::of::<R>(),
        ))
    }
}

#[async_trait]
impl<H, F, Fut, A, R, E> DynMethod<H> for TypedMethod<F, WithArg<A>>
where
    H: Send + Sync + 'static,
    F: Fn(Arc<H>, RequestContext, A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
    A: DeserializeOwned + Validate + Describe + Send,
    R: Serialize + Describe + Send,
    E: Display + Send,
{
    async fn call(
        &self,
        handler: Arc<H>,
        ctx: RequestContext,
        body: Bytes,
    ) -> Result<Bytes, RpcError> {
        let arg: A = PayloadCodec::decode(&body)?;
        // 検証に失敗したらメソッドは呼ばない
        arg.validate()?;
        let result = (self.f)(handler, ctx, arg).await.map_err(handler_failure)?;
        self.result.encode(&result)
    }
}

//! App - アプリケーション層
//!
//! domain / typed / ports を組み合わせて RPC バインダを構成します。
//!
//! # 主要コンポーネント
//! - **signature_check**: メソッド候補が RPC の形か判定（Signature Validator）
//! - **projector**: TypeDescriptor → TypeScript 型表記（Type Projector）
//! - **binder**: メソッド集合 → MethodBinding 一覧（Method Binder）
//! - **dispatcher**: binding ごとのリクエスト処理（Dispatcher）
//! - **emitter**: クライアント用の型定義を生成（Interface Emitter）
//! - **builder**: 上記のワイヤリングと起動時検証

pub mod binder;
pub mod builder;
pub mod dispatcher;
pub mod emitter;
pub mod projector;
pub mod signature_check;

// 主要な型を再エクスポート
pub use self::binder::{Bound, BoundMethod, bind, bind_set};
pub use self::builder::{BuildError, DEFAULT_PREFIX, RpcApp, RpcAppBuilder};
pub use self::dispatcher::Dispatcher;
pub use self::emitter::{GENERATED_HEADER, emit};
pub use self::projector::{Projector, ProjectorConfig, TypeOverrides};
pub use self::signature_check::{Accepted, check_signature};

//! Typed - 型付きメソッド API
//!
//! ハンドラの関数シグネチャから Signature / TypeDescriptor を静的に組み立て、
//! decode → validate → invoke → encode を型消去した呼び出し口に閉じ込めます。
//!
//! # 二層構造
//! - **表層（Typed）**: `Service`, `Describe`（derive 可）, `Validate` - 型安全
//! - **内部（Dyn）**: `DynMethod` - object-safe, type erasure

pub mod codec;
pub mod describe;
pub mod handler;
pub mod registry;
pub mod validate;

// 主要な trait/型 を再エクスポート
pub use self::codec::{PayloadCodec, WireShape};
pub use self::describe::{Describe, StructBuilder, define_struct};
pub use spark_derive::Describe;
pub use self::handler::{DynMethod, IntoMethod, NoArg, TypedMethod, WithArg};
pub use self::registry::{MethodEntry, MethodSet, Service};
pub use self::validate::{FieldCheck, FieldValue, Rules, Validate};

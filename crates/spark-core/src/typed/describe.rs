//! Describe trait - 型が自分の形を TypeDescriptor として申告する
//!
//! # 二段構成
//! - `descriptor()`: 浅い記述。構造体は名前付き参照になり、フィールドは展開しない
//! - `define(graph)`: 構造体ならフィールドを TypeGraph に登録する（再帰的）
//!
//! 構造体は `#[derive(Describe)]` で実装します。フィールドの並びと名前は
//! 宣言と serde の属性から決まるので、手で書き直す必要はありません。
//!
//! # 使用例
//! ```ignore
//! #[derive(Serialize, Deserialize, Describe)]
//! struct EchoRequest {
//!     #[serde(rename = "Message")]
//!     message: String,
//! }
//! ```

use std::any::TypeId;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde_bytes::ByteBuf;

use crate::domain::descriptor::{
    FieldDef, NumberKind, StructRef, TypeDescriptor, TypeGraph, TypeKind,
};
use crate::domain::time::UnixTime;

/// Describe は型の構造的な記述を返す
///
/// 構造体は `#[derive(Describe)]` で実装します。derive が生成するのは
/// `TypeDescriptor::structure::<Self>` と `define_struct` の呼び出しです。
pub trait Describe: 'static {
    fn descriptor() -> TypeDescriptor;

    /// 到達可能な構造体を登録する（構造体以外は子に委譲するだけ）
    fn define(_graph: &mut TypeGraph) {}
}

impl TypeDescriptor {
    /// 名前付き構造体への参照
    pub fn structure<T: Describe>(name: &'static str) -> Self {
        TypeDescriptor::of::<T>(TypeKind::Struct(StructRef {
            name,
            define: T::define,
        }))
    }
}

/// StructBuilder は構造体のフィールドを宣言順に集める
pub struct StructBuilder<'g> {
    graph: &'g mut TypeGraph,
    fields: Vec<FieldDef>,
}

impl StructBuilder<'_> {
    /// フィールドを追加（`name` はワイヤ上の名前）
    pub fn field<F: Describe>(&mut self, name: &'static str) -> &mut Self {
        F::define(self.graph);
        self.fields.push(FieldDef {
            name,
            ty: F::descriptor(),
        });
        self
    }
}

/// 構造体 `T` を TypeGraph に登録する
///
/// 既に登録済み（自己参照で登録中の場合を含む）なら何もしません。
pub fn define_struct<T: 'static>(
    graph: &mut TypeGraph,
    name: &'static str,
    build: impl FnOnce(&mut StructBuilder<'_>),
) {
    let id = TypeId::of::<T>();
    if !graph.begin(id, name) {
        return;
    }
    let mut builder = StructBuilder {
        graph: &mut *graph,
        fields: Vec::new(),
    };
    build(&mut builder);
    let fields = builder.fields;
    graph.finish(id, fields);
}

// ========================================
// primitive
// ========================================

macro_rules! describe_number {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Describe for $ty {
                fn descriptor() -> TypeDescriptor {
                    TypeDescriptor::of::<$ty>(TypeKind::Number(NumberKind::$kind))
                }
            }
        )*
    };
}

describe_number! {
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    i128 => I128,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    u128 => U128,
    usize => Usize,
    f32 => F32,
    f64 => F64,
}

impl Describe for bool {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<bool>(TypeKind::Bool)
    }
}

impl Describe for String {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<String>(TypeKind::Text)
    }
}

impl Describe for char {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<char>(TypeKind::Text)
    }
}

impl Describe for () {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<()>(TypeKind::Unit)
    }
}

// ========================================
// aggregate
// ========================================

impl<T: Describe> Describe for Vec<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Vec<T>>(TypeKind::Sequence(Box::new(T::descriptor())))
    }

    fn define(graph: &mut TypeGraph) {
        T::define(graph);
    }
}

impl<T: Describe> Describe for Option<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Option<T>>(TypeKind::Optional(Box::new(T::descriptor())))
    }

    fn define(graph: &mut TypeGraph) {
        T::define(graph);
    }
}

macro_rules! describe_pointer {
    ($($ptr:ident),*) => {
        $(
            impl<T: Describe> Describe for $ptr<T> {
                fn descriptor() -> TypeDescriptor {
                    TypeDescriptor::of::<$ptr<T>>(TypeKind::Pointer(Box::new(T::descriptor())))
                }

                fn define(graph: &mut TypeGraph) {
                    T::define(graph);
                }
            }
        )*
    };
}

describe_pointer!(Box, Arc, Rc);

/// チャネルはストリーム扱い（RPC の結果にはできない）
impl<T: Describe> Describe for tokio::sync::mpsc::Receiver<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Self>(TypeKind::Stream(Box::new(T::descriptor())))
    }
}

impl<T: Describe> Describe for tokio::sync::mpsc::UnboundedReceiver<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Self>(TypeKind::Stream(Box::new(T::descriptor())))
    }
}

// ========================================
// opaque（override がなければ unknown）
// ========================================

impl<K: 'static, V: Describe, S: 'static> Describe for HashMap<K, V, S> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Self>(TypeKind::Opaque)
    }

    fn define(graph: &mut TypeGraph) {
        V::define(graph);
    }
}

impl<K: 'static, V: Describe> Describe for BTreeMap<K, V> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Self>(TypeKind::Opaque)
    }

    fn define(graph: &mut TypeGraph) {
        V::define(graph);
    }
}

impl Describe for serde_json::Value {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Self>(TypeKind::Opaque)
    }
}

impl Describe for Bytes {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Self>(TypeKind::Opaque)
    }
}

impl Describe for ByteBuf {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Self>(TypeKind::Opaque)
    }
}

impl Describe for DateTime<Utc> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Self>(TypeKind::Opaque)
    }
}

impl Describe for UnixTime {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Self>(TypeKind::Opaque)
    }
}

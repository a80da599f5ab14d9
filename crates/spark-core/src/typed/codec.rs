//! PayloadCodec - ワイヤ上のバイト列と型の相互変換（CBOR）
//!
//! # デコードフロー
//! 1. リクエストボディ全体を受け取る
//! 2. ciborium で `T` の新しいインスタンスにデコード
//! 3. 失敗時は `RpcError::Decode`（Dispatcher が Failure に変換）
//!
//! # バイト列
//! 型定義では 1 バイト要素のシーケンスはすべて `Uint8Array` です。serde は
//! `Vec<u8>` を整数の配列として出すので、結果は `WireShape` を通して
//! エンコードし、記述がバイナリと言っている位置を byte string に置き換えます。
//! デコード側は ciborium が byte string と配列のどちらでも読めます。

use bytes::Bytes;
use ciborium::Value;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::describe::Describe;
use crate::domain::descriptor::{TypeDescriptor, TypeGraph, TypeKind};
use crate::domain::errors::RpcError;

/// PayloadCodec は CBOR (RFC 8949) でエンコード/デコードする
pub struct PayloadCodec;

impl PayloadCodec {
    pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Bytes, RpcError> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf).map_err(|e| RpcError::Encode(e.to_string()))?;
        Ok(Bytes::from(buf))
    }

    pub fn decode<T: DeserializeOwned>(data: &[u8]) -> Result<T, RpcError> {
        ciborium::from_reader(data).map_err(|e| RpcError::Decode(e.to_string()))
    }
}

/// WireShape は型の記述と、そこから到達できる構造体の定義
///
/// メソッドごとに 1 回だけ組み立て、リクエストのたびに使い回します。
#[derive(Debug)]
pub struct WireShape {
    ty: TypeDescriptor,
    graph: TypeGraph,
}

impl WireShape {
    pub fn of<T: Describe>() -> Self {
        let ty = T::descriptor();
        let mut graph = TypeGraph::new();
        graph.queue(&ty);
        Self { ty, graph }
    }

    /// 1 バイト要素のシーケンスを byte string にしてエンコードする
    pub fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Bytes, RpcError> {
        let mut value =
            Value::serialized(value).map_err(|e| RpcError::Encode(e.to_string()))?;
        conform(&mut value, &self.ty, &self.graph);
        PayloadCodec::encode(&value)
    }
}

fn conform(value: &mut Value, ty: &TypeDescriptor, graph: &TypeGraph) {
    match &ty.kind {
        TypeKind::Sequence(inner) if inner.is_byte() => {
            if let Some(bytes) = byte_array(value) {
                *value = Value::Bytes(bytes);
            }
        }
        TypeKind::Sequence(inner) => {
            if let Value::Array(items) = value {
                for item in items {
                    conform(item, inner, graph);
                }
            }
        }
        TypeKind::Optional(inner) | TypeKind::Pointer(inner) => conform(value, inner, graph),
        TypeKind::Struct(_) => {
            let (Some(def), Value::Map(entries)) = (graph.get(&ty.id), value) else {
                return;
            };
            for (key, item) in entries {
                let Some(name) = key.as_text() else {
                    continue;
                };
                if let Some(field) = def.fields.iter().find(|f| f.name == name) {
                    conform(item, &field.ty, graph);
                }
            }
        }
        _ => {}
    }
}

/// 全要素が 0..=255 の整数なら、その並び
fn byte_array(value: &Value) -> Option<Vec<u8>> {
    let Value::Array(items) = value else {
        return None;
    };
    items
        .iter()
        .map(|item| match item {
            Value::Integer(n) => u8::try_from(*n).ok(),
            _ => None,
        })
        .collect()
}

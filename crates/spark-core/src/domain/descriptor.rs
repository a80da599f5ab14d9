//! TypeDescriptor - 型の構造的な記述（クライアント型生成の中間表現）
//!
//! Rust には実行時リフレクションがないため、各型は `Describe` trait を通じて
//! 自分の形を `TypeDescriptor` として申告します。Projector はこの中間表現だけを
//! 見てテキストを生成するので、「型を歩く」処理と「ターゲット言語で描画する」
//! 処理が分離されます。
//!
//! # 構成
//! - **TypeDescriptor**: 1 つの型（TypeId + 名前 + 種別）
//! - **TypeKind**: primitive / aggregate / named-structure の種別
//! - **TypeGraph**: 到達可能な構造体の定義を TypeId で重複排除して保持

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;

/// 固定幅の数値型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberKind {
    I8,
    I16,
    I32,
    I64,
    I128,
    Isize,
    U8,
    U16,
    U32,
    U64,
    U128,
    Usize,
    F32,
    F64,
}

impl NumberKind {
    /// Rust 側の型名（生成コードのコメントに使う）
    pub fn as_str(&self) -> &'static str {
        match self {
            NumberKind::I8 => "i8",
            NumberKind::I16 => "i16",
            NumberKind::I32 => "i32",
            NumberKind::I64 => "i64",
            NumberKind::I128 => "i128",
            NumberKind::Isize => "isize",
            NumberKind::U8 => "u8",
            NumberKind::U16 => "u16",
            NumberKind::U32 => "u32",
            NumberKind::U64 => "u64",
            NumberKind::U128 => "u128",
            NumberKind::Usize => "usize",
            NumberKind::F32 => "f32",
            NumberKind::F64 => "f64",
        }
    }
}

impl fmt::Display for NumberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 名前付き構造体への参照
///
/// `define` は構造体のフィールド定義を `TypeGraph` に登録する関数です。
/// 参照そのものはフィールドを展開しないため、自己参照する構造体でも
/// 無限再帰になりません。
#[derive(Debug, Clone, Copy)]
pub struct StructRef {
    pub name: &'static str,
    pub define: fn(&mut TypeGraph),
}

/// 型の種別
#[derive(Debug, Clone)]
pub enum TypeKind {
    Bool,
    Text,
    Number(NumberKind),
    /// `()` - 結果が存在しない場合
    Unit,
    Sequence(Box<TypeDescriptor>),
    Optional(Box<TypeDescriptor>),
    /// `Box<T>` / `Arc<T>` などのポインタ
    Pointer(Box<TypeDescriptor>),
    Struct(StructRef),
    /// チャネルやストリーム。RPC の結果としては受け付けない
    Stream(Box<TypeDescriptor>),
    /// 構造的な規則で表現できない型（override がなければ unknown になる）
    Opaque,
}

/// TypeDescriptor は 1 つのネイティブ型の記述
///
/// 同一性は `TypeId` で判定します（同じ型なら記述も同じ）。
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    pub id: TypeId,
    pub rust_name: &'static str,
    pub kind: TypeKind,
}

impl TypeDescriptor {
    pub fn of<T: 'static + ?Sized>(kind: TypeKind) -> Self {
        Self {
            id: TypeId::of::<T>(),
            rust_name: std::any::type_name::<T>(),
            kind,
        }
    }

    pub fn is_stream(&self) -> bool {
        matches!(self.kind, TypeKind::Stream(_))
    }

    /// 1 バイトの符号なし整数か（この要素のシーケンスはバイナリとして扱う）
    pub fn is_byte(&self) -> bool {
        matches!(self.kind, TypeKind::Number(NumberKind::U8))
    }

    /// 参照先の構造体名（直接・シーケンスの要素・ポインタの参照先のいずれか）
    pub fn struct_name(&self) -> Option<&'static str> {
        match &self.kind {
            TypeKind::Struct(r) => Some(r.name),
            TypeKind::Sequence(inner)
            | TypeKind::Optional(inner)
            | TypeKind::Pointer(inner)
            | TypeKind::Stream(inner) => inner.struct_name(),
            _ => None,
        }
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeDescriptor {}

/// 構造体のフィールド（宣言順を保持）
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    /// ワイヤ上の名前（rename 済み）
    pub name: &'static str,
    pub ty: TypeDescriptor,
}

/// 構造体の定義
#[derive(Debug, Clone, PartialEq)]
pub struct StructDef {
    pub id: TypeId,
    pub name: &'static str,
    pub fields: Vec<FieldDef>,
}

/// TypeGraph は到達可能な構造体定義の集合
///
/// # 不変条件
/// - 1 つの TypeId につき定義は 1 つだけ
/// - 登録順（最初に訪問した順）を保持する
#[derive(Debug, Default)]
pub struct TypeGraph {
    structs: Vec<StructDef>,
    index: HashMap<TypeId, usize>,
}

impl TypeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// 構造体の登録を開始する
    ///
    /// 既に登録済み（登録中を含む）なら `false` を返します。
    /// フィールドを展開する前にプレースホルダを置くことで、
    /// 自己参照はここで止まります。
    pub fn begin(&mut self, id: TypeId, name: &'static str) -> bool {
        if self.index.contains_key(&id) {
            return false;
        }
        self.index.insert(id, self.structs.len());
        self.structs.push(StructDef {
            id,
            name,
            fields: Vec::new(),
        });
        true
    }

    /// `begin` で置いたプレースホルダにフィールドを書き込む
    pub fn finish(&mut self, id: TypeId, fields: Vec<FieldDef>) {
        if let Some(&idx) = self.index.get(&id) {
            self.structs[idx].fields = fields;
        }
    }

    /// 記述から到達できる構造体を登録する
    pub fn queue(&mut self, ty: &TypeDescriptor) {
        match &ty.kind {
            TypeKind::Struct(r) => (r.define)(self),
            TypeKind::Sequence(inner)
            | TypeKind::Optional(inner)
            | TypeKind::Pointer(inner)
            | TypeKind::Stream(inner) => self.queue(inner),
            _ => {}
        }
    }

    pub fn get(&self, id: &TypeId) -> Option<&StructDef> {
        self.index.get(id).map(|&idx| &self.structs[idx])
    }

    pub fn structs(&self) -> &[StructDef] {
        &self.structs
    }

    pub fn len(&self) -> usize {
        self.structs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker;

    #[test]
    fn begin_is_idempotent() {
        let mut graph = TypeGraph::new();
        assert!(graph.begin(TypeId::of::<Marker>(), "Marker"));
        assert!(!graph.begin(TypeId::of::<Marker>(), "Marker"));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn finish_fills_placeholder() {
        let mut graph = TypeGraph::new();
        let id = TypeId::of::<Marker>();
        graph.begin(id, "Marker");
        graph.finish(
            id,
            vec![FieldDef {
                name: "flag",
                ty: TypeDescriptor::of::<bool>(TypeKind::Bool),
            }],
        );

        let def = graph.get(&id).unwrap();
        assert_eq!(def.name, "Marker");
        assert_eq!(def.fields.len(), 1);
        assert_eq!(def.fields[0].name, "flag");
    }

    #[test]
    fn struct_name_looks_through_containers() {
        fn noop(_: &mut TypeGraph) {}
        let inner = TypeDescriptor::of::<Marker>(TypeKind::Struct(StructRef {
            name: "Marker",
            define: noop,
        }));
        let seq = TypeDescriptor::of::<Vec<Marker>>(TypeKind::Sequence(Box::new(inner)));
        let ptr = TypeDescriptor::of::<Box<Vec<Marker>>>(TypeKind::Pointer(Box::new(seq)));
        assert_eq!(ptr.struct_name(), Some("Marker"));

        let text = TypeDescriptor::of::<String>(TypeKind::Text);
        assert_eq!(text.struct_name(), None);
    }

    #[test]
    fn descriptors_compare_by_type_identity() {
        let a = TypeDescriptor::of::<String>(TypeKind::Text);
        let b = TypeDescriptor::of::<String>(TypeKind::Opaque);
        let c = TypeDescriptor::of::<&'static str>(TypeKind::Text);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}

//! Type Projector - TypeDescriptor を TypeScript の型表記に変換する
//!
//! # 規則（優先順）
//! 1. TypeOverrides に登録された型は登録文字列をそのまま出す
//! 2. Optional は `T | null`（`mark_optional = false` なら T のみ）、ポインタは透過
//! 3. シーケンスは `T[]`、ただし 1 バイト要素のシーケンスはバイナリ配列型
//!    （ワイヤ上も CBOR の byte string になる。`typed::codec::WireShape` を参照）
//! 4. bool → `boolean`
//! 5. テキスト → `string`
//! 6. 構造体 → 宣言名での参照（定義は TypeGraph 側）
//! 7. 数値 → `number /* u32 */` のように元の幅をコメントで残す
//! 8. それ以外 → `any`
//!
//! 失敗はしません。どんな型でも何かしらの文字列を返します。

use std::any::TypeId;
use std::collections::HashMap;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde_bytes::ByteBuf;

use crate::domain::descriptor::{TypeDescriptor, TypeKind};
use crate::domain::time::UnixTime;

/// 型 → 固定文字列の置換表
#[derive(Debug, Clone, Default)]
pub struct TypeOverrides {
    table: HashMap<TypeId, String>,
}

impl TypeOverrides {
    /// 空の置換表
    pub fn new() -> Self {
        Self::default()
    }

    /// 標準の置換を登録済みの置換表
    ///
    /// - `UnixTime` → `number /* unix timestamp */`
    /// - `Bytes` / `ByteBuf` → `Uint8Array`
    /// - `DateTime<Utc>` → `string /* rfc3339 timestamp */`
    pub fn with_defaults() -> Self {
        let mut overrides = Self::new();
        overrides
            .insert::<UnixTime>("number /* unix timestamp */")
            .insert::<Bytes>("Uint8Array")
            .insert::<ByteBuf>("Uint8Array")
            .insert::<DateTime<Utc>>("string /* rfc3339 timestamp */");
        overrides
    }

    pub fn insert<T: 'static>(&mut self, projection: impl Into<String>) -> &mut Self {
        self.table.insert(TypeId::of::<T>(), projection.into());
        self
    }

    pub fn get(&self, id: &TypeId) -> Option<&str> {
        self.table.get(id).map(String::as_str)
    }

    pub fn contains(&self, id: &TypeId) -> bool {
        self.table.contains_key(id)
    }
}

/// Projector の設定
#[derive(Debug, Clone)]
pub struct ProjectorConfig {
    pub overrides: TypeOverrides,
    /// `Option<T>` を `T | null` として出すか
    pub mark_optional: bool,
    /// 1 バイト要素のシーケンスに使う型
    pub binary_type: String,
}

impl Default for ProjectorConfig {
    fn default() -> Self {
        Self {
            overrides: TypeOverrides::with_defaults(),
            mark_optional: true,
            binary_type: "Uint8Array".to_string(),
        }
    }
}

/// Projector は型表記をメモ化しながら生成する
#[derive(Debug, Default)]
pub struct Projector {
    config: ProjectorConfig,
    memo: HashMap<TypeId, String>,
}

impl Projector {
    pub fn new(config: ProjectorConfig) -> Self {
        Self {
            config,
            memo: HashMap::new(),
        }
    }

    pub fn config(&self) -> &ProjectorConfig {
        &self.config
    }

    /// 型が override で置き換えられるか
    pub fn is_overridden(&self, id: &TypeId) -> bool {
        self.config.overrides.contains(id)
    }

    /// 型表記を返す（同じ型には常に同じ文字列）
    pub fn project(&mut self, ty: &TypeDescriptor) -> String {
        if let Some(hit) = self.memo.get(&ty.id) {
            return hit.clone();
        }
        let text = self.render(ty);
        self.memo.insert(ty.id, text.clone());
        text
    }

    fn render(&mut self, ty: &TypeDescriptor) -> String {
        if let Some(text) = self.config.overrides.get(&ty.id) {
            return text.to_string();
        }

        match &ty.kind {
            TypeKind::Optional(inner) => {
                let inner = self.project(inner);
                if self.config.mark_optional {
                    format!("{inner} | null")
                } else {
                    inner
                }
            }
            TypeKind::Pointer(inner) => self.project(inner),
            TypeKind::Sequence(inner) => {
                if inner.is_byte() && !self.config.overrides.contains(&inner.id) {
                    return self.config.binary_type.clone();
                }
                let element = self.project(inner);
                if element.contains(" | ") {
                    format!("({element})[]")
                } else {
                    format!("{element}[]")
                }
            }
            TypeKind::Bool => "boolean".to_string(),
            TypeKind::Text => "string".to_string(),
            TypeKind::Struct(r) => r.name.to_string(),
            TypeKind::Number(kind) => format!("number /* {kind} */"),
            TypeKind::Unit => "null".to_string(),
            TypeKind::Stream(_) | TypeKind::Opaque => "any".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typed::Describe;
    use rstest::rstest;
    use std::collections::HashMap as Map;
    use std::sync::Arc;

    #[derive(serde::Serialize, Describe)]
    struct Person {
        name: String,
    }

    fn project(ty: TypeDescriptor) -> String {
        Projector::new(ProjectorConfig::default()).project(&ty)
    }

    #[rstest]
    #[case::boolean(bool::descriptor(), "boolean")]
    #[case::text(String::descriptor(), "string")]
    #[case::float(f32::descriptor(), "number /* f32 */")]
    #[case::signed(i64::descriptor(), "number /* i64 */")]
    #[case::unit(<()>::descriptor(), "null")]
    #[case::structure(Person::descriptor(), "Person")]
    #[case::array(<Vec<String>>::descriptor(), "string[]")]
    #[case::nested_array(<Vec<Vec<bool>>>::descriptor(), "boolean[][]")]
    #[case::array_of_structs(<Vec<Person>>::descriptor(), "Person[]")]
    #[case::bytes_vec(<Vec<u8>>::descriptor(), "Uint8Array")]
    #[case::bytes_vec_in_array(<Vec<Vec<u8>>>::descriptor(), "Uint8Array[]")]
    #[case::bytes_buffer(Bytes::descriptor(), "Uint8Array")]
    #[case::byte_buf(ByteBuf::descriptor(), "Uint8Array")]
    #[case::optional(<Option<String>>::descriptor(), "string | null")]
    #[case::array_of_optional(<Vec<Option<u16>>>::descriptor(), "(number /* u16 */ | null)[]")]
    #[case::pointer(<Box<Person>>::descriptor(), "Person")]
    #[case::shared_pointer(<Arc<Vec<u8>>>::descriptor(), "Uint8Array")]
    #[case::unix_time(UnixTime::descriptor(), "number /* unix timestamp */")]
    #[case::map(<Map<String, u32>>::descriptor(), "any")]
    #[case::json(serde_json::Value::descriptor(), "any")]
    fn default_projection(#[case] ty: TypeDescriptor, #[case] expected: &str) {
        assert_eq!(project(ty), expected);
    }

    #[test]
    fn optional_marker_can_be_turned_off() {
        let mut projector = Projector::new(ProjectorConfig {
            mark_optional: false,
            ..ProjectorConfig::default()
        });
        assert_eq!(projector.project(&<Option<Box<Person>>>::descriptor()), "Person");
    }

    #[test]
    fn override_wins_over_structure() {
        let mut config = ProjectorConfig::default();
        config.overrides.insert::<Person>("string /* person id */");
        let mut projector = Projector::new(config);

        assert_eq!(
            projector.project(&<Vec<Person>>::descriptor()),
            "string /* person id */[]"
        );
        assert!(projector.is_overridden(&TypeId::of::<Person>()));
    }

    #[test]
    fn projection_is_idempotent() {
        let mut projector = Projector::new(ProjectorConfig::default());
        let ty = <Vec<Option<Person>>>::descriptor();
        let first = projector.project(&ty);
        let second = projector.project(&ty);
        assert_eq!(first, second);
        assert_eq!(first, "(Person | null)[]");
    }

    #[test]
    fn empty_overrides_leave_bytes_opaque() {
        let mut projector = Projector::new(ProjectorConfig {
            overrides: TypeOverrides::new(),
            ..ProjectorConfig::default()
        });
        assert_eq!(projector.project(&Bytes::descriptor()), "any");
        assert_eq!(projector.project(&<Vec<u8>>::descriptor()), "Uint8Array");
    }
}

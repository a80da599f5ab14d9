//! Validate trait - 引数構造体の宣言的な検証
//!
//! フィールドごとに規則（required / 長さ / 範囲 / パターン）を宣言し、
//! 違反したフィールドごとに 1 メッセージを集約します。
//! 規則を宣言しない型は常に成功します。
//!
//! # 使用例
//! ```ignore
//! impl Validate for EchoRequest {
//!     fn rules(rules: &mut Rules<'_, Self>) {
//!         rules.field("message", |r| &r.message).required().max_len(200);
//!     }
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde_bytes::ByteBuf;

use crate::domain::errors::ValidationErrors;
use crate::domain::time::UnixTime;

/// Validate は引数の構造的な検証を行う
pub trait Validate {
    /// フィールド規則を宣言する（デフォルトは規則なし）
    fn rules(_rules: &mut Rules<'_, Self>)
    where
        Self: Sized,
    {
    }

    fn validate(&self) -> Result<(), ValidationErrors>
    where
        Self: Sized,
    {
        let mut rules = Rules::new(self);
        Self::rules(&mut rules);
        rules.finish()
    }
}

/// Rules は 1 インスタンスに対する規則の評価結果を集める
pub struct Rules<'a, T> {
    value: &'a T,
    errors: ValidationErrors,
}

impl<'a, T> Rules<'a, T> {
    pub fn new(value: &'a T) -> Self {
        Self {
            value,
            errors: ValidationErrors::new(),
        }
    }

    /// フィールドを選択して規則をつなげる
    pub fn field<'r, V: FieldValue + ?Sized>(
        &'r mut self,
        name: &'static str,
        get: impl FnOnce(&'a T) -> &'a V,
    ) -> FieldCheck<'r, 'a, V> {
        FieldCheck {
            name,
            value: get(self.value),
            errors: &mut self.errors,
            failed: false,
        }
    }

    pub fn finish(self) -> Result<(), ValidationErrors> {
        self.errors.into_result()
    }
}

/// FieldCheck は 1 フィールドに対する規則のチェーン
///
/// 最初に違反した規則だけを報告し、以降の規則は評価しません。
pub struct FieldCheck<'r, 'a, V: ?Sized> {
    name: &'static str,
    value: &'a V,
    errors: &'r mut ValidationErrors,
    failed: bool,
}

impl<V: FieldValue + ?Sized> FieldCheck<'_, '_, V> {
    fn check(&mut self, ok: bool, message: impl FnOnce(&str) -> String) {
        if self.failed || ok {
            return;
        }
        self.failed = true;
        self.errors.push(self.name, message(self.name));
    }

    /// ゼロ値（空文字列、0、false、None、空の Vec）を拒否
    pub fn required(mut self) -> Self {
        let ok = self.value.is_present();
        self.check(ok, |name| format!("{name} is a required field"));
        self
    }

    pub fn min_len(mut self, min: usize) -> Self {
        let ok = self.value.length().is_none_or(|len| len >= min);
        let unit = self.value.length_unit();
        self.check(ok, |name| {
            format!("{name} must be at least {min} {unit} in length")
        });
        self
    }

    pub fn max_len(mut self, max: usize) -> Self {
        let ok = self.value.length().is_none_or(|len| len <= max);
        let unit = self.value.length_unit();
        self.check(ok, |name| {
            format!("{name} must be a maximum of {max} {unit} in length")
        });
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        let ok = self.value.as_number().is_none_or(|n| n >= min);
        self.check(ok, |name| format!("{name} must be {min} or greater"));
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        let ok = self.value.as_number().is_none_or(|n| n <= max);
        self.check(ok, |name| format!("{name} must be {max} or less"));
        self
    }

    pub fn range(self, min: f64, max: f64) -> Self {
        self.min(min).max(max)
    }

    /// テキストが正規表現に一致すること
    pub fn pattern(mut self, re: &Regex) -> Self {
        let ok = self.value.as_text().is_none_or(|s| re.is_match(s));
        self.check(ok, |name| {
            format!("{name} must match the pattern {}", re.as_str())
        });
        self
    }

    /// 任意の述語
    pub fn custom(mut self, ok: impl FnOnce(&V) -> bool, message: &str) -> Self {
        let ok = self.failed || ok(self.value);
        self.check(ok, |name| format!("{name} {message}"));
        self
    }
}

/// FieldValue は規則が参照するフィールド値の性質
///
/// `Option<T>` は `None` のとき `required` 以外の規則を素通りします。
pub trait FieldValue {
    fn is_present(&self) -> bool;

    fn length(&self) -> Option<usize> {
        None
    }

    fn length_unit(&self) -> &'static str {
        "items"
    }

    fn as_number(&self) -> Option<f64> {
        None
    }

    fn as_text(&self) -> Option<&str> {
        None
    }
}

impl FieldValue for str {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }

    fn length(&self) -> Option<usize> {
        Some(self.chars().count())
    }

    fn length_unit(&self) -> &'static str {
        "characters"
    }

    fn as_text(&self) -> Option<&str> {
        Some(self)
    }
}

impl FieldValue for String {
    fn is_present(&self) -> bool {
        self.as_str().is_present()
    }

    fn length(&self) -> Option<usize> {
        self.as_str().length()
    }

    fn length_unit(&self) -> &'static str {
        "characters"
    }

    fn as_text(&self) -> Option<&str> {
        Some(self)
    }
}

impl FieldValue for bool {
    fn is_present(&self) -> bool {
        *self
    }
}

macro_rules! number_field_value {
    ($($ty:ty),*) => {
        $(
            impl FieldValue for $ty {
                fn is_present(&self) -> bool {
                    *self != (0 as $ty)
                }

                fn as_number(&self) -> Option<f64> {
                    Some(*self as f64)
                }
            }
        )*
    };
}

number_field_value!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl<T> FieldValue for Vec<T> {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }

    fn length(&self) -> Option<usize> {
        Some(self.len())
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn is_present(&self) -> bool {
        self.is_some()
    }

    fn length(&self) -> Option<usize> {
        self.as_ref().and_then(FieldValue::length)
    }

    fn length_unit(&self) -> &'static str {
        self.as_ref().map_or("items", FieldValue::length_unit)
    }

    fn as_number(&self) -> Option<f64> {
        self.as_ref().and_then(FieldValue::as_number)
    }

    fn as_text(&self) -> Option<&str> {
        self.as_ref().and_then(FieldValue::as_text)
    }
}

impl<T: FieldValue + ?Sized> FieldValue for Box<T> {
    fn is_present(&self) -> bool {
        (**self).is_present()
    }

    fn length(&self) -> Option<usize> {
        (**self).length()
    }

    fn length_unit(&self) -> &'static str {
        (**self).length_unit()
    }

    fn as_number(&self) -> Option<f64> {
        (**self).as_number()
    }

    fn as_text(&self) -> Option<&str> {
        (**self).as_text()
    }
}

macro_rules! byte_field {
    ($($ty:ty),*) => {
        $(
            impl FieldValue for $ty {
                fn is_present(&self) -> bool {
                    !self.is_empty()
                }

                fn length(&self) -> Option<usize> {
                    Some(self.len())
                }

                fn length_unit(&self) -> &'static str {
                    "bytes"
                }
            }
        )*
    };
}

byte_field!(Bytes, ByteBuf);

// ========================================
// 規則を持たない型
// ========================================

macro_rules! no_rules {
    ($($ty:ty),* $(,)?) => {
        $(impl Validate for $ty {})*
    };
}

no_rules!(
    bool, char, String, (), i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32,
    f64, Bytes, ByteBuf, UnixTime, serde_json::Value,
);

impl Validate for DateTime<Utc> {}
impl<T> Validate for Vec<T> {}
impl<T> Validate for Option<T> {}
impl<T> Validate for Box<T> {}
impl<T> Validate for Arc<T> {}
impl<T> Validate for Rc<T> {}
impl<K, V, S> Validate for HashMap<K, V, S> {}
impl<K, V> Validate for BTreeMap<K, V> {}

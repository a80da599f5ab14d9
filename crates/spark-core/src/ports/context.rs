//! RequestContext - リクエストごとのコンテキスト
//!
//! HTTP 層から渡される不透明な値で、ワイヤにはシリアライズされません。
//! Handler は認証情報などをヘッダから読むために使います。

use std::collections::HashMap;

use ulid::Ulid;

/// RequestContext は bind 済みメソッドに毎回渡されるコンテキスト
///
/// データを所有する `Clone` な値なので、Handler の Future が await をまたいで保持できます。
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: Ulid,
    method: String,
    headers: HashMap<String, String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self {
            request_id: Ulid::new(),
            method: String::new(),
            headers: HashMap::new(),
        }
    }

    /// ヘッダ名は小文字に正規化して保持
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Dispatcher が呼び出し先のメソッド名を設定する
    pub fn for_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    #[inline]
    pub fn request_id(&self) -> Ulid {
        self.request_id
    }

    /// 呼び出されたメソッド名（Dispatcher を通る前は空）
    #[inline]
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

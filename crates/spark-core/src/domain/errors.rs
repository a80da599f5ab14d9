//! Errors - エラー型と分類
//!
//! # 分類
//! - **Rejection**: Signature Validator の不合格理由（致命的ではない、警告して skip）
//! - **RpcError**: リクエスト単位の失敗（Decode / Validation / Handler / Encode）
//! - **BindError**: 起動時の致命的エラー（名前の重複など）
//!
//! 型生成のフォールバック（ProjectionFallback）はエラーではなく、
//! `any` に落とすだけなのでここには現れません。

use std::fmt;

use thiserror::Error;

/// Rejection はメソッドが RPC の形をしていない理由
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("takes {0} parameters, expected 2 or 3 (receiver, context[, argument])")]
    Arity(usize),

    #[error("first parameter is not the handler receiver")]
    MissingReceiver,

    #[error("second parameter is not a request context")]
    MissingContext,

    #[error("third parameter is not a serializable argument")]
    ArgumentNotValue,

    #[error("returns {0} values, expected 2 (result, failure)")]
    OutputCount(usize),

    #[error("first return value is not a serializable result")]
    ResultNotValue,

    #[error("second return value is not a failure indicator")]
    MissingFailure,

    #[error("result of kind stream is not supported")]
    StreamResult,
}

/// FieldError は 1 フィールドの検証失敗
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// ValidationErrors は違反したフィールドごとに 1 メッセージを集約
///
/// Display は各メッセージを改行で連結します（Failure レスポンスのボディになる）。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// 空なら `Ok(())`
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.errors.iter().map(|e| e.message.as_str()).collect();
        f.write_str(&messages.join("\n"))
    }
}

impl std::error::Error for ValidationErrors {}

/// RpcError はリクエスト単位の失敗
///
/// Display がそのまま Failure レスポンスのボディになります。
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("failed to decode argument: {0}")]
    Decode(String),

    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    /// Handler 自身が返したエラー（メッセージはそのまま）
    #[error("{0}")]
    Handler(String),

    #[error("failed to encode result: {0}")]
    Encode(String),
}

impl RpcError {
    /// ログ用の分類名
    pub fn kind(&self) -> &'static str {
        match self {
            RpcError::Decode(_) => "decode",
            RpcError::Validation(_) => "validation",
            RpcError::Handler(_) => "handler",
            RpcError::Encode(_) => "encode",
        }
    }
}

/// BindError は起動時の致命的エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("method '{0}' is registered more than once")]
    DuplicateMethod(String),

    #[error("method name '{0}' cannot be used as a path segment")]
    InvalidName(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_join_with_newline() {
        let mut errors = ValidationErrors::new();
        errors.push("message", "message is a required field");
        errors.push("count", "count must be 1 or greater");

        assert_eq!(
            errors.to_string(),
            "message is a required field\ncount must be 1 or greater"
        );
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn empty_validation_errors_are_ok() {
        assert!(ValidationErrors::new().into_result().is_ok());
    }

    #[test]
    fn handler_error_is_verbatim() {
        let err = RpcError::Handler("error: x".to_string());
        assert_eq!(err.to_string(), "error: x");
        assert_eq!(err.kind(), "handler");
    }

    #[test]
    fn validation_error_is_verbatim() {
        let mut errors = ValidationErrors::new();
        errors.push("message", "message is a required field");
        let err = RpcError::from(errors);
        assert_eq!(err.to_string(), "message is a required field");
    }
}

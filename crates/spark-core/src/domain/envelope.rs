//! WireEnvelope - リクエスト/レスポンスのバイナリ規約
//!
//! - request: 引数の CBOR エンコード（引数なしなら空）
//! - success: 200 + `content-type: application/cbor` + 結果の CBOR エンコード
//! - failure: 400 + `rpc-failed: 1` + UTF-8 のメッセージ

use bytes::Bytes;

/// 成功レスポンスの content type
pub const CBOR_CONTENT_TYPE: &str = "application/cbor";

/// RPC レベルの失敗を示すヘッダ（transport の 400 と区別する）
pub const RPC_FAILED_HEADER: &str = "rpc-failed";

/// `RPC_FAILED_HEADER` に入る固定値
pub const RPC_FAILED_MARKER: &str = "1";

pub const STATUS_OK: u16 = 200;
pub const STATUS_FAILED: u16 = 400;

/// Reply は 1 リクエストに対するレスポンス
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// エンコード済みの結果
    Success(Bytes),
    /// 人間が読めるメッセージ（バイナリペイロードなし）
    Failure(String),
}

impl Reply {
    pub fn failure(message: impl Into<String>) -> Self {
        Reply::Failure(message.into())
    }

    pub fn status(&self) -> u16 {
        match self {
            Reply::Success(_) => STATUS_OK,
            Reply::Failure(_) => STATUS_FAILED,
        }
    }

    /// レスポンスに付けるヘッダ
    pub fn header(&self) -> (&'static str, &'static str) {
        match self {
            Reply::Success(_) => ("content-type", CBOR_CONTENT_TYPE),
            Reply::Failure(_) => (RPC_FAILED_HEADER, RPC_FAILED_MARKER),
        }
    }

    /// レスポンスボディ
    pub fn into_body(self) -> Bytes {
        match self {
            Reply::Success(bytes) => bytes,
            Reply::Failure(message) => Bytes::from(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_declares_binary_content() {
        let reply = Reply::Success(Bytes::from_static(&[0xa0]));
        assert_eq!(reply.status(), 200);
        assert_eq!(reply.header(), ("content-type", "application/cbor"));
        assert_eq!(reply.into_body(), Bytes::from_static(&[0xa0]));
    }

    #[test]
    fn failure_sets_marker_header() {
        let reply = Reply::failure("error: x");
        assert_eq!(reply.status(), 400);
        assert_eq!(reply.header(), ("rpc-failed", "1"));
        assert_eq!(reply.into_body(), Bytes::from("error: x"));
    }
}

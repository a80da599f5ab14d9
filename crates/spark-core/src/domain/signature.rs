//! Signature - RPC メソッド候補の形
//!
//! `MethodSet::method` は関数の型から Signature を自動で組み立てます。
//! `MethodSet::raw` で登録する場合は呼び出し側が明示します。
//! どちらの場合も `app::signature_check` が同じ規則で検査します。

use super::descriptor::TypeDescriptor;

/// 許可されるメソッドの形（警告ログに出す）
pub const ALLOWED_SHAPE: &str =
    "fn(self: Arc<Self>, ctx: RequestContext[, arg: impl Deserialize]) -> Result<impl Serialize, impl Display>";

/// 入力パラメータ
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// HandlerObject 自身（暗黙のレシーバ）
    Receiver,
    /// リクエストごとのコンテキスト（シリアライズされない）
    Context,
    /// シリアライズ可能な値
    Value(TypeDescriptor),
}

/// 戻り値
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Value(TypeDescriptor),
    /// 失敗インジケータ（空か、エラーを持つ）
    Failure,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Signature {
    pub inputs: Vec<Input>,
    pub outputs: Vec<Output>,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn receiver(mut self) -> Self {
        self.inputs.push(Input::Receiver);
        self
    }

    pub fn context(mut self) -> Self {
        self.inputs.push(Input::Context);
        self
    }

    pub fn param(mut self, ty: TypeDescriptor) -> Self {
        self.inputs.push(Input::Value(ty));
        self
    }

    pub fn returns(mut self, ty: TypeDescriptor) -> Self {
        self.outputs.push(Output::Value(ty));
        self
    }

    pub fn fails(mut self) -> Self {
        self.outputs.push(Output::Failure);
        self
    }
}

//! Signature Validator - メソッド候補が RPC の形をしているか判定する
//!
//! # 受理条件
//! 1. 入力は 2 個か 3 個（先頭は receiver）
//! 2. 2 番目は RequestContext
//! 3. 3 番目があればシリアライズ可能な引数（hasArgument = true）
//! 4. 出力はちょうど 2 個（結果と失敗インジケータ）
//! 5. 結果はストリームではない
//!
//! 不合格は致命的ではありません。Binder が警告を出して次に進みます。

use crate::domain::descriptor::TypeDescriptor;
use crate::domain::errors::Rejection;
use crate::domain::signature::{Input, Output, Signature};

/// Accepted は受理されたメソッドの形
#[derive(Debug, Clone, PartialEq)]
pub struct Accepted {
    pub argument: Option<TypeDescriptor>,
    pub result: TypeDescriptor,
}

impl Accepted {
    pub fn has_argument(&self) -> bool {
        self.argument.is_some()
    }
}

/// Signature を検査して受理/不合格を返す
pub fn check_signature(signature: &Signature) -> Result<Accepted, Rejection> {
    let inputs = &signature.inputs;
    if !(2..=3).contains(&inputs.len()) {
        return Err(Rejection::Arity(inputs.len()));
    }
    if inputs[0] != Input::Receiver {
        return Err(Rejection::MissingReceiver);
    }
    if inputs[1] != Input::Context {
        return Err(Rejection::MissingContext);
    }
    let argument = match inputs.get(2) {
        None => None,
        Some(Input::Value(ty)) => Some(ty.clone()),
        Some(_) => return Err(Rejection::ArgumentNotValue),
    };

    let outputs = &signature.outputs;
    if outputs.len() != 2 {
        return Err(Rejection::OutputCount(outputs.len()));
    }
    let Output::Value(result) = &outputs[0] else {
        return Err(Rejection::ResultNotValue);
    };
    if outputs[1] != Output::Failure {
        return Err(Rejection::MissingFailure);
    }
    if result.is_stream() {
        return Err(Rejection::StreamResult);
    }

    Ok(Accepted {
        argument,
        result: result.clone(),
    })
}

//! MethodBinding - 検証済みの RPC 操作 1 件の記述

use super::descriptor::TypeDescriptor;

/// MethodBinding は Binder が 1 回のパスで生成し、以後は不変
///
/// `name` はそのままワイヤ上のパスセグメントになります（HandlerObject 内で一意）。
#[derive(Debug, Clone, PartialEq)]
pub struct MethodBinding {
    pub name: String,
    pub has_argument: bool,
    pub argument: Option<TypeDescriptor>,
    pub result: TypeDescriptor,
}

impl MethodBinding {
    /// `<prefix>/<name>` 形式のパス
    pub fn path(&self, prefix: &str) -> String {
        format!("{}/{}", prefix.trim_end_matches('/'), self.name)
    }
}

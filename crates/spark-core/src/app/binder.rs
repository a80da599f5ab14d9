//! Method Binder - メソッド集合から MethodBinding の一覧を作る
//!
//! # フロー（1 パスのみ）
//! 1. `Service::methods` の登録順にメソッド候補を列挙
//! 2. 名前を検査（空、`/` を含む、重複は致命的エラー）
//! 3. Signature Validator にかける（不合格は warn して skip）
//! 4. 引数型と結果型から到達できる構造体を TypeGraph に登録
//! 5. MethodBinding と呼び出し口の組を出力

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, warn};

use super::signature_check::check_signature;
use crate::domain::binding::MethodBinding;
use crate::domain::descriptor::TypeGraph;
use crate::domain::errors::BindError;
use crate::domain::signature::ALLOWED_SHAPE;
use crate::typed::handler::DynMethod;
use crate::typed::registry::{MethodSet, Service};

/// BoundMethod は binding とその呼び出し口
pub struct BoundMethod<H: Send + Sync + 'static> {
    pub binding: MethodBinding,
    pub invoker: Arc<dyn DynMethod<H>>,
}

/// Bound は 1 回の bind の結果
pub struct Bound<H: Send + Sync + 'static> {
    pub methods: Vec<BoundMethod<H>>,
    pub graph: TypeGraph,
    /// Signature 不合格で読み飛ばしたメソッド名
    pub skipped: Vec<String>,
}

impl<H: Send + Sync + 'static> Bound<H> {
    pub fn bindings(&self) -> Vec<MethodBinding> {
        self.methods.iter().map(|m| m.binding.clone()).collect()
    }
}

/// `H::methods` を列挙して bind する
pub fn bind<H: Service>() -> Result<Bound<H>, BindError> {
    bind_set(MethodSet::<H>::collect())
}

/// 登録済みの MethodSet を bind する
pub fn bind_set<H: Send + Sync + 'static>(set: MethodSet<H>) -> Result<Bound<H>, BindError> {
    let mut seen = HashSet::new();
    let mut methods = Vec::new();
    let mut skipped = Vec::new();
    let mut graph = TypeGraph::new();

    for entry in set.into_entries() {
        if entry.name.is_empty() || entry.name.contains('/') {
            return Err(BindError::InvalidName(entry.name));
        }
        if !seen.insert(entry.name.clone()) {
            return Err(BindError::DuplicateMethod(entry.name));
        }

        let accepted = match check_signature(&entry.signature) {
            Ok(accepted) => accepted,
            Err(reason) => {
                warn!(
                    method = %entry.name,
                    %reason,
                    expected = ALLOWED_SHAPE,
                    "RPC method is not in the expected format, skipping"
                );
                skipped.push(entry.name);
                continue;
            }
        };

        if let Some(argument) = &accepted.argument {
            graph.queue(argument);
        }
        graph.queue(&accepted.result);

        info!(
            method = %entry.name,
            has_argument = accepted.has_argument(),
            result = accepted.result.rust_name,
            "bound RPC method"
        );

        methods.push(BoundMethod {
            binding: MethodBinding {
                name: entry.name,
                has_argument: accepted.has_argument(),
                argument: accepted.argument,
                result: accepted.result,
            },
            invoker: entry.invoker,
        });
    }

    info!(
        methods = methods.len(),
        skipped = skipped.len(),
        structs = graph.len(),
        "binding complete"
    );

    Ok(Bound {
        methods,
        graph,
        skipped,
    })
}

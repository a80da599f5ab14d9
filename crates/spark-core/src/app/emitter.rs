//! Interface Emitter - クライアント用の TypeScript 型定義を生成する
//!
//! # 出力順
//! 1. ヘッダ行
//! 2. binding から到達できる構造体ごとに `export interface`（登録順、フィールドは宣言順）。
//!    override された型の先にしかない構造体は宣言しない
//! 3. binding を登録順に並べたサービスのインターフェース
//!
//! ```text
//! // AUTOMATICALLY GENERATED - DO NOT EDIT
//!
//! export interface EchoRequest {
//!     "message": string;
//! }
//!
//! /// RPC Generated
//! export interface App {
//!     Example(arg0: EchoRequest): Promise<EchoResponse>
//! }
//! ```

use std::collections::HashSet;
use std::fmt::Write;

use super::projector::Projector;
use crate::domain::binding::MethodBinding;
use crate::domain::descriptor::{StructDef, TypeDescriptor, TypeGraph, TypeKind};

pub const GENERATED_HEADER: &str = "// AUTOMATICALLY GENERATED - DO NOT EDIT";

const INDENT: &str = "\t";

/// 型定義ファイル全体を生成する
pub fn emit(
    service: &str,
    bindings: &[MethodBinding],
    graph: &TypeGraph,
    projector: &mut Projector,
) -> String {
    let mut out = String::new();
    out.push_str(GENERATED_HEADER);
    out.push_str("\n\n");

    for def in declared_structs(bindings, graph, projector) {
        out.push_str(&declare_struct(def, projector));
    }

    out.push_str("\n/// RPC Generated\n");
    let _ = writeln!(out, "export interface {service} {{");
    for binding in bindings {
        out.push_str(&declare_method(binding, projector));
    }
    out.push_str("}\n");
    out
}

/// override を通らずに binding から到達できる構造体（TypeGraph の登録順）
fn declared_structs<'g>(
    bindings: &[MethodBinding],
    graph: &'g TypeGraph,
    projector: &Projector,
) -> Vec<&'g StructDef> {
    let mut reachable = HashSet::new();
    let mut pending: Vec<&TypeDescriptor> = bindings
        .iter()
        .flat_map(|b| b.argument.iter().chain([&b.result]))
        .collect();

    while let Some(ty) = pending.pop() {
        if projector.is_overridden(&ty.id) {
            continue;
        }
        match &ty.kind {
            TypeKind::Struct(_) => {
                if !reachable.insert(ty.id) {
                    continue;
                }
                if let Some(def) = graph.get(&ty.id) {
                    pending.extend(def.fields.iter().map(|f| &f.ty));
                }
            }
            TypeKind::Sequence(inner)
            | TypeKind::Optional(inner)
            | TypeKind::Pointer(inner)
            | TypeKind::Stream(inner) => pending.push(inner),
            _ => {}
        }
    }

    graph
        .structs()
        .iter()
        .filter(|def| reachable.contains(&def.id))
        .collect()
}

/// 構造体 1 件の `export interface`
pub fn declare_struct(def: &StructDef, projector: &mut Projector) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "export interface {} {{", def.name);
    for field in &def.fields {
        let ty = projector.project(&field.ty);
        let _ = writeln!(out, "{INDENT}\"{}\": {ty};", field.name);
    }
    out.push_str("}\n");
    out
}

/// サービスのメソッド 1 件（引数は 0 個か 1 個）
pub fn declare_method(binding: &MethodBinding, projector: &mut Projector) -> String {
    let argument = match &binding.argument {
        Some(ty) => format!("arg0: {}", projector.project(ty)),
        None => String::new(),
    };
    let result = projector.project(&binding.result);
    format!("{INDENT}{}({argument}): Promise<{result}>\n", binding.name)
}

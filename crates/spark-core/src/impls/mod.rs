//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **AxumRoutes**: axum::Router に POST ルートを載せる（本番用）
//! - **MemoryRoutes**: プロセス内で直接呼ぶ（テスト・ツール用）

pub mod axum_routes;
pub mod memory_routes;

// 主要な型を再エクスポート
pub use self::axum_routes::AxumRoutes;
pub use self::memory_routes::MemoryRoutes;

//! テスト判定ロジック
//!
//! エンドポイントのプレースホルダ解決とレスポンス判定（いずれも純粋関数）

pub mod evaluator;
pub mod resolver;

pub use evaluator::{evaluate, EvalError};
pub use resolver::fill_placeholders;

//! App - アプリケーション層
//!
//! # 主要コンポーネント
//! - **DispatcherBuilder**: Dispatcher の構築と起動時検証

pub mod builder;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, DispatcherBuilder};

//! Typed - 型付きハンドラ API
//!
//! ハンドラのパラメータ型から役割を決め、登録時に BindingPlan を作ります。
//!
//! # 二層構造
//! - **表層（Typed）**: `Handler<Args>`, `Param<Role>` - 型安全
//! - **内部（Dyn）**: `DynHandler` - object-safe, type erasure

pub mod param;
pub mod plan;
pub mod handler;
pub mod registry;

// 主要な trait/型 を再エクスポート
pub use self::param::{CancellationRole, MessageRole, Param, ServiceRole};
pub use self::plan::{Argument, Arguments, BindingPlan, Slot};
pub use self::handler::{Handler, HandlerOutput};
pub use self::registry::{BoundHandler, DispatchTable};

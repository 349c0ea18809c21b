//! courier-core
//!
//! 型で引く in-process message dispatcher.
//!
//! # モジュール構成
//! - **message**: Message マーカーと MessageType
//! - **cancel**: dispatch ごとのキャンセルシグナル
//! - **resolver**: 依存解決のポート（ServiceResolver）と最小実装
//! - **typed**: パラメータ分類、BindingPlan、Handler trait、DispatchTable
//! - **dispatcher**: register / dispatch の入口
//! - **app**: DispatcherBuilder（起動時検証）
//! - **settings**: DispatcherConfig
//! - **error**: エラー型

pub mod app;
pub mod cancel;
pub mod dispatcher;
pub mod error;
pub mod message;
pub mod resolver;
pub mod settings;
pub mod typed;

pub use app::{BuildError, DispatcherBuilder};
pub use cancel::{CancellationSource, CancellationToken};
pub use dispatcher::Dispatcher;
pub use error::{BoxError, ConfigError, DispatchError, RegisterError, ResolveError};
pub use message::{Message, MessageType};
pub use resolver::{Instance, ServiceRegistry, ServiceResolver, ServiceType};
pub use settings::{DispatcherConfig, DuplicatePolicy};
pub use typed::{BindingPlan, Handler, Slot};

use thiserror::Error;

use crate::message::MessageType;
use crate::resolver::ServiceType;
use crate::typed::Slot;

/// ハンドラ本体が返すエラーの共通表現
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 登録時のエラー。返ったときテーブルは変更されていない。
#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("handler {handler} has no message parameter")]
    NoMessageParameter { handler: &'static str },

    #[error("handler {handler} declares more than one message parameter (positions {positions:?})")]
    MultipleMessageParameters {
        handler: &'static str,
        positions: Vec<usize>,
    },

    #[error("duplicate handler for message type {0}")]
    DuplicateHandler(MessageType),
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("handler not found for message type {0}")]
    HandlerNotFound(MessageType),

    #[error("dependency resolution failed: {0}")]
    DependencyResolutionFailed(#[source] ResolveError),

    #[error("argument {position} does not match binding {expected:?}")]
    ArgumentMismatch { position: usize, expected: Slot },

    /// ハンドラ本体のエラー。元の型に downcast できる。
    #[error("handler failed: {0}")]
    Handler(#[source] BoxError),
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no service registered for type {0}")]
    NotRegistered(ServiceType),

    #[error("service {service} is unavailable: {reason}")]
    Unavailable { service: ServiceType, reason: String },
}

impl ResolveError {
    pub fn service(&self) -> ServiceType {
        match self {
            ResolveError::NotRegistered(service) => *service,
            ResolveError::Unavailable { service, .. } => *service,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load dispatcher settings: {0}")]
    Load(#[from] config::ConfigError),
}

//! Param - パラメータ型から役割を決める
//!
//! # 学習ポイント
//! - マーカー型パラメータ（`Param<Role>`）で blanket impl の重複を避ける
//! - 役割はコンパイル時に一意に決まり、登録時に `Slot` として取り出す
//!
//! # 分類
//! - `M: Message` → `Slot::Message`
//! - `CancellationToken` → `Slot::Cancellation`
//! - `Arc<T>` → `Slot::Service(T)`（resolver から解決）

use std::any::Any;
use std::sync::Arc;

use super::plan::{Argument, Slot};
use crate::cancel::CancellationToken;
use crate::message::{Message, MessageType};
use crate::resolver::ServiceType;

/// message パラメータの役割マーカー
pub enum MessageRole {}

/// cancellation パラメータの役割マーカー
pub enum CancellationRole {}

/// 依存パラメータの役割マーカー
pub enum ServiceRole {}

/// ハンドラのパラメータとして使える型
///
/// `Role` はどの impl が選ばれたかを区別するためだけに存在します。
pub trait Param<Role>: Sized + Send + 'static {
    /// 登録時の分類結果
    fn slot() -> Slot;

    /// dispatch 時に実引数から値を取り出す。役割が合わなければ `None`。
    fn from_argument(argument: Argument) -> Option<Self>;
}

impl<M: Message> Param<MessageRole> for M {
    fn slot() -> Slot {
        Slot::Message(MessageType::of::<M>())
    }

    fn from_argument(argument: Argument) -> Option<Self> {
        match argument {
            Argument::Message(message) => message.downcast::<M>().ok().map(|m| *m),
            _ => None,
        }
    }
}

impl Param<CancellationRole> for CancellationToken {
    fn slot() -> Slot {
        Slot::Cancellation
    }

    fn from_argument(argument: Argument) -> Option<Self> {
        match argument {
            Argument::Cancellation(token) => Some(token),
            _ => None,
        }
    }
}

impl<T: Any + Send + Sync> Param<ServiceRole> for Arc<T> {
    fn slot() -> Slot {
        Slot::Service(ServiceType::of::<T>())
    }

    fn from_argument(argument: Argument) -> Option<Self> {
        match argument {
            Argument::Service(instance) => instance.downcast::<T>().ok(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ping;
    impl Message for Ping {}

    struct Logger;

    fn slot_of<P: Param<R>, R>() -> Slot {
        P::slot()
    }

    #[test]
    fn classification_follows_parameter_type() {
        assert_eq!(
            slot_of::<Ping, _>(),
            Slot::Message(MessageType::of::<Ping>())
        );
        assert_eq!(slot_of::<CancellationToken, _>(), Slot::Cancellation);
        assert_eq!(
            slot_of::<Arc<Logger>, _>(),
            Slot::Service(ServiceType::of::<Logger>())
        );
    }

    #[test]
    fn wrong_argument_kind_is_rejected() {
        let argument = Argument::Cancellation(CancellationToken::none());
        assert!(<Ping as Param<MessageRole>>::from_argument(argument).is_none());

        let argument = Argument::Message(Box::new(Ping));
        assert!(<Arc<Logger> as Param<ServiceRole>>::from_argument(argument).is_none());
    }

    #[test]
    fn service_of_wrong_concrete_type_is_rejected() {
        let argument = Argument::Service(Arc::new(Ping));
        assert!(<Arc<Logger> as Param<ServiceRole>>::from_argument(argument).is_none());
    }
}

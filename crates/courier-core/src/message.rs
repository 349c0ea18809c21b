//! Message - dispatch 対象となる値のマーカー
//!
//! # 学習ポイント
//! - Marker trait（メソッドを持たない trait）
//! - `Any` による型消去と downcast
//! - `TypeId` をキーにした型同一性

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Message は dispatch 可能な値を表すマーカー
///
/// Dispatcher は中身を見ません。具体的な型の同一性だけでハンドラを選びます。
///
/// # 使用例
/// ```ignore
/// struct PingMessage;
/// impl Message for PingMessage {}
/// ```
pub trait Message: AnyMessage {}

/// `dyn Message` を具体型に戻すための補助 trait
///
/// `T: Any + Send` すべてに blanket 実装されるので、利用者が実装する必要はありません。
pub trait AnyMessage: Any + Send {
    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send>;

    fn type_name(&self) -> &'static str;
}

impl<T: Any + Send> AnyMessage for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// MessageType は message の具体型の識別子
///
/// 等価性とハッシュは `TypeId` だけで決まります。`name` は診断用です。
#[derive(Clone, Copy)]
pub struct MessageType {
    id: TypeId,
    name: &'static str,
}

impl MessageType {
    pub fn of<M: Message>() -> Self {
        Self {
            id: TypeId::of::<M>(),
            name: std::any::type_name::<M>(),
        }
    }

    /// 実行時の具体型から MessageType を得る
    pub fn of_val(message: &dyn Message) -> Self {
        Self {
            id: Any::type_id(AnyMessage::as_any(message)),
            name: AnyMessage::type_name(message),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for MessageType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MessageType {}

impl Hash for MessageType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MessageType({})", self.name)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ping;
    impl Message for Ping {}

    struct Pong {
        _seq: u32,
    }
    impl Message for Pong {}

    #[test]
    fn runtime_type_matches_static_type() {
        let boxed: Box<dyn Message> = Box::new(Pong { _seq: 7 });
        assert_eq!(MessageType::of_val(&*boxed), MessageType::of::<Pong>());
        assert_ne!(MessageType::of_val(&*boxed), MessageType::of::<Ping>());
    }

    #[test]
    fn identity_is_the_type_id() {
        let boxed: Box<dyn Message> = Box::new(Ping);
        assert_eq!(MessageType::of_val(&*boxed).id(), TypeId::of::<Ping>());
    }

    #[test]
    fn name_is_concrete_type_name() {
        let boxed: Box<dyn Message> = Box::new(Ping);
        let message_type = MessageType::of_val(&*boxed);
        assert!(message_type.name().ends_with("Ping"));
        assert_eq!(message_type.to_string(), message_type.name());
    }

    #[test]
    fn boxed_message_downcasts_to_concrete_type() {
        let boxed: Box<dyn Message> = Box::new(Pong { _seq: 3 });
        let any = AnyMessage::into_any(boxed);
        assert!(any.downcast::<Pong>().is_ok());
    }
}

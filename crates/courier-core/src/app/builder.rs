//! DispatcherBuilder - 起動時に handler の揃い具合を確かめて Dispatcher を返す
//!
//! 登録は Dispatcher::register と同じ経路を通るので、重複時の扱いは
//! 設定の `on_duplicate` に従います。
//! `expect::<M>()` で宣言した message 型に handler が無ければ build() は失敗します。

use std::sync::Arc;

use crate::dispatcher::Dispatcher;
use crate::error::RegisterError;
use crate::message::{Message, MessageType};
use crate::resolver::ServiceResolver;
use crate::settings::DispatcherConfig;
use crate::typed::Handler;

/// DispatcherBuilder は Dispatcher を構築
///
/// # 使用例
/// ```ignore
/// let dispatcher = DispatcherBuilder::new(resolver)
///     .register(|msg: PingMessage| async move { /* ... */ })?
///     .expect::<PingMessage>()
///     .build()?;
/// ```
///
/// 不足している型はすべて `BuildError::MissingHandlers` に型名で並びます。
/// 一部だけ揃った Dispatcher は返しません。
pub struct DispatcherBuilder {
    dispatcher: Dispatcher,
    expected: Vec<MessageType>,
}

/// BuildError は Dispatcher 構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("no handler registered for expected message types: {0:?}")]
    MissingHandlers(Vec<String>),
}

impl DispatcherBuilder {
    pub fn new(resolver: Arc<dyn ServiceResolver>) -> Self {
        Self::with_config(resolver, DispatcherConfig::default())
    }

    /// 設定付きで作成。重複時の方針は登録のたびに参照されるので、ここで渡す。
    pub fn with_config(resolver: Arc<dyn ServiceResolver>, config: DispatcherConfig) -> Self {
        Self {
            dispatcher: Dispatcher::with_config(resolver, config),
            expected: Vec::new(),
        }
    }

    /// Handler を登録
    pub fn register<H, Args>(self, handler: H) -> Result<Self, RegisterError>
    where
        H: Handler<Args>,
        Args: 'static,
    {
        self.dispatcher.register(handler)?;
        Ok(self)
    }

    /// build 時に handler の存在を要求する message 型
    pub fn expect<M: Message>(mut self) -> Self {
        let message_type = MessageType::of::<M>();
        if !self.expected.contains(&message_type) {
            self.expected.push(message_type);
        }
        self
    }

    pub fn build(self) -> Result<Dispatcher, BuildError> {
        let registered = self.dispatcher.registered_types();
        let missing: Vec<String> = self
            .expected
            .iter()
            .filter(|message_type| !registered.contains(message_type))
            .map(|message_type| message_type.name().to_string())
            .collect();
        if !missing.is_empty() {
            return Err(BuildError::MissingHandlers(missing));
        }
        Ok(self.dispatcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::ServiceRegistry;
    use crate::settings::DuplicatePolicy;

    struct Ping;
    impl Message for Ping {}

    struct Pong;
    impl Message for Pong {}

    fn resolver() -> Arc<dyn ServiceResolver> {
        Arc::new(ServiceRegistry::new())
    }

    #[test]
    fn test_build_success() {
        let dispatcher = DispatcherBuilder::new(resolver())
            .register(|_: Ping| async {})
            .unwrap()
            .expect::<Ping>()
            .build();
        assert!(dispatcher.is_ok());
    }

    #[test]
    fn test_build_missing_handlers() {
        let dispatcher = DispatcherBuilder::new(resolver())
            .register(|_: Ping| async {})
            .unwrap()
            .expect::<Ping>()
            .expect::<Pong>()
            .build();
        assert!(matches!(
            dispatcher,
            Err(BuildError::MissingHandlers(missing)) if missing == vec![std::any::type_name::<Pong>().to_string()]
        ));
    }

    #[test]
    fn test_build_no_expectations() {
        let dispatcher = DispatcherBuilder::new(resolver()).build().unwrap();
        assert!(dispatcher.is_empty());
    }

    #[test]
    fn test_reject_policy_applies_to_builder() {
        let config = DispatcherConfig {
            on_duplicate: DuplicatePolicy::Reject,
        };
        let result = DispatcherBuilder::with_config(resolver(), config)
            .register(|_: Ping| async {})
            .unwrap()
            .register(|_: Ping| async {});
        assert!(matches!(result, Err(RegisterError::DuplicateHandler(_))));
    }

    #[test]
    fn test_config_reaches_the_dispatcher() {
        let config = DispatcherConfig {
            on_duplicate: DuplicatePolicy::Reject,
        };
        let dispatcher = DispatcherBuilder::with_config(resolver(), config).build().unwrap();
        assert_eq!(dispatcher.config().on_duplicate, DuplicatePolicy::Reject);

        let dispatcher = DispatcherBuilder::new(resolver()).build().unwrap();
        assert_eq!(dispatcher.config(), &DispatcherConfig::default());
    }
}

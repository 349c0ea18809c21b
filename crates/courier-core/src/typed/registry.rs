//! DispatchTable - message 型から bound handler への対応表
//!
//! # 学習ポイント
//! - HashMap での型消去された trait object の管理
//! - RwLock と Arc による「読み取りは並行、書き込みは排他」
//! - lock を await の前に手放す（Arc を clone して外へ出す）

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::handler::{DynHandler, Handler, TypedHandler};
use super::plan::BindingPlan;
use crate::cancel::CancellationToken;
use crate::error::{DispatchError, RegisterError};
use crate::message::MessageType;
use crate::resolver::ServiceResolver;

/// BoundHandler はハンドラ本体と、その BindingPlan の組
///
/// ハンドラがキャプチャした状態（receiver）はこの値が所有します。
pub struct BoundHandler {
    name: &'static str,
    plan: BindingPlan,
    handler: Box<dyn DynHandler>,
}

impl BoundHandler {
    /// パラメータを分類して plan を作る。登録時に一度だけ呼ばれる。
    pub fn new<H, Args>(handler: H) -> Result<Self, RegisterError>
    where
        H: Handler<Args>,
        Args: 'static,
    {
        let name = std::any::type_name::<H>();
        let plan = BindingPlan::build(name, H::slots())?;
        Ok(Self {
            name,
            plan,
            handler: Box::new(TypedHandler::new(handler)),
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn plan(&self) -> &BindingPlan {
        &self.plan
    }

    pub fn message_type(&self) -> MessageType {
        self.plan.message_type()
    }

    pub(crate) async fn invoke(
        &self,
        message: Box<dyn Any + Send>,
        cancellation: &CancellationToken,
        resolver: &dyn ServiceResolver,
    ) -> Result<(), DispatchError> {
        let arguments = self.plan.bind(message, cancellation, resolver)?;
        self.handler.handle_dyn(arguments).await
    }
}

/// DispatchTable は message 型ごとに最大 1 つの BoundHandler を持つ
///
/// # 設計
/// - `put` は黙って上書き（last write wins）
/// - `get` は Arc を clone して返すので、呼び出し側は lock を保持しない
#[derive(Default)]
pub struct DispatchTable {
    entries: RwLock<HashMap<MessageType, Arc<BoundHandler>>>,
}

impl DispatchTable {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// 登録または置き換え。置き換えた場合は以前の handler を返す。
    pub fn put(&self, bound: BoundHandler) -> Option<Arc<BoundHandler>> {
        let message_type = bound.message_type();
        self.entries.write().insert(message_type, Arc::new(bound))
    }

    /// 未登録のときだけ登録する
    pub fn put_new(&self, bound: BoundHandler) -> Result<(), RegisterError> {
        let message_type = bound.message_type();
        let mut entries = self.entries.write();
        if entries.contains_key(&message_type) {
            return Err(RegisterError::DuplicateHandler(message_type));
        }
        entries.insert(message_type, Arc::new(bound));
        Ok(())
    }

    pub fn get(&self, message_type: &MessageType) -> Option<Arc<BoundHandler>> {
        self.entries.read().get(message_type).cloned()
    }

    pub fn contains(&self, message_type: &MessageType) -> bool {
        self.entries.read().contains_key(message_type)
    }

    pub fn registered_types(&self) -> Vec<MessageType> {
        self.entries.read().keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;
    use crate::resolver::ServiceRegistry;

    struct Ping;
    impl Message for Ping {}

    struct Pong;
    impl Message for Pong {}

    fn bound<H: Handler<Args>, Args: 'static>(handler: H) -> BoundHandler {
        BoundHandler::new(handler).unwrap()
    }

    #[test]
    fn test_put_and_get() {
        let table = DispatchTable::new();
        assert!(table.put(bound(|_: Ping| async {})).is_none());

        let entry = table.get(&MessageType::of::<Ping>());
        assert!(entry.is_some());
        assert!(table.get(&MessageType::of::<Pong>()).is_none());
    }

    #[test]
    fn test_put_replaces_silently() {
        let table = DispatchTable::new();
        table.put(bound(|_: Ping| async {}));
        let previous = table.put(bound(|_: Ping, _: CancellationToken| async {}));

        assert!(previous.is_some());
        assert_eq!(table.len(), 1);
        let current = table.get(&MessageType::of::<Ping>()).unwrap();
        assert_eq!(current.plan().len(), 2);
    }

    #[test]
    fn test_put_new_rejects_duplicate() {
        let table = DispatchTable::new();
        table.put_new(bound(|_: Ping| async {})).unwrap();
        let result = table.put_new(bound(|_: Ping| async {}));
        assert!(matches!(
            result,
            Err(RegisterError::DuplicateHandler(t)) if t == MessageType::of::<Ping>()
        ));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_registered_types() {
        let table = DispatchTable::new();
        assert!(table.is_empty());
        table.put(bound(|_: Ping| async {}));
        table.put(bound(|_: Pong| async {}));

        let mut names: Vec<&str> = table.registered_types().iter().map(|t| t.name()).collect();
        names.sort();
        assert_eq!(names.len(), 2);
        assert!(table.contains(&MessageType::of::<Ping>()));
        assert!(table.contains(&MessageType::of::<Pong>()));
    }

    #[test]
    fn test_handler_without_message_is_not_bound() {
        let result = BoundHandler::new(|_: CancellationToken| async {});
        assert!(matches!(result, Err(RegisterError::NoMessageParameter { .. })));
    }

    #[tokio::test]
    async fn test_invoke_runs_handler() {
        let entry = bound(|_: Ping| async { Ok::<(), std::io::Error>(()) });
        entry
            .invoke(Box::new(Ping), &CancellationToken::none(), &ServiceRegistry::new())
            .await
            .unwrap();
    }
}

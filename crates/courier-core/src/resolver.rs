//! ServiceResolver - 依存解決サービスへのポート
//!
//! Dispatcher が必要とするのは `resolve(type) -> instance` だけです。
//! コンテナの構築やライフタイム管理は外側の責務です。
//!
//! `ServiceRegistry` は singleton / transient だけを持つ最小の実装で、
//! CLI とテストで使います。

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::ResolveError;

/// 解決済みのサービスインスタンス
pub type Instance = Arc<dyn Any + Send + Sync>;

/// ServiceType は依存パラメータの型の識別子
#[derive(Clone, Copy)]
pub struct ServiceType {
    id: TypeId,
    name: &'static str,
}

impl ServiceType {
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ServiceType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ServiceType {}

impl Hash for ServiceType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServiceType({})", self.name)
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// ServiceResolver は型からインスタンスを解決する
///
/// 返す `Instance` の具体型は `service` が指す型 `T` でなければなりません。
/// 異なる型を返した場合、dispatch は `ArgumentMismatch` で失敗します。
pub trait ServiceResolver: Send + Sync {
    fn resolve(&self, service: ServiceType) -> Result<Instance, ResolveError>;
}

impl<R: ServiceResolver + ?Sized> ServiceResolver for Arc<R> {
    fn resolve(&self, service: ServiceType) -> Result<Instance, ResolveError> {
        (**self).resolve(service)
    }
}

type Factory = Arc<dyn Fn() -> Instance + Send + Sync>;

enum Registration {
    Singleton(Instance),
    Transient(Factory),
}

/// ServiceRegistry は最小の in-process resolver
///
/// # 使用例
/// ```ignore
/// let services = ServiceRegistry::new()
///     .add_singleton(AuditLog::default())
///     .add_transient(|| MyService::new());
/// ```
#[derive(Default)]
pub struct ServiceRegistry {
    services: HashMap<ServiceType, Registration>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self {
            services: HashMap::new(),
        }
    }

    /// 毎回同じインスタンスを返す
    pub fn add_singleton<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        let instance: Instance = Arc::new(value);
        self.services
            .insert(ServiceType::of::<T>(), Registration::Singleton(instance));
        self
    }

    /// resolve のたびに factory で新しいインスタンスを作る
    pub fn add_transient<T, F>(mut self, factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        let factory: Factory = Arc::new(move || Arc::new(factory()) as Instance);
        self.services
            .insert(ServiceType::of::<T>(), Registration::Transient(factory));
        self
    }

    pub fn contains<T: Any>(&self) -> bool {
        self.services.contains_key(&ServiceType::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl ServiceResolver for ServiceRegistry {
    fn resolve(&self, service: ServiceType) -> Result<Instance, ResolveError> {
        match self.services.get(&service) {
            Some(Registration::Singleton(instance)) => Ok(Arc::clone(instance)),
            Some(Registration::Transient(factory)) => Ok(factory()),
            None => Err(ResolveError::NotRegistered(service)),
        }
    }
}

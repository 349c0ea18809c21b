use std::sync::Arc;

use tracing::{debug, trace};

use crate::cancel::CancellationToken;
use crate::error::{DispatchError, RegisterError};
use crate::message::{AnyMessage, Message, MessageType};
use crate::resolver::ServiceResolver;
use crate::settings::{DispatcherConfig, DuplicatePolicy};
use crate::typed::{BindingPlan, BoundHandler, DispatchTable, Handler};

/// Dispatcher delivers a message to the handler registered for its concrete type.
///
/// Registration and dispatch may interleave; the table is locked only for the
/// lookup or the insert, never while a handler runs.
pub struct Dispatcher {
    table: DispatchTable,
    resolver: Arc<dyn ServiceResolver>,
    config: DispatcherConfig,
}

impl Dispatcher {
    pub fn new(resolver: Arc<dyn ServiceResolver>) -> Self {
        Self::with_config(resolver, DispatcherConfig::default())
    }

    pub fn with_config(resolver: Arc<dyn ServiceResolver>, config: DispatcherConfig) -> Self {
        Self {
            table: DispatchTable::new(),
            resolver,
            config,
        }
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Register a handler for the message type it takes.
    ///
    /// Returns `&Self` so registrations can be chained with `?`.
    pub fn register<H, Args>(&self, handler: H) -> Result<&Self, RegisterError>
    where
        H: Handler<Args>,
        Args: 'static,
    {
        let bound = BoundHandler::new(handler)?;
        let message_type = bound.message_type();
        let handler_name = bound.name();

        match self.config.on_duplicate {
            DuplicatePolicy::Replace => {
                let replaced = self.table.put(bound).is_some();
                debug!(message_type = %message_type, handler = handler_name, replaced, "registered handler");
            }
            DuplicatePolicy::Reject => {
                self.table.put_new(bound)?;
                debug!(message_type = %message_type, handler = handler_name, "registered handler");
            }
        }
        Ok(self)
    }

    /// Dispatch one message by its runtime type.
    pub async fn dispatch(
        &self,
        message: Box<dyn Message>,
        cancellation: CancellationToken,
    ) -> Result<(), DispatchError> {
        let message_type = MessageType::of_val(&*message);
        let bound = self
            .table
            .get(&message_type)
            .ok_or(DispatchError::HandlerNotFound(message_type))?;

        trace!(message_type = %message_type, handler = bound.name(), "dispatching");
        bound
            .invoke(
                AnyMessage::into_any(message),
                &cancellation,
                self.resolver.as_ref(),
            )
            .await
    }

    /// Typed shorthand for `dispatch(Box::new(message), cancellation)`.
    pub async fn send<M: Message>(
        &self,
        message: M,
        cancellation: CancellationToken,
    ) -> Result<(), DispatchError> {
        self.dispatch(Box::new(message), cancellation).await
    }

    pub fn contains<M: Message>(&self) -> bool {
        self.table.contains(&MessageType::of::<M>())
    }

    pub fn binding_plan<M: Message>(&self) -> Option<BindingPlan> {
        self.table
            .get(&MessageType::of::<M>())
            .map(|bound| bound.plan().clone())
    }

    pub fn registered_types(&self) -> Vec<MessageType> {
        self.table.registered_types()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

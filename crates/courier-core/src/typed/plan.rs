//! BindingPlan - ハンドラ引数の供給方法
//!
//! 登録時に一度だけ作り、以後の dispatch ではこの plan を解釈するだけです。

use std::any::Any;

use tracing::trace;

use crate::cancel::CancellationToken;
use crate::error::{DispatchError, RegisterError};
use crate::message::MessageType;
use crate::resolver::{Instance, ServiceResolver, ServiceType};

/// パラメータ 1 つ分の役割
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// dispatch された message を渡す
    Message(MessageType),
    /// dispatch に渡された cancellation token を渡す
    Cancellation,
    /// resolver から解決したインスタンスを渡す
    Service(ServiceType),
}

/// BindingPlan はパラメータ順の Slot 列と、推論された message 型
#[derive(Debug, Clone)]
pub struct BindingPlan {
    slots: Vec<Slot>,
    message_type: MessageType,
    message_position: usize,
}

impl BindingPlan {
    /// Slot 列から plan を組み立てる
    ///
    /// message slot がちょうど 1 つでなければ拒否します。
    pub fn build(handler: &'static str, slots: Vec<Slot>) -> Result<Self, RegisterError> {
        let messages: Vec<(usize, MessageType)> = slots
            .iter()
            .enumerate()
            .filter_map(|(position, slot)| match slot {
                Slot::Message(message_type) => Some((position, *message_type)),
                _ => None,
            })
            .collect();

        match messages.as_slice() {
            [] => Err(RegisterError::NoMessageParameter { handler }),
            &[(message_position, message_type)] => Ok(Self {
                slots,
                message_type,
                message_position,
            }),
            _ => Err(RegisterError::MultipleMessageParameters {
                handler,
                positions: messages.iter().map(|(position, _)| *position).collect(),
            }),
        }
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn message_type(&self) -> MessageType {
        self.message_type
    }

    pub fn message_position(&self) -> usize {
        self.message_position
    }

    /// resolver に問い合わせる型（パラメータ順）
    pub fn service_types(&self) -> impl Iterator<Item = ServiceType> + '_ {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Service(service) => Some(*service),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// plan に従って実引数を用意する
    ///
    /// Service slot はここで毎回 resolve します。途中で失敗したら、
    /// それ以前に解決したものはそのまま捨てます。
    pub(crate) fn bind(
        &self,
        message: Box<dyn Any + Send>,
        cancellation: &CancellationToken,
        resolver: &dyn ServiceResolver,
    ) -> Result<Arguments, DispatchError> {
        let mut message = Some(message);
        let mut values = Vec::with_capacity(self.slots.len());

        for (position, slot) in self.slots.iter().enumerate() {
            let value = match slot {
                Slot::Message(_) => message
                    .take()
                    .map(Argument::Message)
                    .ok_or(DispatchError::ArgumentMismatch {
                        position,
                        expected: *slot,
                    })?,
                Slot::Cancellation => Argument::Cancellation(cancellation.clone()),
                Slot::Service(service) => {
                    trace!(position, service = %service, "resolving service");
                    let instance = resolver
                        .resolve(*service)
                        .map_err(DispatchError::DependencyResolutionFailed)?;
                    Argument::Service(instance)
                }
            };
            values.push(value);
        }

        Ok(Arguments {
            values: values.into_iter(),
            position: 0,
        })
    }
}

/// 1 つの実引数（型消去済み）
pub enum Argument {
    Message(Box<dyn Any + Send>),
    Cancellation(CancellationToken),
    Service(Instance),
}

/// plan から作られた実引数列。ハンドラが先頭から順に取り出す。
pub struct Arguments {
    values: std::vec::IntoIter<Argument>,
    position: usize,
}

impl Arguments {
    pub(crate) fn take<P, R>(&mut self) -> Result<P, DispatchError>
    where
        P: super::param::Param<R>,
    {
        let position = self.position;
        self.position += 1;
        let mismatch = || DispatchError::ArgumentMismatch {
            position,
            expected: <P as super::param::Param<R>>::slot(),
        };

        let argument = self.values.next().ok_or_else(mismatch)?;
        <P as super::param::Param<R>>::from_argument(argument).ok_or_else(mismatch)
    }
}

//! Handler trait - 普通の async 関数をハンドラとして扱う
//!
//! # 学習ポイント
//! - 引数の個数ごとの impl を `macro_rules!` で生成
//! - Object-safe trait (DynHandler)
//! - Type erasure パターン (TypedHandler<H, Args> → DynHandler)

use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;

use super::param::Param;
use super::plan::{Arguments, Slot};
use crate::error::{BoxError, DispatchError};

/// ハンドラ本体の戻り値
///
/// `()` か `Result<(), E>` を返せます。
pub trait HandlerOutput: Send {
    fn into_result(self) -> Result<(), BoxError>;
}

impl HandlerOutput for () {
    fn into_result(self) -> Result<(), BoxError> {
        Ok(())
    }
}

impl<E: Into<BoxError> + Send> HandlerOutput for Result<(), E> {
    fn into_result(self) -> Result<(), BoxError> {
        self.map_err(Into::into)
    }
}

/// Handler は dispatcher に登録できる関数
///
/// # 使用例
/// ```ignore
/// dispatcher.register(|msg: PongMessage, service: Arc<MyService>, token: CancellationToken| async move {
///     service.work(&token).await
/// })?;
/// ```
///
/// `Args` は各パラメータの `(Role, 型)` の組で、impl を選ぶためだけに使います。
/// 利用者が書くことはありません。
pub trait Handler<Args>: Send + Sync + 'static {
    type Output: HandlerOutput;
    type Future: Future<Output = Self::Output> + Send + 'static;

    /// パラメータ順の分類結果
    fn slots() -> Vec<Slot>;

    /// 実引数を取り出してハンドラを呼ぶ
    fn call(&self, arguments: Arguments) -> Result<Self::Future, DispatchError>;
}

impl<F, Fut> Handler<()> for F
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: HandlerOutput,
{
    type Output = Fut::Output;
    type Future = Fut;

    fn slots() -> Vec<Slot> {
        Vec::new()
    }

    fn call(&self, _arguments: Arguments) -> Result<Self::Future, DispatchError> {
        Ok((self)())
    }
}

macro_rules! impl_handler {
    ($(($R:ident, $P:ident)),+) => {
        impl<F, Fut, $($R, $P,)+> Handler<($(($R, $P),)+)> for F
        where
            F: Fn($($P),+) -> Fut + Send + Sync + 'static,
            Fut: Future + Send + 'static,
            Fut::Output: HandlerOutput,
            $($P: Param<$R>,)+
        {
            type Output = Fut::Output;
            type Future = Fut;

            fn slots() -> Vec<Slot> {
                vec![$(<$P as Param<$R>>::slot()),+]
            }

            #[allow(non_snake_case)]
            fn call(&self, mut arguments: Arguments) -> Result<Self::Future, DispatchError> {
                $(let $P = arguments.take::<$P, $R>()?;)+
                Ok((self)($($P),+))
            }
        }
    };
}

impl_handler!((R1, P1));
impl_handler!((R1, P1), (R2, P2));
impl_handler!((R1, P1), (R2, P2), (R3, P3));
impl_handler!((R1, P1), (R2, P2), (R3, P3), (R4, P4));
impl_handler!((R1, P1), (R2, P2), (R3, P3), (R4, P4), (R5, P5));
impl_handler!((R1, P1), (R2, P2), (R3, P3), (R4, P4), (R5, P5), (R6, P6));
impl_handler!((R1, P1), (R2, P2), (R3, P3), (R4, P4), (R5, P5), (R6, P6), (R7, P7));
impl_handler!((R1, P1), (R2, P2), (R3, P3), (R4, P4), (R5, P5), (R6, P6), (R7, P7), (R8, P8));

/// DynHandler は object-safe なハンドラの抽象化
///
/// TypedHandler を DynHandler に変換することで、
/// `HashMap<MessageType, Arc<BoundHandler>>` に格納可能にします。
#[async_trait]
pub(crate) trait DynHandler: Send + Sync {
    async fn handle_dyn(&self, arguments: Arguments) -> Result<(), DispatchError>;
}

pub(crate) struct TypedHandler<H, Args> {
    handler: H,
    _marker: PhantomData<fn() -> Args>,
}

impl<H, Args> TypedHandler<H, Args>
where
    H: Handler<Args>,
{
    pub(crate) fn new(handler: H) -> Self {
        Self {
            handler,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<H, Args> DynHandler for TypedHandler<H, Args>
where
    H: Handler<Args>,
    Args: 'static,
{
    async fn handle_dyn(&self, arguments: Arguments) -> Result<(), DispatchError> {
        let future = self.handler.call(arguments)?;
        future.await.into_result().map_err(DispatchError::Handler)
    }
}

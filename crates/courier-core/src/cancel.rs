//! Cancellation - dispatch ごとに渡されるキャンセルシグナル
//!
//! `tokio::sync::watch` の bool チャネルを共有して作ります。
//! Dispatcher 自身はこのシグナルを見ません。見るかどうかはハンドラ次第です。

use std::sync::Arc;

use tokio::sync::watch;

/// CancellationSource はキャンセルを発行する側
///
/// # 使用例
/// ```ignore
/// let source = CancellationSource::new();
/// dispatcher.send(PongMessage, source.token()).await?;
/// source.cancel();
/// ```
#[derive(Debug)]
pub struct CancellationSource {
    tx: Arc<watch::Sender<bool>>,
}

impl CancellationSource {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// この source に結び付いた token を発行
    pub fn token(&self) -> CancellationToken {
        CancellationToken {
            tx: Some(Arc::clone(&self.tx)),
        }
    }

    /// キャンセルを要求する（何度呼んでもよい）
    pub fn cancel(&self) {
        // receiver が 0 でも値は保存したいので send_replace
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for CancellationSource {
    fn default() -> Self {
        Self::new()
    }
}

/// CancellationToken はハンドラが受け取る側
///
/// clone しても同じ source を指します。`==` は同一性の比較です。
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    tx: Option<Arc<watch::Sender<bool>>>,
}

impl CancellationToken {
    /// 決してキャンセルされない token
    pub fn none() -> Self {
        Self { tx: None }
    }

    pub fn is_cancelled(&self) -> bool {
        self.tx.as_ref().is_some_and(|tx| *tx.borrow())
    }

    /// キャンセルされるまで待つ
    ///
    /// `none()` の token では永遠に完了しません。
    pub async fn cancelled(&self) {
        match &self.tx {
            Some(tx) => {
                let mut rx = tx.subscribe();
                // sender は self が保持しているので Err にはならない
                let _ = rx.wait_for(|cancelled| *cancelled).await;
            }
            None => std::future::pending::<()>().await,
        }
    }

    /// 同じ source から発行された token か
    pub fn same_as(&self, other: &Self) -> bool {
        match (&self.tx, &other.tx) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl PartialEq for CancellationToken {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

impl Eq for CancellationToken {}

mod logging;

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use courier_core::{
    CancellationSource, CancellationToken, DispatcherBuilder, DispatcherConfig, Message,
    ServiceRegistry,
};
use thiserror::Error;
use tokio::time::{Duration, sleep};

struct PingMessage;
impl Message for PingMessage {}

struct PongMessage;
impl Message for PongMessage {}

/// どの handler にも登録しない message
struct UnroutedMessage;
impl Message for UnroutedMessage {}

#[derive(Debug, Error)]
enum WorkError {
    #[error("work cancelled")]
    Cancelled,
}

/// 少し時間のかかる処理。cancellation を見て途中で止まる。
struct SlowService;

impl SlowService {
    async fn work(&self, token: &CancellationToken) -> Result<(), WorkError> {
        tokio::select! {
            _ = sleep(Duration::from_secs(1)) => Ok(()),
            _ = token.cancelled() => Err(WorkError::Cancelled),
        }
    }
}

/// dispatch 回数を数えるだけの singleton
#[derive(Default)]
struct AuditLog {
    handled: AtomicU32,
}

impl AuditLog {
    fn record(&self, what: &str) {
        let n = self.handled.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::info!(what, handled = n, "audit");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logging();

    // (A) 設定（引数でファイルを指定できる）と resolver を用意
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = DispatcherConfig::load(config_path.as_deref())?;

    let services = ServiceRegistry::new()
        .add_singleton(AuditLog::default())
        .add_transient(|| SlowService);

    // (B) handler を登録（パラメータ型から役割が決まる）
    let dispatcher = DispatcherBuilder::with_config(Arc::new(services), config)
        .register(|_msg: PingMessage, audit: Arc<AuditLog>| async move {
            audit.record("ping");
            tracing::info!("Ping handler");
        })?
        .register(
            |_msg: PongMessage,
             service: Arc<SlowService>,
             audit: Arc<AuditLog>,
             token: CancellationToken| async move {
                service.work(&token).await?;
                audit.record("pong");
                tracing::info!("Pong handler");
                Ok::<(), WorkError>(())
            },
        )?
        .expect::<PingMessage>()
        .expect::<PongMessage>()
        .build()?;

    // (C) dispatch
    dispatcher.send(PingMessage, CancellationToken::none()).await?;
    dispatcher.send(PongMessage, CancellationToken::none()).await?;

    // (D) 途中でキャンセルされる dispatch
    let source = CancellationSource::new();
    let pending = dispatcher.send(PongMessage, source.token());
    let cancel = async {
        sleep(Duration::from_millis(100)).await;
        source.cancel();
    };
    let (result, ()) = tokio::join!(pending, cancel);
    match result {
        Ok(()) => println!("pong finished before cancellation"),
        Err(e) => println!("pong dispatch failed: {e}"),
    }

    // (E) 未登録の型
    if let Err(e) = dispatcher
        .send(UnroutedMessage, CancellationToken::none())
        .await
    {
        println!("unrouted dispatch failed: {e}");
    }

    Ok(())
}

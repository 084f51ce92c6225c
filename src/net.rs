//! TCP transport: JSON-lines framing and the hub channel.
//!
//! Connection tasks never touch session state.  Each connection gets a
//! reader task (parse one event per line, forward to the hub) and a writer
//! task (drain its outbound queue); the hub task owns the [`SessionService`]
//! and applies events strictly in arrival order.

use anyhow::{Context, Result};
use bytes::Bytes;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::protocol::ClientEvent;
use crate::service::SessionService;
use crate::types::WorldConfig;

enum HubMessage {
    Connected {
        id: String,
        sink: UnboundedSender<Bytes>,
    },
    Inbound {
        id: String,
        event: ClientEvent,
    },
    Disconnected {
        id: String,
    },
}

/// Bind and serve until SIGINT.
pub async fn serve(bind: &str, config: WorldConfig) -> Result<()> {
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    info!("listening on {}", bind);

    let (hub_tx, hub_rx) = mpsc::unbounded_channel();
    let hub = tokio::spawn(run_hub(SessionService::new(config), hub_rx));

    tokio::select! {
        res = accept_loop(listener, hub_tx) => res?,
        _ = tokio::signal::ctrl_c() => {
            info!("shutting down (SIGINT)");
        }
    }

    hub.abort();
    Ok(())
}

async fn accept_loop(listener: TcpListener, hub_tx: UnboundedSender<HubMessage>) -> Result<()> {
    let mut next_id: u64 = 1;
    loop {
        let (stream, addr) = listener.accept().await.context("accept failed")?;
        stream.set_nodelay(true)?;

        let id = format!("p{:06x}", next_id);
        next_id += 1;
        debug!("connection {} from {}", id, addr);

        tokio::spawn(run_connection(id, stream, hub_tx.clone()));
    }
}

/// The single logical thread of control: events are applied one at a time,
/// in the order they arrived.
async fn run_hub(mut service: SessionService, mut rx: UnboundedReceiver<HubMessage>) {
    while let Some(msg) = rx.recv().await {
        match msg {
            HubMessage::Connected { id, sink } => service.connect(id, sink),
            HubMessage::Inbound { id, event } => service.handle(&id, event),
            HubMessage::Disconnected { id } => service.disconnect(&id),
        }
    }
}

async fn run_connection(id: String, stream: TcpStream, hub: UnboundedSender<HubMessage>) {
    let (read_half, mut write_half) = stream.into_split();
    let (sink_tx, mut sink_rx) = mpsc::unbounded_channel::<Bytes>();

    if hub
        .send(HubMessage::Connected {
            id: id.clone(),
            sink: sink_tx,
        })
        .is_err()
    {
        return;
    }

    let writer_id = id.clone();
    let writer = tokio::spawn(async move {
        while let Some(frame) = sink_rx.recv().await {
            if let Err(e) = write_half.write_all(&frame).await {
                debug!("connection {}: write failed: {}", writer_id, e);
                break;
            }
        }
    });

    let mut lines = BufReader::new(read_half).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match serde_json::from_str::<ClientEvent>(line) {
                    Ok(event) => {
                        if hub
                            .send(HubMessage::Inbound {
                                id: id.clone(),
                                event,
                            })
                            .is_err()
                        {
                            break;
                        }
                    }
                    Err(e) => warn!("connection {}: malformed event dropped: {}", id, e),
                }
            }
            Ok(None) => break,
            Err(e) => {
                debug!("connection {}: read failed: {}", id, e);
                break;
            }
        }
    }

    let _ = hub.send(HubMessage::Disconnected { id: id.clone() });
    writer.abort();
    debug!("connection {} closed", id);
}

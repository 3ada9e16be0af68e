use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, instrument, warn};

use crate::config::ServerConfig;
use crate::dispatch::{DispatchOutcome, EventDispatcher};
use crate::protocol::{decode_address, parse_message_lossy, AlarmEvent};
use crate::types::{ConnId, ConnectionContext};

/// Longest line accepted from a camera before the connection is dropped
pub const MAX_LINE_LEN: usize = 64 * 1024;

/// Pause after a failed accept so persistent errors (e.g. fd exhaustion)
/// don't spin the loop
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

static NEXT_CONN_ID: AtomicU64 = AtomicU64::new(1);

/// Bind the alarm listener. Failing to bind is fatal for the caller.
pub async fn bind_listener(config: &ServerConfig) -> anyhow::Result<TcpListener> {
    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind alarm listener on {}", addr))?;
    info!("🔌 TCP alarm listener bound on {}", listener.local_addr()?);
    Ok(listener)
}

/// Accept cameras and spawn one task per connection. Never returns.
pub async fn accept_loop(listener: TcpListener, dispatcher: EventDispatcher) {
    loop {
        match listener.accept().await {
            Ok((stream, peer_addr)) => {
                let conn_id = ConnId(NEXT_CONN_ID.fetch_add(1, Ordering::Relaxed));
                info!("🔗 TCP connection {} from {}", conn_id, peer_addr);

                let dispatcher = dispatcher.clone();
                tokio::spawn(async move {
                    handle_tcp_connection(conn_id, stream, dispatcher).await;
                });
            }
            Err(e) => {
                error!("TCP accept error: {}", e);
                tokio::time::sleep(ACCEPT_BACKOFF).await;
            }
        }
    }
}

/// Handle one camera connection until it closes. The socket is dropped on
/// return however the read loop ended.
#[instrument(skip(stream, dispatcher))]
pub async fn handle_tcp_connection(
    conn_id: ConnId,
    stream: TcpStream,
    dispatcher: EventDispatcher,
) {
    let peer_addr = match stream.peer_addr() {
        Ok(addr) => addr,
        Err(e) => {
            warn!("Dropping TCP connection {}: cannot resolve peer: {}", conn_id, e);
            return;
        }
    };
    let ctx = ConnectionContext::new(conn_id, peer_addr);
    debug!(
        "📊 Camera connected - {} host={} port={}",
        ctx,
        ctx.peer_host(),
        ctx.peer_port()
    );

    let processed = process_stream(&ctx, stream, &dispatcher).await;

    info!("🔌 TCP {} closed after {} messages", ctx, processed);
}

/// Read newline-delimited alarms and handle each one before reading the
/// next. Returns the number of lines read.
///
/// Nothing is ever written back to the camera.
pub async fn process_stream<R>(
    ctx: &ConnectionContext,
    reader: R,
    dispatcher: &EventDispatcher,
) -> u64
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut line = Vec::with_capacity(1024);
    let mut processed = 0u64;

    loop {
        line.clear();
        let read = (&mut reader)
            .take(MAX_LINE_LEN as u64)
            .read_until(b'\n', &mut line)
            .await;

        match read {
            Ok(0) => {
                debug!("📊 Camera disconnected - {}", ctx);
                break;
            }
            Ok(n) => {
                if n == MAX_LINE_LEN && line.last() != Some(&b'\n') {
                    warn!("Line from {} exceeds {} bytes, closing", ctx, MAX_LINE_LEN);
                    break;
                }
                processed += 1;
                handle_line(ctx, trim_line_ending(&line), dispatcher).await;
            }
            Err(e) => {
                error!("TCP read error on {}: {}", ctx, e);
                break;
            }
        }
    }

    processed
}

/// Parse one line and hand it to the dispatcher. Returns `None` when the
/// line was too short to carry a message.
pub async fn handle_line(
    ctx: &ConnectionContext,
    line: &[u8],
    dispatcher: &EventDispatcher,
) -> Option<DispatchOutcome> {
    let event = match parse_message_lossy(line) {
        Ok(event) => event,
        Err(e) => {
            warn!("⚠️ Skipping message from {}: {}", ctx, e);
            return None;
        }
    };

    let host = resolve_host(ctx, &event);
    Some(dispatcher.dispatch(ctx, &event, host.as_deref()).await)
}

/// Camera host decoded from the event's address token. The peer address is
/// never substituted: a camera behind NAT or a proxy would trigger the
/// wrong monitor.
fn resolve_host(ctx: &ConnectionContext, event: &AlarmEvent) -> Option<String> {
    match decode_address(&event.address) {
        Ok(host) => Some(host),
        Err(e) => {
            if event.address.is_empty() {
                debug!("No address token from {}", ctx);
            } else {
                warn!("Bad address token {:?} from {}: {}", event.address, ctx, e);
            }
            None
        }
    }
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

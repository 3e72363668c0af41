use anyhow::{Context, Result};
use tokio::io::{self, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::rpc::methods::{handle_raw_request, RpcServerState};

/// Serve JSON-RPC 2.0 over TCP until a shutdown signal arrives.
///
/// Framing is newline-delimited JSON; each connection gets its own task.
pub async fn serve_tcp_until_shutdown(
    listener: TcpListener,
    state: RpcServerState,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<()> {
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = accepted.context("failed to accept tcp rpc connection")?;
                let connection_state = state.clone();
                tokio::spawn(async move {
                    let (read_half, write_half) = stream.into_split();
                    if let Err(error) = serve_connection(read_half, write_half, connection_state).await {
                        warn!(?error, %peer, "tcp rpc connection failed");
                    }
                });
            }
            _ = shutdown_rx.recv() => {
                info!("tcp rpc listener shutting down");
                return Ok(());
            }
        }
    }
}

/// Serve JSON-RPC 2.0 over this process's stdin/stdout until stdin closes.
pub async fn serve_stdio(state: RpcServerState) -> Result<()> {
    serve_connection(io::stdin(), io::stdout(), state).await
}

/// Handle a single RPC stream. Each request line yields one response line.
pub async fn serve_connection<R, W>(reader: R, mut writer: W, state: RpcServerState) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut reader = BufReader::new(reader);

    loop {
        let mut request_line = Vec::new();
        let bytes_read = reader
            .read_until(b'\n', &mut request_line)
            .await
            .context("failed to read json-rpc request")?;

        if bytes_read == 0 {
            return Ok(());
        }

        trim_line_endings(&mut request_line);
        if request_line.iter().all(|byte| byte.is_ascii_whitespace()) {
            continue;
        }

        let Some(response) = handle_raw_request(&request_line, &state).await else {
            continue;
        };
        let mut encoded =
            serde_json::to_vec(&response).context("failed to serialize json-rpc response")?;
        encoded.push(b'\n');

        writer.write_all(&encoded).await.context("failed to write json-rpc response")?;
        writer.flush().await.context("failed to flush json-rpc response")?;
    }
}

fn trim_line_endings(line: &mut Vec<u8>) {
    while matches!(line.last(), Some(b'\n' | b'\r')) {
        line.pop();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use kbnav_common::protocol::jsonrpc::{Response, RequestId};
    use serde_json::json;
    use tempfile::TempDir;
    use tokio::io::{duplex, AsyncBufReadExt, AsyncWriteExt, BufReader};

    use super::*;
    use crate::navigator::{Navigator, NavigatorOptions};

    fn state() -> (TempDir, RpcServerState) {
        let dir = TempDir::new().expect("temp dir should be created");
        let navigator =
            Navigator::open(NavigatorOptions::inline([dir.path()])).expect("navigator should open");
        (dir, RpcServerState::new(Arc::new(navigator)))
    }

    #[test]
    fn trims_crlf_and_lf() {
        let mut line = b"{}\r\n".to_vec();
        trim_line_endings(&mut line);
        assert_eq!(line, b"{}");
    }

    #[tokio::test]
    async fn answers_each_line_and_skips_blank_ones() {
        let (_dir, state) = state();
        let (client, server) = duplex(4096);
        let (server_read, server_write) = io::split(server);
        let server = tokio::spawn(serve_connection(server_read, server_write, state));

        let (client_read, mut client_write) = io::split(client);
        let mut reader = BufReader::new(client_read);

        client_write
            .write_all(b"\n{\"jsonrpc\":\"2.0\",\"method\":\"rpc.ping\",\"id\":1}\r\n")
            .await
            .expect("request write should succeed");
        client_write
            .write_all(b"{\"jsonrpc\":\"2.0\",\"method\":\"nope\",\"id\":2}\n")
            .await
            .expect("request write should succeed");

        let mut line = String::new();
        reader.read_line(&mut line).await.expect("response should be readable");
        let ping: Response = serde_json::from_str(&line).expect("response should decode");
        assert_eq!(ping.id, RequestId::Number(1));
        assert_eq!(ping.result, Some(json!({ "ok": true })));

        line.clear();
        reader.read_line(&mut line).await.expect("response should be readable");
        let unknown: Response = serde_json::from_str(&line).expect("response should decode");
        assert_eq!(unknown.error.expect("error should be present").code, -32601);

        drop(client_write);
        drop(reader);
        server.await.expect("server task should join").expect("server should exit cleanly");
    }
}

use std::{net::SocketAddr, sync::Arc};

use berth::{
	responder::Responders,
	smtp::{Response, ResponseCode, Server, SessionInfo},
};
use tokio::{
	io::{self, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader},
	net::TcpListener,
	sync::watch,
};
use tracing::{info, warn};

/// Longest line we read, CRLF included (RFC 5321 section 4.5.3.1.6).
const MAX_LINE: usize = 1000;

// Runs as long as the client stays connected. Only moves bytes; every
// decision is made by the Server.
pub async fn serve<S>(
	stream: S,
	peer: Option<SocketAddr>,
	responders: Responders,
	host: Arc<str>,
	mut shutdown: watch::Receiver<bool>,
) -> io::Result<()>
where
	S: AsyncRead + AsyncWrite + Unpin,
{
	let (read, mut write) = io::split(stream);
	let mut reader = BufReader::new(read);

	let session = match peer {
		Some(peer) => SessionInfo::with_peer(peer),
		None => SessionInfo::new(),
	};
	let id = session.id;
	let mut server = Server::new(responders, session);

	let greeting = Response::with_message(
		ResponseCode::ServiceReady,
		format!("{} (berth) ready", host),
	);
	write.write_all(greeting.as_string().as_bytes()).await?;

	let mut line = vec![];
	// Set while skipping the rest of a line that was too long
	let mut overlong = false;
	while !server.should_exit() {
		line.clear();
		let mut limited = (&mut reader).take(MAX_LINE as u64);

		let read = tokio::select! {
			read = limited.read_until(b'\n', &mut line) => read?,
			_ = shutdown.changed() => {
				let goodbye = Response::with_message(
					ResponseCode::ServiceNotAvailable,
					format!("4.3.2 {} shutting down", host),
				);
				write.write_all(goodbye.as_string().as_bytes()).await?;
				info!(session = %id, "closed for shutdown");
				return Ok(());
			}
		};

		// A zero sized read, the client has gone away
		if read == 0 {
			info!(session = %id, "connection closed by client");
			return Ok(());
		}

		let complete = line.ends_with(b"\n");
		if overlong {
			overlong = !complete;
			continue;
		}

		if !complete {
			if read < MAX_LINE {
				// The client hung up partway through a line
				info!(session = %id, "connection closed by client");
				return Ok(());
			}

			warn!(session = %id, "line too long");
			overlong = true;
			let too_long =
				Response::with_message(ResponseCode::UnrecognizedCommand, "5.5.2 Line too long");
			write.write_all(too_long.as_string().as_bytes()).await?;
			continue;
		}

		let content = strip_line_ending(&line);
		if let Some(response) = server.push(content) {
			write.write_all(response.as_string().as_bytes()).await?;

			// A refused message leaves the session in data mode, and in data
			// mode there is nothing the client can send to leave it
			if server.in_data_mode() && !response.is_success() {
				info!(session = %id, "closing after refused message");
				write.shutdown().await?;
				return Ok(());
			}
		}
	}

	write.shutdown().await?;
	info!(session = %id, "session ended");
	Ok(())
}

fn strip_line_ending(line: &[u8]) -> &[u8] {
	let line = line.strip_suffix(b"\n").unwrap_or(line);
	line.strip_suffix(b"\r").unwrap_or(line)
}

// Waits for new connections and gives each its own task
pub async fn listen(
	listener: TcpListener,
	responders: Responders,
	host: Arc<str>,
	mut shutdown: watch::Receiver<bool>,
) {
	loop {
		let (stream, peer) = tokio::select! {
			_ = shutdown.changed() => break,
			accepted = listener.accept() => match accepted {
				Ok(accepted) => accepted,
				Err(err) => {
					warn!(%err, "failed to accept connection");
					continue;
				}
			}
		};

		info!(%peer, "connection");

		let responders = responders.clone();
		let host = host.clone();
		let shutdown = shutdown.clone();
		tokio::spawn(async move {
			if let Err(err) = serve(stream, Some(peer), responders, host, shutdown).await {
				warn!(%peer, %err, "connection failed");
			}
		});
	}
}

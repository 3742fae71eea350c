mod config;
mod net;
mod policy;

use std::sync::Arc;

use berth::{
	responder::{QueueingDataResponder, Responders},
	smtp::Envelope,
};
use config::Config;
use policy::ServerPolicy;
use tokio::{
	net::TcpListener,
	signal::unix::{signal, SignalKind},
	sync::{mpsc, watch},
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

// Nothing is delivered yet. Every finished message is logged and dropped.
async fn receive_messages(
	host: Arc<str>,
	mut receiver: mpsc::UnboundedReceiver<Envelope>,
	mut shutdown: watch::Receiver<bool>,
) {
	loop {
		let envelope = tokio::select! {
			_ = shutdown.changed() => break,
			envelope = receiver.recv() => match envelope {
				Some(envelope) => envelope,
				None => break,
			}
		};

		let recipients: Vec<String> = envelope
			.recipients
			.iter()
			.map(|rcpt| rcpt.path.to_string())
			.collect();

		match envelope.received_header(&host) {
			Ok(header) => info!(
				from = %envelope.mail_from.path,
				to = %recipients.join(", "),
				size = envelope.len(),
				"{}",
				header
			),
			Err(err) => warn!(%err, "could not format received time"),
		}
	}
}

async fn shutdown_signal() -> std::io::Result<()> {
	let mut hangup = signal(SignalKind::hangup())?;
	let mut interrupt = signal(SignalKind::interrupt())?;
	let mut quit = signal(SignalKind::quit())?;
	let mut terminate = signal(SignalKind::terminate())?;

	tokio::select! {
		_ = hangup.recv() => (),
		_ = interrupt.recv() => (),
		_ = quit.recv() => (),
		_ = terminate.recv() => (),
	};

	Ok(())
}

#[tokio::main]
async fn main() {
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new("berth=info,berthd=info"));
	tracing_subscriber::fmt().with_env_filter(filter).init();

	let config = match Config::get() {
		Ok(Some(config)) => config,
		Ok(None) => return,
		Err(err) => {
			error!("{}", err);
			return;
		}
	};

	let listener = match TcpListener::bind(config.socket_address()).await {
		Ok(listener) => listener,
		Err(err) => {
			error!(address = %config.socket_address(), %err, "failed to bind");
			return;
		}
	};
	info!(address = %config.socket_address(), "listening");

	let policy = Arc::new(ServerPolicy::new(&config));
	let host: Arc<str> = Arc::from(policy.primary_host());

	let (sender, receiver) = mpsc::unbounded_channel();
	let mut data = QueueingDataResponder::new(sender);
	if let Some(max) = config.max_message_size {
		data = data.with_max_message_size(max);
	}

	let responders = Responders::default()
		.with_identification(policy.clone())
		.with_mail_from(policy.clone())
		.with_recipient_to(policy)
		.with_data(Arc::new(data));

	let (tx, rx) = watch::channel(false);

	let receive_task = tokio::spawn(receive_messages(host.clone(), receiver, rx.clone()));
	let listen_task = tokio::spawn(net::listen(listener, responders, host, rx));

	if let Err(err) = shutdown_signal().await {
		error!(%err, "could not listen for signals, shutting down");
	}

	info!("received shutdown signal, beginning graceful shutdown");
	if tx.send(true).is_err() {
		warn!("no tasks left to notify of shutdown");
	}

	let (listen, receive) = tokio::join!(listen_task, receive_task);
	for result in [listen, receive] {
		if let Err(err) = result {
			error!(%err, "task failed during shutdown");
		}
	}
}

use std::{
	collections::HashMap,
	sync::{Mutex, MutexGuard, PoisonError},
};

use tokio::sync::mpsc::UnboundedSender as Sender;
use tracing::{info, warn};

use super::DataResponder;
use crate::smtp::{Envelope, Response, ResponseCode, SessionId, SessionInfo};

/// Used when no other limit is set.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 10 * 1024 * 1024;

struct Pending {
	envelope: Envelope,
	oversized: bool,
}

/// Collects message content per session and hands each finished
/// [Envelope] to a channel. What happens to it there is up to the receiver.
pub struct QueueingDataResponder {
	sender: Sender<Envelope>,
	max_message_size: usize,
	pending: Mutex<HashMap<SessionId, Pending>>,
}

impl QueueingDataResponder {
	pub fn new(sender: Sender<Envelope>) -> Self {
		Self {
			sender,
			max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
			pending: Mutex::new(HashMap::new()),
		}
	}

	/// Messages larger than `bytes` are refused at the end of data.
	pub fn with_max_message_size(mut self, bytes: usize) -> Self {
		self.max_message_size = bytes;
		self
	}

	fn pending(&self) -> MutexGuard<'_, HashMap<SessionId, Pending>> {
		// A panic elsewhere doesn't leave the map itself inconsistent
		self.pending.lock().unwrap_or_else(PoisonError::into_inner)
	}
}

impl DataResponder for QueueingDataResponder {
	fn data_start(&self, session: &SessionInfo) -> Response {
		let envelope = match Envelope::new(session) {
			Some(envelope) => envelope,
			None => return Response::bad_sequence(),
		};

		self.pending().insert(
			session.id,
			Pending {
				envelope,
				oversized: false,
			},
		);

		Response::with_message(
			ResponseCode::StartMailInput,
			"Start mail input; end with <CRLF>.<CRLF>",
		)
	}

	fn data_line(&self, session: &SessionInfo, line: &[u8]) -> Option<Response> {
		let mut pending = self.pending();
		let message = pending.get_mut(&session.id)?;

		if message.oversized {
			return None;
		}

		message.envelope.push_line(line);

		if message.envelope.len() > self.max_message_size {
			// Keep reading to the end marker, but stop buffering
			message.oversized = true;
			message.envelope.data = vec![];
		}

		None
	}

	fn data_end(&self, session: &SessionInfo) -> Response {
		let message = match self.pending().remove(&session.id) {
			Some(message) => message,
			None => return Response::bad_sequence(),
		};

		if message.oversized {
			return Response::with_message(
				ResponseCode::ExceededStorageAllocation,
				"5.3.4 Message size exceeds fixed maximum message size",
			);
		}

		let size = message.envelope.len();
		let recipients = message.envelope.recipients.len();
		if self.sender.send(message.envelope).is_err() {
			warn!(session = %session.id, "envelope queue is closed");
			return Response::with_message(
				ResponseCode::ProcessingError,
				"4.3.0 Queue unavailable",
			);
		}

		info!(session = %session.id, size, recipients, "queued message");
		Response::with_message(
			ResponseCode::Okay,
			format!("2.0.0 Ok: queued as {}", session.id),
		)
	}

	fn data_abort(&self, session: &SessionInfo) {
		self.pending().remove(&session.id);
	}
}

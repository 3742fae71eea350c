use std::net::SocketAddr;

use time::{format_description::well_known::Rfc2822, OffsetDateTime};

use super::{
	args::{MailFrom, RcptTo},
	Identification, IdentificationMode, SessionId, SessionInfo,
};

/// A finished transaction: who sent it, who it is for, and the message
/// itself with dot-stuffing undone.
#[derive(Clone, Debug)]
pub struct Envelope {
	pub session: SessionId,
	pub received: OffsetDateTime,
	pub client: Identification,
	pub peer: Option<SocketAddr>,
	pub mail_from: MailFrom,
	pub recipients: Vec<RcptTo>,
	pub data: Vec<u8>,
}

impl Envelope {
	/// Starts an envelope for the transaction currently open in `session`.
	/// Returns None if the session has no sender yet.
	pub fn new(session: &SessionInfo) -> Option<Self> {
		let mail_from = session.mail_from.clone()?;

		Some(Self {
			session: session.id,
			received: OffsetDateTime::now_utc(),
			client: session.identification.clone(),
			peer: session.peer,
			mail_from,
			recipients: session.recipients.clone(),
			data: vec![],
		})
	}

	/// Appends one line of message content, without its line ending. A
	/// leading period is the client's transparency escape and is removed
	/// (RFC 5321 section 4.5.2).
	pub fn push_line(&mut self, line: &[u8]) {
		let line = line.strip_prefix(b".").unwrap_or(line);

		self.data.extend_from_slice(line);
		self.data.extend_from_slice(b"\r\n");
	}

	pub fn len(&self) -> usize {
		self.data.len()
	}

	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}

	/// The `Received:` trace field a server prepends when it takes
	/// responsibility for the message.
	pub fn received_header(&self, by: &str) -> Result<String, time::error::Format> {
		let protocol = match self.client.mode {
			IdentificationMode::Ehlo => "ESMTP",
			_ => "SMTP",
		};
		let peer = match self.peer {
			Some(peer) => format!(" ([{}])", peer.ip()),
			None => String::new(),
		};

		Ok(format!(
			"Received: from {}{} by {} with {} id {}; {}",
			self.client.domain,
			peer,
			by,
			protocol,
			self.session,
			self.received.format(&Rfc2822)?
		))
	}
}

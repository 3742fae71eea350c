use std::{
	fmt::Display,
	net::SocketAddr,
	sync::atomic::{AtomicU64, Ordering},
};

use time::OffsetDateTime;

use super::args::{MailFrom, RcptTo};

static NEXT_SESSION: AtomicU64 = AtomicU64::new(1);

/// Identifies one connection for as long as the process runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl SessionId {
	fn next() -> Self {
		Self(NEXT_SESSION.fetch_add(1, Ordering::Relaxed))
	}
}

impl Display for SessionId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{:08X}", self.0)
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum IdentificationMode {
	#[default]
	NotIdentified,
	Helo,
	Ehlo,
}

impl Display for IdentificationMode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::NotIdentified => write!(f, "not identified"),
			Self::Helo => write!(f, "HELO"),
			Self::Ehlo => write!(f, "EHLO"),
		}
	}
}

/// What the client said about itself in HELO or EHLO. Replaced as a whole
/// each time the client identifies again.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Identification {
	pub mode: IdentificationMode,
	pub domain: String,
}

impl Identification {
	pub fn new<S: Into<String>>(mode: IdentificationMode, domain: S) -> Self {
		Self {
			mode,
			domain: domain.into(),
		}
	}

	pub fn is_identified(&self) -> bool {
		self.mode != IdentificationMode::NotIdentified
	}
}

/// The protocol state of a single connection.
///
/// Only the [super::Server] owning it changes it. Responders see it read-only.
/// `recipients` is only ever non-empty while `mail_from` is set, and
/// `mail_from` only while the client is identified.
#[derive(Clone, Debug)]
pub struct SessionInfo {
	pub id: SessionId,
	pub created: OffsetDateTime,
	pub peer: Option<SocketAddr>,
	pub identification: Identification,
	pub mail_from: Option<MailFrom>,
	/// In the order they were accepted, which is delivery order.
	pub recipients: Vec<RcptTo>,
	pub has_data: bool,
	pub in_data_mode: bool,
}

impl SessionInfo {
	pub fn new() -> Self {
		Self {
			id: SessionId::next(),
			created: OffsetDateTime::now_utc(),
			peer: None,
			identification: Identification::default(),
			mail_from: None,
			recipients: vec![],
			has_data: false,
			in_data_mode: false,
		}
	}

	pub fn with_peer(peer: SocketAddr) -> Self {
		Self {
			peer: Some(peer),
			..Self::new()
		}
	}

	/// Ends the current mail transaction. The client stays identified.
	pub fn reset(&mut self) {
		self.mail_from = None;
		self.recipients.clear();
		self.has_data = false;
	}
}

impl Default for SessionInfo {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn session_ids_are_unique() {
		let first = SessionInfo::new();
		let second = SessionInfo::new();

		assert_ne!(first.id, second.id);
	}

	#[test]
	fn reset_keeps_identification() {
		let mut session = SessionInfo::new();
		session.identification = Identification::new(IdentificationMode::Ehlo, "client.example");
		session.mail_from = Some("<a@example.com>".parse().unwrap());
		session.recipients.push("<b@example.com>".parse().unwrap());
		session.recipients.push("<b@example.com>".parse().unwrap());
		session.has_data = true;

		session.reset();

		assert_eq!(
			session.identification,
			Identification::new(IdentificationMode::Ehlo, "client.example")
		);
		assert!(session.mail_from.is_none());
		assert!(session.recipients.is_empty());
		assert!(!session.has_data);
	}
}

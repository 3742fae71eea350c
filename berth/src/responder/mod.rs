//! The decisions a session delegates: one trait per protocol concern.
//!
//! The state machine only checks that commands arrive in a legal order.
//! Whether a sender, recipient or message is acceptable is up to these
//! responders, which every session shares. Implementations must therefore be
//! safe to call from many sessions at once.

mod default;
mod queue;

use std::sync::Arc;

pub use default::DefaultResponder;
pub use queue::{QueueingDataResponder, DEFAULT_MAX_MESSAGE_SIZE};

use crate::smtp::{
	args::{MailFrom, RcptTo},
	Identification, Response, SessionInfo,
};

pub trait IdentificationResponder: Send + Sync {
	/// Decides on a HELO or EHLO. `identification` is what the client
	/// proposes; the session still holds the previous one.
	fn verify_identification(
		&self,
		session: &SessionInfo,
		identification: &Identification,
	) -> Response;
}

pub trait MailFromResponder: Send + Sync {
	fn verify_mail_from(&self, session: &SessionInfo, mail_from: &MailFrom) -> Response;
}

pub trait RecipientToResponder: Send + Sync {
	/// Decides on one RCPT. Recipients accepted so far are in the session.
	fn verify_recipient_to(&self, session: &SessionInfo, recipient: &RcptTo) -> Response;
}

pub trait DataResponder: Send + Sync {
	/// Answers DATA. A positive reply puts the session in data mode.
	fn data_start(&self, session: &SessionInfo) -> Response;

	/// Receives one line of message content, without its line ending and
	/// still dot-stuffed. Usually nothing is sent back.
	fn data_line(&self, session: &SessionInfo, line: &[u8]) -> Option<Response>;

	/// Answers the end-of-data marker.
	fn data_end(&self, session: &SessionInfo) -> Response;

	/// The session went away in data mode. Anything buffered for it can go.
	fn data_abort(&self, _session: &SessionInfo) {}
}

pub trait ResetResponder: Send + Sync {
	fn reset(&self, session: &SessionInfo) -> Response;
}

pub trait VerifyResponder: Send + Sync {
	fn verify(&self, session: &SessionInfo, argument: &str) -> Response;
}

pub trait RawLineResponder: Send + Sync {
	/// Receives any line outside data mode that is not a known command.
	fn raw_line(&self, session: &SessionInfo, line: &str) -> Response;
}

/// The full set of responders a session consults.
///
/// Every concern defaults to [DefaultResponder] and can be replaced on its
/// own. Cloning only clones the handles, so one set can be given to every
/// session.
#[derive(Clone)]
pub struct Responders {
	pub(crate) identification: Arc<dyn IdentificationResponder>,
	pub(crate) mail_from: Arc<dyn MailFromResponder>,
	pub(crate) recipient_to: Arc<dyn RecipientToResponder>,
	pub(crate) data: Arc<dyn DataResponder>,
	pub(crate) reset: Arc<dyn ResetResponder>,
	pub(crate) verify: Arc<dyn VerifyResponder>,
	pub(crate) raw_line: Arc<dyn RawLineResponder>,
}

impl Responders {
	pub fn with_identification(mut self, responder: Arc<dyn IdentificationResponder>) -> Self {
		self.identification = responder;
		self
	}

	pub fn with_mail_from(mut self, responder: Arc<dyn MailFromResponder>) -> Self {
		self.mail_from = responder;
		self
	}

	pub fn with_recipient_to(mut self, responder: Arc<dyn RecipientToResponder>) -> Self {
		self.recipient_to = responder;
		self
	}

	pub fn with_data(mut self, responder: Arc<dyn DataResponder>) -> Self {
		self.data = responder;
		self
	}

	pub fn with_reset(mut self, responder: Arc<dyn ResetResponder>) -> Self {
		self.reset = responder;
		self
	}

	pub fn with_verify(mut self, responder: Arc<dyn VerifyResponder>) -> Self {
		self.verify = responder;
		self
	}

	pub fn with_raw_line(mut self, responder: Arc<dyn RawLineResponder>) -> Self {
		self.raw_line = responder;
		self
	}
}

impl Default for Responders {
	fn default() -> Self {
		let default = Arc::new(DefaultResponder);

		Self {
			identification: default.clone(),
			mail_from: default.clone(),
			recipient_to: default.clone(),
			data: default.clone(),
			reset: default.clone(),
			verify: default.clone(),
			raw_line: default,
		}
	}
}

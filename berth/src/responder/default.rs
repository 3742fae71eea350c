use super::{
	DataResponder, IdentificationResponder, MailFromResponder, RawLineResponder,
	RecipientToResponder, ResetResponder, VerifyResponder,
};
use crate::smtp::{
	args::{MailFrom, RcptTo},
	Identification, Response, ResponseCode, SessionInfo,
};

/// Accepts every legal command and stores nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultResponder;

impl IdentificationResponder for DefaultResponder {
	fn verify_identification(
		&self,
		_session: &SessionInfo,
		identification: &Identification,
	) -> Response {
		Response::with_message(
			ResponseCode::Okay,
			format!("Hello {}", identification.domain),
		)
	}
}

impl MailFromResponder for DefaultResponder {
	fn verify_mail_from(&self, _session: &SessionInfo, _mail_from: &MailFrom) -> Response {
		Response::with_message(ResponseCode::Okay, "2.1.0 Ok")
	}
}

impl RecipientToResponder for DefaultResponder {
	fn verify_recipient_to(&self, _session: &SessionInfo, _recipient: &RcptTo) -> Response {
		Response::with_message(ResponseCode::Okay, "2.1.5 Ok")
	}
}

impl DataResponder for DefaultResponder {
	fn data_start(&self, _session: &SessionInfo) -> Response {
		Response::with_message(
			ResponseCode::StartMailInput,
			"Start mail input; end with <CRLF>.<CRLF>",
		)
	}

	fn data_line(&self, _session: &SessionInfo, _line: &[u8]) -> Option<Response> {
		None
	}

	fn data_end(&self, _session: &SessionInfo) -> Response {
		Response::with_message(ResponseCode::Okay, "2.0.0 Ok")
	}
}

impl ResetResponder for DefaultResponder {
	fn reset(&self, _session: &SessionInfo) -> Response {
		Response::ok()
	}
}

impl VerifyResponder for DefaultResponder {
	fn verify(&self, _session: &SessionInfo, _argument: &str) -> Response {
		Response::with_message(
			ResponseCode::CannotVrfyUser,
			"2.5.2 Cannot VRFY user, but will accept message and attempt delivery",
		)
	}
}

impl RawLineResponder for DefaultResponder {
	fn raw_line(&self, _session: &SessionInfo, _line: &str) -> Response {
		Response::with_message(
			ResponseCode::UnrecognizedCommand,
			"5.5.2 Syntax error, command unrecognized",
		)
	}
}

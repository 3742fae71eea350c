use tracing::{debug, info};

use crate::responder::Responders;

use super::{
	args::{MailFrom, RcptTo},
	Command, Identification, IdentificationMode, ParseCommandError, Response, ResponseCode,
	SessionInfo,
};

/// `Err` holds a reply decided before any responder was asked.
type Verdict = Result<Response, Response>;

/// The server side of one SMTP conversation.
///
/// It is fed one line at a time by whatever owns the connection and answers
/// with the reply to send, if any. It never touches the network itself.
pub struct Server {
	responders: Responders,
	session: SessionInfo,
	exit: bool,
}

impl Server {
	pub fn new(responders: Responders, session: SessionInfo) -> Self {
		Self {
			responders,
			session,
			exit: false,
		}
	}

	pub fn session(&self) -> &SessionInfo {
		&self.session
	}

	pub fn in_data_mode(&self) -> bool {
		self.session.in_data_mode
	}

	/// True once the client has sent QUIT. The connection should be closed
	/// after the reply to QUIT is written.
	pub fn should_exit(&self) -> bool {
		self.exit
	}

	/// Takes one line from the client, without its CRLF.
	///
	/// In data mode every line is message content and a lone `.` ends the
	/// message. Otherwise the line is parsed as a command.
	pub fn push(&mut self, line: &[u8]) -> Option<Response> {
		if self.session.in_data_mode {
			return if line == b"." {
				Some(self.data_end())
			} else {
				self.data_line(line)
			};
		}

		let line = String::from_utf8_lossy(line);
		match line.parse::<Command>() {
			Ok(command) => self.command(command),
			Err(ParseCommandError::Unrecognized) => Some(self.raw_line(&line)),
			Err(err) => {
				debug!(session = %self.session.id, %err, "malformed command");
				Some(Response::syntax_error())
			}
		}
	}

	/// Runs an already parsed command. In data mode the command is message
	/// content instead, and the data responder gets its wire form (`MAIL
	/// FROM:<a>`), not the client's original spelling. Callers that still have
	/// the raw line should use [Server::push] or [Server::data_line].
	pub fn command(&mut self, command: Command) -> Option<Response> {
		if self.session.in_data_mode {
			return self.data_line(command.to_string().as_bytes());
		}

		let verdict = match command {
			Command::Helo(domain) => self.identify(IdentificationMode::Helo, domain),
			Command::Ehlo(domain) => self.identify(IdentificationMode::Ehlo, domain),
			Command::Mail(arguments) => self.mail(&arguments),
			Command::Rcpt(arguments) => self.rcpt(&arguments),
			Command::Data => self.data(),
			Command::Rset => Ok(self.rset()),
			Command::Vrfy(argument) => self.vrfy(&argument),
			Command::Noop => Ok(Response::ok()),
			Command::Quit => Ok(self.quit()),
			Command::Auth(value) => Ok(Self::auth(value)),
		};

		Some(verdict.unwrap_or_else(|rejection| rejection))
	}

	/// One line of message content, still dot-stuffed.
	pub fn data_line(&mut self, line: &[u8]) -> Option<Response> {
		if !self.session.in_data_mode {
			return Some(Response::bad_sequence());
		}

		self.responders.data.data_line(&self.session, line)
	}

	pub fn data_end(&mut self) -> Response {
		if !self.session.in_data_mode {
			return Response::bad_sequence();
		}

		debug!(session = %self.session.id, "end of data");
		let response = self.responders.data.data_end(&self.session);
		if response.is_success() {
			self.session.in_data_mode = false;
		}

		response
	}

	/// A line outside data mode that isn't a command this server knows.
	pub fn raw_line(&mut self, line: &str) -> Response {
		debug!(session = %self.session.id, "<<< {}", line);

		self.responders.raw_line.raw_line(&self.session, line)
	}

	fn identify(&mut self, mode: IdentificationMode, domain: String) -> Verdict {
		if domain.trim().is_empty() {
			return Err(Response::with_message(
				ResponseCode::InvalidParameters,
				format!("{} Missing domain address.", mode),
			));
		}

		let identification = Identification::new(mode, domain.trim());
		let response = self
			.responders
			.identification
			.verify_identification(&self.session, &identification);

		if response.is_success() {
			info!(session = %self.session.id, %mode, domain = %identification.domain, "client identified");
			self.session.identification = identification;
		}

		Ok(response)
	}

	fn mail(&mut self, arguments: &str) -> Verdict {
		self.require_identified()?;

		let mail_from: MailFrom = arguments.parse().map_err(|err| {
			debug!(session = %self.session.id, %err, "bad MAIL FROM argument");
			Response::syntax_error()
		})?;

		let response = self
			.responders
			.mail_from
			.verify_mail_from(&self.session, &mail_from);

		if response.is_success() {
			self.session.mail_from = Some(mail_from);
		}

		Ok(response)
	}

	fn rcpt(&mut self, arguments: &str) -> Verdict {
		self.require_identified()?;
		self.require_mail_from()?;

		let recipient: RcptTo = arguments.parse().map_err(|err| {
			debug!(session = %self.session.id, %err, "bad RCPT TO argument");
			Response::syntax_error()
		})?;

		let response = self
			.responders
			.recipient_to
			.verify_recipient_to(&self.session, &recipient);

		if response.is_success() {
			self.session.recipients.push(recipient);
		}

		Ok(response)
	}

	fn data(&mut self) -> Verdict {
		self.require_identified()?;
		self.require_mail_from()?;
		// No recipients is reported with the MAIL FROM reply
		self.require_recipients()
			.map_err(|_| Self::use_mail_from_first())?;

		let response = self.responders.data.data_start(&self.session);
		if response.is_success() {
			self.session.in_data_mode = true;
			self.session.has_data = true;
		}

		Ok(response)
	}

	fn rset(&mut self) -> Response {
		let response = self.responders.reset.reset(&self.session);
		if response.is_success() {
			self.session.reset();
			self.session.in_data_mode = false;
		}

		response
	}

	fn vrfy(&mut self, argument: &str) -> Verdict {
		self.require_identified()?;

		if argument.trim().is_empty() {
			return Err(Response::with_message(
				ResponseCode::InvalidParameters,
				"VRFY Missing parameter.",
			));
		}

		Ok(self.responders.verify.verify(&self.session, argument))
	}

	fn quit(&mut self) -> Response {
		info!(session = %self.session.id, "client quit");
		self.exit = true;

		Response::disconnect()
	}

	// TODO: capture the credentials of the next line(s) once AUTH mechanisms are supported
	fn auth(value: String) -> Response {
		Response::with_message(ResponseCode::ServerChallenge, value)
	}

	fn require_identified(&self) -> Result<(), Response> {
		if self.session.identification.is_identified() {
			Ok(())
		} else {
			Err(Response::not_identified())
		}
	}

	fn use_mail_from_first() -> Response {
		Response::with_message(ResponseCode::CommandNotImplemented, "5.5.1 Use MAIL FROM first.")
	}

	fn require_mail_from(&self) -> Result<(), Response> {
		match self.session.mail_from {
			Some(_) => Ok(()),
			None => Err(Self::use_mail_from_first()),
		}
	}

	fn require_recipients(&self) -> Result<(), Response> {
		if self.session.recipients.is_empty() {
			Err(Response::with_message(
				ResponseCode::BadCommandSequence,
				"5.5.1 Must have recipient first",
			))
		} else {
			Ok(())
		}
	}
}

impl Drop for Server {
	fn drop(&mut self) {
		if self.session.in_data_mode {
			self.responders.data.data_abort(&self.session);
		}
	}
}

#[cfg(test)]
mod test {
	use std::sync::{Arc, Mutex};

	use proptest::prelude::*;

	use super::*;
	use crate::responder::{
		DataResponder, DefaultResponder, IdentificationResponder, MailFromResponder,
		RawLineResponder, RecipientToResponder, ResetResponder, VerifyResponder,
	};

	/// Remembers every call and answers like [DefaultResponder], unless told
	/// to reject.
	#[derive(Default)]
	struct Recorder {
		calls: Mutex<Vec<String>>,
		reject: bool,
	}

	impl Recorder {
		fn rejecting() -> Self {
			Self {
				reject: true,
				..Self::default()
			}
		}

		fn record(&self, call: String, accepted: Response) -> Response {
			self.calls.lock().unwrap().push(call);

			if self.reject {
				Response::with_message(ResponseCode::PermanentMailFail, "5.7.1 Rejected")
			} else {
				accepted
			}
		}

		fn calls(&self) -> Vec<String> {
			self.calls.lock().unwrap().clone()
		}
	}

	impl IdentificationResponder for Recorder {
		fn verify_identification(&self, s: &SessionInfo, id: &Identification) -> Response {
			let accepted = DefaultResponder.verify_identification(s, id);
			self.record(format!("identification {} {}", id.mode, id.domain), accepted)
		}
	}

	impl MailFromResponder for Recorder {
		fn verify_mail_from(&self, s: &SessionInfo, mail_from: &MailFrom) -> Response {
			let accepted = DefaultResponder.verify_mail_from(s, mail_from);
			self.record(format!("mail {}", mail_from), accepted)
		}
	}

	impl RecipientToResponder for Recorder {
		fn verify_recipient_to(&self, s: &SessionInfo, recipient: &RcptTo) -> Response {
			let accepted = DefaultResponder.verify_recipient_to(s, recipient);
			self.record(format!("rcpt {}", recipient), accepted)
		}
	}

	impl DataResponder for Recorder {
		fn data_start(&self, s: &SessionInfo) -> Response {
			self.record("data start".into(), DefaultResponder.data_start(s))
		}

		fn data_line(&self, _s: &SessionInfo, line: &[u8]) -> Option<Response> {
			self.calls
				.lock()
				.unwrap()
				.push(format!("data line {}", String::from_utf8_lossy(line)));
			None
		}

		fn data_end(&self, s: &SessionInfo) -> Response {
			self.record("data end".into(), DefaultResponder.data_end(s))
		}

		fn data_abort(&self, _s: &SessionInfo) {
			self.calls.lock().unwrap().push("data abort".into());
		}
	}

	impl ResetResponder for Recorder {
		fn reset(&self, s: &SessionInfo) -> Response {
			self.record("reset".into(), DefaultResponder.reset(s))
		}
	}

	impl VerifyResponder for Recorder {
		fn verify(&self, s: &SessionInfo, argument: &str) -> Response {
			let accepted = DefaultResponder.verify(s, argument);
			self.record(format!("verify {}", argument), accepted)
		}
	}

	impl RawLineResponder for Recorder {
		fn raw_line(&self, s: &SessionInfo, line: &str) -> Response {
			self.record(format!("raw {}", line), DefaultResponder.raw_line(s, line))
		}
	}

	fn server_with(recorder: &Arc<Recorder>) -> Server {
		let responders = Responders::default()
			.with_identification(recorder.clone())
			.with_mail_from(recorder.clone())
			.with_recipient_to(recorder.clone())
			.with_data(recorder.clone())
			.with_reset(recorder.clone())
			.with_verify(recorder.clone())
			.with_raw_line(recorder.clone());

		Server::new(responders, SessionInfo::new())
	}

	fn recording_server() -> (Server, Arc<Recorder>) {
		let recorder = Arc::new(Recorder::default());
		(server_with(&recorder), recorder)
	}

	fn send(server: &mut Server, line: &str) -> Option<Response> {
		server.push(line.as_bytes())
	}

	fn code(server: &mut Server, line: &str) -> u16 {
		send(server, line)
			.map(|response| response.code.as_code())
			.unwrap_or_default()
	}

	fn use_mail_from_first() -> Response {
		Response::with_message(ResponseCode::CommandNotImplemented, "5.5.1 Use MAIL FROM first.")
	}

	/// The parts of a session that commands may change.
	fn snapshot(session: &SessionInfo) -> (Identification, Option<MailFrom>, Vec<RcptTo>, bool, bool) {
		(
			session.identification.clone(),
			session.mail_from.clone(),
			session.recipients.clone(),
			session.has_data,
			session.in_data_mode,
		)
	}

	#[test]
	fn full_transaction() {
		let (mut server, recorder) = recording_server();

		assert_eq!(code(&mut server, "EHLO client.example"), 250);
		assert_eq!(code(&mut server, "MAIL FROM:<a@example.com>"), 250);
		assert_eq!(code(&mut server, "RCPT TO:<b@example.com>"), 250);
		assert_eq!(code(&mut server, "RCPT TO:<c@example.com>"), 250);
		assert_eq!(code(&mut server, "DATA"), 354);
		assert!(server.in_data_mode());
		assert_eq!(send(&mut server, "Subject: hello"), None);
		assert_eq!(send(&mut server, "..dot"), None);
		assert_eq!(code(&mut server, "."), 250);
		assert!(!server.in_data_mode());
		assert!(server.session().has_data);
		assert_eq!(send(&mut server, "QUIT"), Some(Response::disconnect()));
		assert!(server.should_exit());

		assert_eq!(
			recorder.calls(),
			[
				"identification EHLO client.example",
				"mail <a@example.com>",
				"rcpt <b@example.com>",
				"rcpt <c@example.com>",
				"data start",
				"data line Subject: hello",
				"data line ..dot",
				"data end",
			]
		);
	}

	#[test]
	fn transaction_commands_need_identification() {
		let (mut server, recorder) = recording_server();
		let before = snapshot(server.session());

		for line in [
			"MAIL FROM:<a@example.com>",
			"RCPT TO:<b@example.com>",
			"DATA",
			"VRFY postmaster",
		] {
			assert_eq!(send(&mut server, line), Some(Response::not_identified()), "{}", line);
		}

		assert_eq!(snapshot(server.session()), before);
		assert!(recorder.calls().is_empty());
	}

	#[test]
	fn rcpt_and_data_need_mail_from() {
		let (mut server, recorder) = recording_server();
		send(&mut server, "HELO client.example");

		assert_eq!(send(&mut server, "RCPT TO:<b@example.com>"), Some(use_mail_from_first()));
		assert!(server.session().recipients.is_empty());

		assert_eq!(send(&mut server, "DATA"), Some(use_mail_from_first()));
		assert!(!server.in_data_mode());

		assert_eq!(recorder.calls(), ["identification HELO client.example"]);
	}

	#[test]
	fn data_without_recipients_is_rejected() {
		let (mut server, _) = recording_server();
		send(&mut server, "HELO client.example");
		send(&mut server, "MAIL FROM:<a@example.com>");

		assert_eq!(send(&mut server, "DATA"), Some(use_mail_from_first()));
		assert!(!server.in_data_mode());
		assert!(!server.session().has_data);
	}

	#[test]
	fn helo_and_ehlo_need_a_domain() {
		let (mut server, recorder) = recording_server();

		assert_eq!(
			send(&mut server, "HELO"),
			Some(Response::with_message(
				ResponseCode::InvalidParameters,
				"HELO Missing domain address."
			))
		);
		assert_eq!(
			send(&mut server, "EHLO    "),
			Some(Response::with_message(
				ResponseCode::InvalidParameters,
				"EHLO Missing domain address."
			))
		);
		assert!(!server.session().identification.is_identified());
		assert!(recorder.calls().is_empty());
	}

	#[test]
	fn ehlo_replaces_helo() {
		let (mut server, _) = recording_server();
		send(&mut server, "HELO old.example");
		send(&mut server, "EHLO example.com");

		assert_eq!(
			server.session().identification,
			Identification::new(IdentificationMode::Ehlo, "example.com")
		);
	}

	#[test]
	fn rejected_identification_keeps_previous() {
		let recorder = Arc::new(Recorder::rejecting());
		let mut server = server_with(&recorder);

		assert_eq!(code(&mut server, "HELO client.example"), 550);
		assert!(!server.session().identification.is_identified());
	}

	#[test]
	fn malformed_mail_from_is_a_syntax_error() {
		let (mut server, recorder) = recording_server();
		send(&mut server, "HELO client.example");

		assert_eq!(
			send(&mut server, "MAIL FROM:not-an-address"),
			Some(Response::syntax_error())
		);
		assert!(server.session().mail_from.is_none());

		assert_eq!(send(&mut server, "MAIL <a@example.com>"), Some(Response::syntax_error()));
		assert_eq!(recorder.calls(), ["identification HELO client.example"]);
	}

	#[test]
	fn malformed_rcpt_to_is_a_syntax_error() {
		let (mut server, _) = recording_server();
		send(&mut server, "HELO client.example");
		send(&mut server, "MAIL FROM:<>");

		assert_eq!(send(&mut server, "RCPT TO:b@example.com"), Some(Response::syntax_error()));
		assert!(server.session().recipients.is_empty());
	}

	#[test]
	fn rejected_commands_leave_state_alone() {
		let recorder = Arc::new(Recorder::rejecting());
		let mut server = server_with(&recorder);
		server.session.identification = Identification::new(IdentificationMode::Helo, "c.example");
		server.session.mail_from = Some("<a@example.com>".parse().unwrap());
		server.session.recipients.push("<b@example.com>".parse().unwrap());
		let before = snapshot(server.session());

		assert_eq!(code(&mut server, "MAIL FROM:<z@example.com>"), 550);
		assert_eq!(code(&mut server, "RCPT TO:<y@example.com>"), 550);
		assert_eq!(code(&mut server, "DATA"), 550);
		assert_eq!(code(&mut server, "RSET"), 550);

		assert_eq!(snapshot(server.session()), before);
	}

	#[test]
	fn recipients_keep_order_and_duplicates() {
		let (mut server, _) = recording_server();
		send(&mut server, "HELO client.example");
		send(&mut server, "MAIL FROM:<a@example.com>");
		for rcpt in ["<c@example.com>", "<b@example.com>", "<c@example.com>"] {
			send(&mut server, &format!("RCPT TO:{}", rcpt));
		}

		let recipients: Vec<String> = server
			.session()
			.recipients
			.iter()
			.map(|rcpt| rcpt.to_string())
			.collect();
		assert_eq!(recipients, ["<c@example.com>", "<b@example.com>", "<c@example.com>"]);
	}

	#[test]
	fn rset_keeps_identification() {
		let (mut server, _) = recording_server();
		send(&mut server, "EHLO client.example");
		send(&mut server, "MAIL FROM:<a@example.com>");
		send(&mut server, "RCPT TO:<b@example.com>");

		assert_eq!(send(&mut server, "RSET"), Some(Response::ok()));

		let session = server.session();
		assert_eq!(
			session.identification,
			Identification::new(IdentificationMode::Ehlo, "client.example")
		);
		assert!(session.mail_from.is_none());
		assert!(session.recipients.is_empty());
		assert!(!session.has_data);

		// A new transaction can start without identifying again
		assert_eq!(code(&mut server, "MAIL FROM:<a@example.com>"), 250);
	}

	#[test]
	fn rset_leaves_data_mode() {
		let (mut server, _) = recording_server();
		send(&mut server, "HELO client.example");
		send(&mut server, "MAIL FROM:<a@example.com>");
		send(&mut server, "RCPT TO:<b@example.com>");
		send(&mut server, "DATA");
		assert!(server.in_data_mode());

		// In data mode RSET is message content, so go around the dispatcher
		assert_eq!(server.rset(), Response::ok());

		assert!(!server.in_data_mode());
		assert!(!server.session().has_data);
	}

	#[test]
	fn data_mode_lines_are_never_commands() {
		let (mut server, recorder) = recording_server();
		send(&mut server, "HELO client.example");
		send(&mut server, "MAIL FROM:<a@example.com>");
		send(&mut server, "RCPT TO:<b@example.com>");
		send(&mut server, "DATA");

		assert_eq!(send(&mut server, "QUIT"), None);
		assert_eq!(send(&mut server, "RSET"), None);
		assert_eq!(server.command(Command::Noop), None);
		assert!(!server.should_exit());
		assert!(server.in_data_mode());

		let calls = recorder.calls();
		assert_eq!(
			&calls[calls.len() - 3..],
			["data line QUIT", "data line RSET", "data line NOOP"]
		);
	}

	#[test]
	fn parsed_command_in_data_mode_is_sent_in_wire_form() {
		let (mut server, recorder) = recording_server();
		send(&mut server, "HELO client.example");
		send(&mut server, "MAIL FROM:<a@example.com>");
		send(&mut server, "RCPT TO:<b@example.com>");
		send(&mut server, "DATA");

		// The raw line keeps the client's spelling
		send(&mut server, "mail from: <c@example.com>");
		let parsed = Command::from_parts("mail", "from: <c@example.com>").unwrap();
		server.command(parsed);

		let calls = recorder.calls();
		assert_eq!(
			&calls[calls.len() - 2..],
			[
				"data line mail from: <c@example.com>",
				"data line MAIL FROM:<c@example.com>"
			]
		);
	}

	#[test]
	fn refused_message_stays_in_data_mode() {
		let recorder = Arc::new(Recorder::rejecting());
		let mut server = server_with(&recorder);
		server.session.identification = Identification::new(IdentificationMode::Helo, "c.example");
		server.session.mail_from = Some("<a@example.com>".parse().unwrap());
		server.session.recipients.push("<b@example.com>".parse().unwrap());
		server.session.in_data_mode = true;

		assert_eq!(code(&mut server, "."), 550);
		assert!(server.in_data_mode());

		// Still message content, not a command
		assert_eq!(send(&mut server, "NOOP"), None);
		assert_eq!(recorder.calls().last().unwrap(), "data line NOOP");
	}

	#[test]
	fn data_signals_outside_data_mode() {
		let (mut server, recorder) = recording_server();

		assert_eq!(server.data_line(b"stray"), Some(Response::bad_sequence()));
		assert_eq!(server.data_end(), Response::bad_sequence());
		assert!(recorder.calls().is_empty());
	}

	#[test]
	fn quit_changes_nothing_and_asks_no_one() {
		let (mut server, recorder) = recording_server();
		send(&mut server, "HELO client.example");
		send(&mut server, "MAIL FROM:<a@example.com>");
		let before = snapshot(server.session());
		let calls = recorder.calls();

		assert_eq!(send(&mut server, "quit"), Some(Response::disconnect()));
		assert!(server.should_exit());
		assert_eq!(snapshot(server.session()), before);
		assert_eq!(recorder.calls(), calls);
	}

	#[test]
	fn noop_is_idempotent() {
		let (mut server, _) = recording_server();
		send(&mut server, "HELO client.example");
		send(&mut server, "MAIL FROM:<a@example.com>");
		let before = snapshot(server.session());

		for _ in 0..3 {
			assert_eq!(send(&mut server, "NOOP"), Some(Response::ok()));
		}
		assert_eq!(snapshot(server.session()), before);
	}

	#[test]
	fn vrfy_needs_an_argument() {
		let (mut server, recorder) = recording_server();
		send(&mut server, "HELO client.example");

		assert_eq!(
			send(&mut server, "VRFY"),
			Some(Response::with_message(
				ResponseCode::InvalidParameters,
				"VRFY Missing parameter."
			))
		);
		assert_eq!(code(&mut server, "VRFY postmaster"), 252);
		assert_eq!(recorder.calls().last().unwrap(), "verify postmaster");
	}

	#[test]
	fn auth_echoes_its_argument() {
		let (mut server, _) = recording_server();

		assert_eq!(
			send(&mut server, "AUTH LOGIN"),
			Some(Response::with_message(ResponseCode::ServerChallenge, "LOGIN"))
		);
	}

	#[test]
	fn unknown_lines_go_to_raw_line_responder() {
		let (mut server, recorder) = recording_server();

		assert_eq!(code(&mut server, "XCLIENT ADDR=192.0.2.1"), 500);
		assert_eq!(recorder.calls(), ["raw XCLIENT ADDR=192.0.2.1"]);
	}

	#[test]
	fn dropping_in_data_mode_aborts_data() {
		let (mut server, recorder) = recording_server();
		send(&mut server, "HELO client.example");
		send(&mut server, "MAIL FROM:<a@example.com>");
		send(&mut server, "RCPT TO:<b@example.com>");
		send(&mut server, "DATA");
		drop(server);

		assert_eq!(recorder.calls().last().unwrap(), "data abort");
	}

	fn any_line() -> impl Strategy<Value = &'static str> {
		prop::sample::select(vec![
			"HELO client.example",
			"EHLO client.example",
			"HELO",
			"MAIL FROM:<a@example.com>",
			"MAIL FROM:<>",
			"MAIL FROM:broken",
			"RCPT TO:<b@example.com>",
			"RCPT TO:<postmaster>",
			"RCPT TO:broken",
			"DATA",
			"some message text",
			".",
			"RSET",
			"VRFY someone",
			"NOOP",
			"AUTH PLAIN",
			"GIBBERISH",
		])
	}

	proptest! {
		#[test]
		fn sequencing_invariant_holds(lines in prop::collection::vec(any_line(), 0..40)) {
			let (mut server, _) = recording_server();

			for line in lines {
				let was_in_data_mode = server.in_data_mode();
				let before = snapshot(server.session());
				send(&mut server, line);

				let session = server.session();
				if !session.recipients.is_empty() {
					prop_assert!(session.mail_from.is_some());
				}
				if session.mail_from.is_some() {
					prop_assert!(session.identification.is_identified());
				}
				if session.in_data_mode {
					prop_assert!(!session.recipients.is_empty());
				}
				if was_in_data_mode && line != "." {
					prop_assert_eq!(snapshot(session), before);
				}
			}
		}

		#[test]
		fn accepted_rset_always_clears_transaction(lines in prop::collection::vec(any_line(), 0..20)) {
			let (mut server, _) = recording_server();
			for line in lines {
				send(&mut server, line);
			}
			let identification = server.session().identification.clone();

			prop_assert_eq!(server.rset(), Response::ok());

			let session = server.session();
			prop_assert_eq!(&session.identification, &identification);
			prop_assert!(session.mail_from.is_none());
			prop_assert!(session.recipients.is_empty());
			prop_assert!(!session.has_data);
			prop_assert!(!session.in_data_mode);
		}
	}
}

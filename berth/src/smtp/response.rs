use std::fmt::Display;

/// A reply to send to the client: a reply code and one or more lines of text.
///
/// Responses compare by value, so a canonical reply built twice is still the
/// same reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
	pub code: ResponseCode,
	messages: Vec<String>,
}

impl Response {
	pub fn new(code: ResponseCode) -> Self {
		Self {
			code,
			messages: vec![],
		}
	}

	pub fn with_message<S: Into<String>>(code: ResponseCode, message: S) -> Self {
		Self {
			code,
			messages: vec![message.into()],
		}
	}

	/// Builds a response from a raw reply code, as responders configured with
	/// plain numbers do. Codes outside 200..=599 have no meaning in SMTP.
	pub fn from_code<S: Into<String>>(code: u16, message: S) -> Option<Self> {
		ResponseCode::from_code(code).map(|code| Self::with_message(code, message))
	}

	pub fn ok() -> Self {
		Self::with_message(ResponseCode::Okay, "2.0.0 OK")
	}

	/// Sent in answer to QUIT. The connection is closed after it is written.
	pub fn disconnect() -> Self {
		Self::with_message(ResponseCode::ServiceClosing, "2.0.0 Goodbye")
	}

	pub fn syntax_error() -> Self {
		Self::with_message(
			ResponseCode::InvalidParameters,
			"5.5.4 Syntax error in parameters or arguments",
		)
	}

	pub fn not_identified() -> Self {
		Self::with_message(ResponseCode::BadCommandSequence, "5.5.1 Use HELO/EHLO first.")
	}

	pub fn bad_sequence() -> Self {
		Self::with_message(
			ResponseCode::BadCommandSequence,
			"5.5.1 Bad sequence of commands",
		)
	}

	pub fn push<S: Into<String>>(&mut self, message: S) {
		self.messages.push(message.into());
	}

	pub fn code(&self) -> ResponseCode {
		self.code
	}

	pub fn messages(&self) -> &[String] {
		&self.messages
	}

	/// 2xx and 3xx replies accept the command.
	pub fn is_success(&self) -> bool {
		self.code.is_positive()
	}

	pub fn as_string(&self) -> String {
		let code = self.code.as_code();
		let mut ret = String::new();

		match self.messages.split_last() {
			None => ret.push_str(&format!("{} \r\n", code)),
			Some((last, rest)) => {
				for message in rest {
					ret.push_str(&format!("{}-{}\r\n", code, message));
				}
				ret.push_str(&format!("{} {}\r\n", code, last));
			}
		}

		ret
	}
}

impl Display for Response {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{} {}", self.code.as_code(), self.messages.join(" / "))
	}
}

#[derive(Clone, Copy, Debug)]
pub enum ResponseCode {
	UnrecognizedCommand,     // 500
	InvalidParameters,       // 501
	CommandNotImplemented,   // 502
	BadCommandSequence,      // 503
	ParameterNotImplemented, // 504

	SystemStatus,   // 211
	HelpMessage,    // 214
	ServiceReady,   // 220
	ServiceClosing, // 221

	ServiceNotAvailable, // 421 (Service not available, closing transmission channel)

	Okay,                    // 250
	UserNotLocalWillForward, // 251 (will forward to <forward-path>)
	CannotVrfyUser,          // 252 (but will attempt delivery)

	UnableToAcceptParameters,  // 455
	MailRcptParametersError,   // 555
	TemporaryMailFail,         // 450 (action not taken: mailbox unavailable)
	PermanentMailFail,         // 550
	ProcessingError,           // 451
	UserNotLocal,              // 551 (please try <forward-path>)
	InsufficientStorage,       // 452
	ExceededStorageAllocation, // 552
	MailboxNameNotAllowed,     // 553

	ServerChallenge, // 334
	StartMailInput,  // 354
	TransactionFail, // 554

	UnknownPositiveCompletion(u16), // 2xx
	UnknownPositiveWaiting(u16),    // 3xx
	UnknownNegativeTemporary(u16),  // 4xx
	UnknownNegativePermanent(u16),  // 5xx
}

impl PartialEq for ResponseCode {
	fn eq(&self, other: &Self) -> bool {
		self.as_code() == other.as_code()
	}
}

impl Eq for ResponseCode {}

impl ResponseCode {
	pub fn from_code(code: u16) -> Option<ResponseCode> {
		let response_code = match code {
			500 => ResponseCode::UnrecognizedCommand,
			501 => ResponseCode::InvalidParameters,
			502 => ResponseCode::CommandNotImplemented,
			503 => ResponseCode::BadCommandSequence,
			504 => ResponseCode::ParameterNotImplemented,

			211 => ResponseCode::SystemStatus,
			214 => ResponseCode::HelpMessage,
			220 => ResponseCode::ServiceReady,
			221 => ResponseCode::ServiceClosing,

			421 => ResponseCode::ServiceNotAvailable,

			250 => ResponseCode::Okay,
			251 => ResponseCode::UserNotLocalWillForward,
			252 => ResponseCode::CannotVrfyUser,

			455 => ResponseCode::UnableToAcceptParameters,
			555 => ResponseCode::MailRcptParametersError,
			450 => ResponseCode::TemporaryMailFail,
			550 => ResponseCode::PermanentMailFail,
			451 => ResponseCode::ProcessingError,
			551 => ResponseCode::UserNotLocal,
			452 => ResponseCode::InsufficientStorage,
			552 => ResponseCode::ExceededStorageAllocation,
			553 => ResponseCode::MailboxNameNotAllowed,

			334 => ResponseCode::ServerChallenge,
			354 => ResponseCode::StartMailInput,
			554 => ResponseCode::TransactionFail,

			_ => match code / 100 {
				2 => ResponseCode::UnknownPositiveCompletion(code),
				3 => ResponseCode::UnknownPositiveWaiting(code),
				4 => ResponseCode::UnknownNegativeTemporary(code),
				5 => ResponseCode::UnknownNegativePermanent(code),
				_ => return None,
			},
		};

		Some(response_code)
	}

	pub fn as_code(self) -> u16 {
		match self {
			ResponseCode::UnrecognizedCommand => 500,
			ResponseCode::InvalidParameters => 501,
			ResponseCode::CommandNotImplemented => 502,
			ResponseCode::BadCommandSequence => 503,
			ResponseCode::ParameterNotImplemented => 504,

			ResponseCode::SystemStatus => 211,
			ResponseCode::HelpMessage => 214,
			ResponseCode::ServiceReady => 220,
			ResponseCode::ServiceClosing => 221,

			ResponseCode::ServiceNotAvailable => 421,

			ResponseCode::Okay => 250,
			ResponseCode::UserNotLocalWillForward => 251,
			ResponseCode::CannotVrfyUser => 252,

			ResponseCode::UnableToAcceptParameters => 455,
			ResponseCode::MailRcptParametersError => 555,
			ResponseCode::TemporaryMailFail => 450,
			ResponseCode::PermanentMailFail => 550,
			ResponseCode::ProcessingError => 451,
			ResponseCode::UserNotLocal => 551,
			ResponseCode::InsufficientStorage => 452,
			ResponseCode::ExceededStorageAllocation => 552,
			ResponseCode::MailboxNameNotAllowed => 553,

			ResponseCode::ServerChallenge => 334,
			ResponseCode::StartMailInput => 354,
			ResponseCode::TransactionFail => 554,

			ResponseCode::UnknownPositiveCompletion(code)
			| ResponseCode::UnknownPositiveWaiting(code)
			| ResponseCode::UnknownNegativeTemporary(code)
			| ResponseCode::UnknownNegativePermanent(code) => code,
		}
	}

	pub fn is_negative(&self) -> bool {
		let first = self.as_code() / 100;

		first == 4 || first == 5
	}

	pub fn is_positive(&self) -> bool {
		let first = self.as_code() / 100;

		first == 2 || first == 3
	}
}

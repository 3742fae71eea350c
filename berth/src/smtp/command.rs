use std::{fmt::Display, str::FromStr};

use thiserror::Error;

/// A command line the session engine understands.
///
/// Arguments are kept as the client sent them (trimmed). Checking them is
/// part of the state machine's job, because which error wins depends on the
/// session state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
	Helo(String),
	Ehlo(String),
	/// Everything after `FROM:`
	Mail(String),
	/// Everything after `TO:`
	Rcpt(String),
	Data,
	Rset,
	Vrfy(String),
	Noop,
	Quit,
	Auth(String),
}

impl Command {
	/// Builds a command from a verb and its argument text, as a tokenizer
	/// hands them over.
	pub fn from_parts(name: &str, arguments: &str) -> Result<Self, ParseCommandError> {
		let arguments = arguments.trim();

		match name.to_ascii_uppercase().as_str() {
			"HELO" => Ok(Command::Helo(arguments.to_owned())),
			"EHLO" => Ok(Command::Ehlo(arguments.to_owned())),
			"MAIL" => Ok(Command::Mail(strip_keyword(arguments, "FROM:")?)),
			"RCPT" => Ok(Command::Rcpt(strip_keyword(arguments, "TO:")?)),
			"DATA" => Ok(Command::Data),
			"RSET" => Ok(Command::Rset),
			"VRFY" => Ok(Command::Vrfy(arguments.to_owned())),
			"NOOP" => Ok(Command::Noop),
			"QUIT" => Ok(Command::Quit),
			"AUTH" => Ok(Command::Auth(arguments.to_owned())),
			_ => Err(ParseCommandError::Unrecognized),
		}
	}
}

fn strip_keyword(arguments: &str, keyword: &'static str) -> Result<String, ParseCommandError> {
	match arguments.get(..keyword.len()) {
		Some(head) if head.eq_ignore_ascii_case(keyword) => {
			Ok(arguments[keyword.len()..].trim_start().to_owned())
		}
		_ => Err(ParseCommandError::MissingKeyword(keyword)),
	}
}

impl Display for Command {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Command::Helo(domain) => write!(f, "HELO {}", domain),
			Command::Ehlo(domain) => write!(f, "EHLO {}", domain),
			Command::Mail(reverse_path) => write!(f, "MAIL FROM:{}", reverse_path),
			Command::Rcpt(forward_path) => write!(f, "RCPT TO:{}", forward_path),
			Command::Data => write!(f, "DATA"),
			Command::Rset => write!(f, "RSET"),
			Command::Vrfy(target) => write!(f, "VRFY {}", target),
			Command::Noop => write!(f, "NOOP"),
			Command::Quit => write!(f, "QUIT"),
			Command::Auth(value) => write!(f, "AUTH {}", value),
		}
	}
}

impl FromStr for Command {
	type Err = ParseCommandError;

	/// Parses a whole command line. A trailing CRLF is ignored.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let line = s.trim_end_matches(['\r', '\n']);
		let (name, arguments) = line.split_once(' ').unwrap_or((line, ""));

		Self::from_parts(name, arguments)
	}
}

#[derive(Error, Debug, PartialEq)]
pub enum ParseCommandError {
	#[error("unknown command")]
	Unrecognized,
	#[error("missing '{0}'")]
	MissingKeyword(&'static str),
}

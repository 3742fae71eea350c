use std::{fmt::Display, str::FromStr};

use thiserror::Error;

use super::Validator;

/// The part of a mailbox before the `@`, kept exactly as the client sent it.
#[derive(Clone, Hash, PartialEq, Eq, Debug)]
pub struct LocalPart(String);

impl LocalPart {
	pub fn is_quoted(&self) -> bool {
		self.0.starts_with('"')
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl Display for LocalPart {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl FromStr for LocalPart {
	type Err = InvalidLocalPart;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if Validator::validate_local_part(s) {
			Ok(Self(s.to_owned()))
		} else {
			Err(InvalidLocalPart::InvalidSyntax)
		}
	}
}

#[derive(Error, Debug)]
pub enum InvalidLocalPart {
	#[error("invalid local part syntax")]
	InvalidSyntax,
}

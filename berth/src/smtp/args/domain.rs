use super::Validator;
use std::{
	fmt::Display,
	net::{AddrParseError, IpAddr},
	str::FromStr,
};
use thiserror::Error;

/// The domain part of a path or a HELO/EHLO argument: either a hostname or an
/// address literal.
#[derive(Clone, Hash, PartialEq, Eq, Debug)]
pub enum Domain {
	Name(String),
	Literal(IpAddr),
}

impl Domain {
	/// Compares two domains the way mail routing does. Hostnames are
	/// case-insensitive, literals compare by address.
	pub fn matches(&self, other: &Domain) -> bool {
		match (self, other) {
			(Self::Name(ours), Self::Name(theirs)) => ours.eq_ignore_ascii_case(theirs),
			(Self::Literal(ours), Self::Literal(theirs)) => ours == theirs,
			_ => false,
		}
	}

	pub fn is_literal(&self) -> bool {
		matches!(self, Self::Literal(_))
	}
}

impl Display for Domain {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Name(name) => write!(f, "{}", name),
			Self::Literal(IpAddr::V4(ip)) => write!(f, "[{}]", ip),
			Self::Literal(IpAddr::V6(ip)) => write!(f, "[IPv6:{}]", ip),
		}
	}
}

impl FromStr for Domain {
	type Err = ParseDomainError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if Validator::validate_domain(s) {
			return Ok(Self::Name(s.into()));
		}

		let literal = s
			.strip_prefix('[')
			.and_then(|s| s.strip_suffix(']'))
			.ok_or(ParseDomainError::InvalidDomain)?;

		// Only parse IPv6 if the literal is tagged as one
		let ip = match literal.strip_prefix("IPv6:") {
			Some(v6) => IpAddr::V6(v6.parse()?),
			None => IpAddr::V4(literal.parse()?),
		};

		Ok(Self::Literal(ip))
	}
}

#[derive(Error, Debug)]
pub enum ParseDomainError {
	#[error("failed to parse address literal")]
	AddrParseError(#[from] AddrParseError),
	#[error("invalid domain or address literal")]
	InvalidDomain,
}

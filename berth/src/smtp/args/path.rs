use super::{
	localpart::{InvalidLocalPart, LocalPart},
	Domain, ParseDomainError,
};
use std::{
	fmt::{Display, Formatter},
	str::FromStr,
};
use thiserror::Error;

/// A mailbox in angle brackets. A source route, if the client sent one, is
/// validated and then dropped as RFC 5321 section 4.1.1.3 allows.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Path {
	pub local_part: LocalPart,
	pub domain: Domain,
}

impl Path {
	pub fn new(local_part: LocalPart, domain: Domain) -> Self {
		Self { local_part, domain }
	}

	fn parse_mailbox(mailbox: &str) -> Result<Self, ParsePathError> {
		let (local_part, domain) = mailbox.rsplit_once('@').ok_or(ParsePathError::NoAtSign)?;

		Ok(Self {
			local_part: local_part.parse()?,
			domain: domain.parse()?,
		})
	}

	/// Validates an `@one,@two` source route.
	fn validate_adl(adl: &str) -> Result<(), ParsePathError> {
		for domain in adl.split(',') {
			let domain = domain
				.strip_prefix('@')
				.ok_or(ParsePathError::InvalidAdlSyntax)?;
			Domain::from_str(domain)?;
		}

		Ok(())
	}
}

impl Display for Path {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "<{}@{}>", self.local_part, self.domain)
	}
}

impl FromStr for Path {
	type Err = ParsePathError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let inner = s
			.strip_prefix('<')
			.and_then(|s| s.strip_suffix('>'))
			.ok_or(ParsePathError::Brackets)?;

		if inner.starts_with('@') {
			let (adl, mailbox) = inner
				.split_once(':')
				.ok_or(ParsePathError::AdlWithoutColon)?;
			Self::validate_adl(adl)?;
			Self::parse_mailbox(mailbox)
		} else {
			Self::parse_mailbox(inner)
		}
	}
}

/// The argument of `RCPT TO:`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ForwardPath {
	Postmaster,
	Regular(Path),
}

impl Display for ForwardPath {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Postmaster => write!(f, "<postmaster>"),
			Self::Regular(path) => write!(f, "{}", path),
		}
	}
}

impl FromStr for ForwardPath {
	type Err = ParsePathError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s.eq_ignore_ascii_case("<postmaster>") {
			return Ok(Self::Postmaster);
		}

		let routed_postmaster = s
			.len()
			.checked_sub(":postmaster>".len())
			.and_then(|at| s.get(at..).map(|tail| (at, tail)))
			.filter(|(_, tail)| tail.eq_ignore_ascii_case(":postmaster>"));

		match routed_postmaster {
			Some((at, _)) => {
				let adl = s[..at]
					.strip_prefix('<')
					.ok_or(ParsePathError::Brackets)?;
				Path::validate_adl(adl)?;
				Ok(Self::Postmaster)
			}
			None => Ok(Self::Regular(s.parse()?)),
		}
	}
}

/// The argument of `MAIL FROM:`. `<>` is the null path used for bounces.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ReversePath {
	Null,
	Regular(Path),
}

impl Display for ReversePath {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Null => write!(f, "<>"),
			Self::Regular(path) => write!(f, "{}", path),
		}
	}
}

impl FromStr for ReversePath {
	type Err = ParsePathError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s == "<>" {
			Ok(Self::Null)
		} else {
			Ok(Self::Regular(s.parse()?))
		}
	}
}

#[derive(Error, Debug)]
pub enum ParsePathError {
	#[error("no enclosing angle brackets")]
	Brackets,
	#[error("no @")]
	NoAtSign,
	#[error("ADL syntax without colon")]
	AdlWithoutColon,
	#[error("invalid ADL syntax")]
	InvalidAdlSyntax,
	#[error("invalid local part")]
	InvalidLocalPart(#[from] InvalidLocalPart),
	#[error("invalid domain")]
	InvalidDomain(#[from] ParseDomainError),
}

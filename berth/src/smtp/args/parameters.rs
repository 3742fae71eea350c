use std::{
	fmt::{Display, Formatter},
	str::FromStr,
};

use thiserror::Error;

use super::{ForwardPath, ParsePathError, ReversePath, Validator};

/// One ESMTP `keyword[=value]` pair following a path.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Parameter {
	pub keyword: String,
	pub value: Option<String>,
}

impl Display for Parameter {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match &self.value {
			Some(value) => write!(f, "{}={}", self.keyword, value),
			None => write!(f, "{}", self.keyword),
		}
	}
}

impl FromStr for Parameter {
	type Err = ParseParameterError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let (keyword, value) = match s.split_once('=') {
			Some((keyword, value)) => (keyword, Some(value)),
			None => (s, None),
		};

		if !Validator::validate_esmtp_keyword(keyword) {
			return Err(ParseParameterError::InvalidKeyword(keyword.into()));
		}

		if let Some(value) = value {
			if !Validator::validate_esmtp_value(value) {
				return Err(ParseParameterError::InvalidValue(keyword.into()));
			}
		}

		Ok(Self {
			keyword: keyword.into(),
			value: value.map(String::from),
		})
	}
}

/// The ESMTP parameters of a MAIL or RCPT command, in the order they were sent.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct Parameters(Vec<Parameter>);

impl Parameters {
	/// Looks a parameter up by keyword, ignoring case. The outer option is
	/// whether the keyword was present at all.
	pub fn get(&self, keyword: &str) -> Option<Option<&str>> {
		self.0
			.iter()
			.find(|param| param.keyword.eq_ignore_ascii_case(keyword))
			.map(|param| param.value.as_deref())
	}

	pub fn contains(&self, keyword: &str) -> bool {
		self.get(keyword).is_some()
	}

	pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
		self.0.iter()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl Display for Parameters {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		let mut first = true;
		for param in &self.0 {
			if !first {
				write!(f, " ")?;
			}
			write!(f, "{}", param)?;
			first = false;
		}
		Ok(())
	}
}

impl FromStr for Parameters {
	type Err = ParseParameterError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		s.split_whitespace()
			.map(str::parse)
			.collect::<Result<Vec<Parameter>, _>>()
			.map(Self)
	}
}

#[derive(Error, Debug, PartialEq)]
pub enum ParseParameterError {
	#[error("'{0}' is not a valid parameter keyword")]
	InvalidKeyword(String),
	#[error("parameter '{0}' has an invalid value")]
	InvalidValue(String),
}

/// A path together with the ESMTP parameters that followed it on the command
/// line. Parsing is all-or-nothing.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PathWithParameters<P> {
	pub path: P,
	pub parameters: Parameters,
}

pub type MailFrom = PathWithParameters<ReversePath>;
pub type RcptTo = PathWithParameters<ForwardPath>;

impl<P> PathWithParameters<P> {
	pub fn new(path: P) -> Self {
		Self {
			path,
			parameters: Parameters::default(),
		}
	}
}

/// Splits `<path> params` after the closing bracket of the path. A `>`
/// inside a quoted local part does not end the path.
fn split_path(s: &str) -> (&str, &str) {
	let mut quoted = false;
	let mut escaped = false;

	for (at, c) in s.char_indices() {
		match c {
			_ if escaped => escaped = false,
			'\\' if quoted => escaped = true,
			'"' => quoted = !quoted,
			'>' if !quoted => return s.split_at(at + 1),
			_ => (),
		}
	}

	(s, "")
}

impl<P> FromStr for PathWithParameters<P>
where
	P: FromStr<Err = ParsePathError>,
{
	type Err = ParseArgumentError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let (path, parameters) = split_path(s.trim());

		// Parameters must be separated from the path
		if !parameters.is_empty() && !parameters.starts_with(char::is_whitespace) {
			return Err(ParseArgumentError::MissingSeparator);
		}

		Ok(Self {
			path: path.parse()?,
			parameters: parameters.parse()?,
		})
	}
}

impl<P: Display> Display for PathWithParameters<P> {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		if self.parameters.is_empty() {
			write!(f, "{}", self.path)
		} else {
			write!(f, "{} {}", self.path, self.parameters)
		}
	}
}

#[derive(Error, Debug)]
pub enum ParseArgumentError {
	#[error("invalid path: {0}")]
	Path(#[from] ParsePathError),
	#[error("invalid parameter: {0}")]
	Parameter(#[from] ParseParameterError),
	#[error("no space between path and parameters")]
	MissingSeparator,
}

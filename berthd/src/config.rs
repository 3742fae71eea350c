use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use berth::smtp::args::{Domain, LocalPart};
use confindent::Confindent;
use getopts::{Matches, Options};
use thiserror::Error;

const DEFAULT_CONFIG: &str = "/etc/berth/berth.conf";
const FALLBACK_CONFIG: &str = "berth.conf";

pub struct Config {
	pub address: IpAddr,
	pub port: u16,
	pub hostnames: Vec<Domain>,
	/// Local parts we accept mail for. Empty accepts everyone.
	pub users: Vec<LocalPart>,
	pub max_message_size: Option<usize>,
}

impl Config {
	fn options() -> Options {
		let mut opts = Options::new();
		opts.optflag("h", "help", "Print this help message");
		opts.optopt(
			"l",
			"listen-address",
			"The IP address berthd will listen for incoming connections on\nDefault: 127.0.0.1",
			"IP_ADDR",
		);
		opts.optopt(
			"p",
			"port",
			"The port berthd will listen on\nDefault: 25",
			"PORT",
		);
		opts.optopt(
			"c",
			"config",
			"An alternate location to read the config from\nDefault: /etc/berth/berth.conf",
			"PATH",
		);
		opts
	}

	pub fn socket_address(&self) -> SocketAddr {
		SocketAddr::new(self.address, self.port)
	}

	/// Reads the command line and the config file. Returns None if the user
	/// only asked for help.
	pub fn get() -> Result<Option<Self>, ConfigError> {
		let args: Vec<String> = std::env::args().collect();
		let opts = Self::options();
		let matches = opts.parse(args.iter().skip(1))?;

		if matches.opt_present("help") {
			let program = args.first().map(String::as_str).unwrap_or("berthd");
			let brief = format!("Usage: {} [options]", program);
			println!("{}", opts.usage(&brief));
			return Ok(None);
		}

		let config = match matches.opt_str("config") {
			// An explicitly given file has to be there
			Some(path) => Some(
				Confindent::from_file(&path)
					.map_err(|e| ConfigError::ConfFile(format!("{}: {}", path, e)))?,
			),
			None => Confindent::from_file(DEFAULT_CONFIG)
				.or_else(|_| Confindent::from_file(FALLBACK_CONFIG))
				.ok(),
		};

		Self::from_parts(&matches, config.as_ref()).map(Some)
	}

	fn from_parts(matches: &Matches, config: Option<&Confindent>) -> Result<Self, ConfigError> {
		// Options given on the command line take priority. Config keys are the
		// option names in TitleCase so the two stay consistent.
		let find_value = |cli_key: &str| -> Option<String> {
			matches.opt_str(cli_key).or_else(|| {
				config
					.and_then(|c| c.child_value(conf_key(cli_key)))
					.map(String::from)
			})
		};
		let file_value = |key: &str| config.and_then(|c| c.child_value(key));

		let address = match find_value("listen-address") {
			None => IpAddr::V4(Ipv4Addr::LOCALHOST),
			Some(addr) => addr
				.parse()
				.map_err(|_| ConfigError::InvalidAddress(addr))?,
		};

		let port = match find_value("port") {
			None => 25,
			Some(port) => port.parse().map_err(|_| ConfigError::InvalidPort(port))?,
		};

		let hostnames = match file_value("Hostnames") {
			Some(joined) => parse_list(joined, ConfigError::InvalidHostname)?,
			None => {
				let host = gethostname::gethostname().to_string_lossy().into_owned();
				vec![host
					.parse()
					.unwrap_or_else(|_| Domain::Name("localhost".into()))]
			}
		};

		let users = match file_value("Users") {
			Some(joined) => parse_list(joined, ConfigError::InvalidUser)?,
			None => vec![],
		};

		let max_message_size = match file_value("MaxMessageSize") {
			None => None,
			Some(size) => Some(
				size.parse()
					.map_err(|_| ConfigError::InvalidSize(size.into()))?,
			),
		};

		Ok(Self {
			address,
			port,
			hostnames,
			users,
			max_message_size,
		})
	}
}

/// `listen-address` becomes `ListenAddress`.
fn conf_key(cli_key: &str) -> String {
	cli_key
		.split('-')
		.map(|word| {
			let mut c = word.chars();
			match c.next() {
				None => String::new(),
				Some(f) => f.to_uppercase().collect::<String>() + c.as_str(),
			}
		})
		.collect()
}

fn parse_list<T, F>(joined: &str, error: F) -> Result<Vec<T>, ConfigError>
where
	T: std::str::FromStr,
	F: Fn(String) -> ConfigError,
{
	joined
		.split(',')
		.map(str::trim)
		.filter(|item| !item.is_empty())
		.map(|item| item.parse().map_err(|_| error(item.into())))
		.collect()
}

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("{0}")]
	Arguments(#[from] getopts::Fail),
	#[error("failed to parse conf file {0}")]
	ConfFile(String),
	#[error("failed to parse '{0}' as an IP address")]
	InvalidAddress(String),
	#[error("failed to parse '{0}' as a port")]
	InvalidPort(String),
	#[error("failed to parse '{0}' as a domain")]
	InvalidHostname(String),
	#[error("failed to parse '{0}' as a local part")]
	InvalidUser(String),
	#[error("failed to parse '{0}' as a size in bytes")]
	InvalidSize(String),
}

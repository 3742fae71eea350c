use berth::{
	responder::{IdentificationResponder, MailFromResponder, RecipientToResponder},
	smtp::{
		args::{Domain, ForwardPath, LocalPart, MailFrom, Path, RcptTo},
		Identification, IdentificationMode, Response, ResponseCode, SessionInfo,
	},
};

use crate::config::Config;

/// Decides who may talk to us and who we take mail for. Nothing is relayed.
#[derive(Clone, Debug)]
pub struct ServerPolicy {
	hostnames: Vec<Domain>,
	users: Vec<LocalPart>,
	max_message_size: Option<usize>,
}

impl ServerPolicy {
	pub fn new(config: &Config) -> Self {
		Self {
			hostnames: config.hostnames.clone(),
			users: config.users.clone(),
			max_message_size: config.max_message_size,
		}
	}

	pub fn primary_host(&self) -> String {
		match self.hostnames.first() {
			Some(host) => host.to_string(),
			None => String::from("localhost"),
		}
	}

	fn path_is_local(&self, path: &Path) -> bool {
		self.hostnames.iter().any(|host| host.matches(&path.domain))
	}

	// An empty user list accepts every local part
	fn user_is_valid(&self, local: &LocalPart) -> bool {
		self.users.is_empty()
			|| self
				.users
				.iter()
				.any(|user| user.as_str().eq_ignore_ascii_case(local.as_str()))
	}
}

impl IdentificationResponder for ServerPolicy {
	fn verify_identification(
		&self,
		_session: &SessionInfo,
		identification: &Identification,
	) -> Response {
		if let Err(err) = identification.domain.parse::<Domain>() {
			return Response::with_message(
				ResponseCode::InvalidParameters,
				format!("5.5.2 Bad domain: {}", err),
			);
		}

		let mut response = Response::with_message(
			ResponseCode::Okay,
			format!("{} greets {}", self.primary_host(), identification.domain),
		);

		if identification.mode == IdentificationMode::Ehlo {
			if let Some(max) = self.max_message_size {
				response.push(format!("SIZE {}", max));
			}
		}

		response
	}
}

impl MailFromResponder for ServerPolicy {
	fn verify_mail_from(&self, _session: &SessionInfo, mail_from: &MailFrom) -> Response {
		let declared = mail_from.parameters.get("SIZE").flatten();

		if let (Some(max), Some(declared)) = (self.max_message_size, declared) {
			match declared.parse::<usize>() {
				Err(_) => {
					return Response::with_message(
						ResponseCode::MailRcptParametersError,
						"5.5.4 Invalid SIZE parameter",
					)
				}
				Ok(size) if size > max => {
					return Response::with_message(
						ResponseCode::ExceededStorageAllocation,
						"5.3.4 Message size exceeds fixed maximum message size",
					)
				}
				Ok(_) => (),
			}
		}

		Response::with_message(ResponseCode::Okay, "2.1.0 Ok")
	}
}

impl RecipientToResponder for ServerPolicy {
	fn verify_recipient_to(&self, _session: &SessionInfo, recipient: &RcptTo) -> Response {
		let path = match &recipient.path {
			ForwardPath::Postmaster => {
				return Response::with_message(ResponseCode::Okay, "2.1.5 Ok")
			}
			ForwardPath::Regular(path) => path,
		};

		if !self.path_is_local(path) {
			Response::with_message(ResponseCode::PermanentMailFail, "5.7.1 Relaying denied")
		} else if !self.user_is_valid(&path.local_part) {
			Response::with_message(
				ResponseCode::PermanentMailFail,
				"5.1.1 Mailbox unavailable",
			)
		} else {
			Response::with_message(ResponseCode::Okay, "2.1.5 Ok")
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn policy() -> ServerPolicy {
		ServerPolicy {
			hostnames: vec!["example.com".parse().unwrap()],
			users: vec!["alice".parse().unwrap()],
			max_message_size: Some(1000),
		}
	}

	fn rcpt(policy: &ServerPolicy, path: &str) -> Response {
		policy.verify_recipient_to(&SessionInfo::new(), &path.parse().unwrap())
	}

	fn mail(policy: &ServerPolicy, arguments: &str) -> Response {
		policy.verify_mail_from(&SessionInfo::new(), &arguments.parse().unwrap())
	}

	#[test]
	fn identification_needs_a_real_domain() {
		let policy = policy();
		let session = SessionInfo::new();

		let bad = Identification::new(IdentificationMode::Helo, "not a domain");
		let response = policy.verify_identification(&session, &bad);
		assert_eq!(response.code, ResponseCode::InvalidParameters);
		assert!(response.messages()[0].starts_with("5.5.2 Bad domain: "));

		let literal = Identification::new(IdentificationMode::Helo, "[192.0.2.1]");
		assert!(policy.verify_identification(&session, &literal).is_success());
	}

	#[test]
	fn ehlo_advertises_size() {
		let policy = policy();
		let session = SessionInfo::new();

		let ehlo = Identification::new(IdentificationMode::Ehlo, "client.example");
		let response = policy.verify_identification(&session, &ehlo);
		assert_eq!(
			response.messages(),
			["example.com greets client.example", "SIZE 1000"]
		);

		let helo = Identification::new(IdentificationMode::Helo, "client.example");
		assert_eq!(policy.verify_identification(&session, &helo).messages().len(), 1);
	}

	#[test]
	fn declared_size_over_limit() {
		let policy = policy();

		assert!(mail(&policy, "<a@else.example> SIZE=999").is_success());
		assert!(mail(&policy, "<>").is_success());
		assert_eq!(
			mail(&policy, "<a@else.example> SIZE=1001").code,
			ResponseCode::ExceededStorageAllocation
		);
		assert_eq!(
			mail(&policy, "<a@else.example> SIZE=lots").code,
			ResponseCode::MailRcptParametersError
		);
	}

	#[test]
	fn recipients() {
		let policy = policy();

		assert!(rcpt(&policy, "<postmaster>").is_success());
		assert!(rcpt(&policy, "<alice@example.com>").is_success());
		assert!(rcpt(&policy, "<Alice@EXAMPLE.com>").is_success());
		assert_eq!(
			rcpt(&policy, "<bob@example.com>").messages(),
			["5.1.1 Mailbox unavailable"]
		);
		assert_eq!(
			rcpt(&policy, "<alice@else.example>").messages(),
			["5.7.1 Relaying denied"]
		);
	}

	#[test]
	fn empty_user_list_accepts_anyone() {
		let policy = ServerPolicy {
			users: vec![],
			..policy()
		};

		assert!(rcpt(&policy, "<anyone@example.com>").is_success());
	}
}

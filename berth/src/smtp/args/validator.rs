use pest::Parser;
use pest_derive::*;

#[derive(Parser)]
#[grammar = "smtp/args/smtp_grammar.pest"]
struct GrammarParser;

/// Syntax checks for the pieces of MAIL and RCPT arguments.
pub struct Validator;
impl Validator {
	pub fn validate_local_part(local: &str) -> bool {
		GrammarParser::parse(Rule::validate_local_part, local).is_ok()
	}

	/// Checks hostname syntax only. Address literals are handled by [super::Domain].
	pub fn validate_domain(domain: &str) -> bool {
		GrammarParser::parse(Rule::validate_domain, domain).is_ok()
	}

	pub fn validate_esmtp_keyword(keyword: &str) -> bool {
		GrammarParser::parse(Rule::validate_esmtp_keyword, keyword).is_ok()
	}

	pub fn validate_esmtp_value(value: &str) -> bool {
		GrammarParser::parse(Rule::validate_esmtp_value, value).is_ok()
	}
}

pub mod args;
mod command;
mod message;
mod response;
mod server;
mod session;

pub use command::{Command, ParseCommandError};
pub use message::Envelope;
pub use response::{Response, ResponseCode};
pub use server::Server;
pub use session::{Identification, IdentificationMode, SessionId, SessionInfo};

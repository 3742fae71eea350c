mod domain;
mod localpart;
mod parameters;
mod path;
mod validator;

pub use domain::*;
pub use localpart::*;
pub use parameters::*;
pub use path::*;
pub use validator::*;

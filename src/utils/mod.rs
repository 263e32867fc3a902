pub mod parameter_error_handler;
pub mod validate;

pub use parameter_error_handler::{json_error_handler, query_error_handler};
pub use validate::validate_email;

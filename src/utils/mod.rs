pub mod jwt;
pub mod logging;
pub mod redirect_validator;

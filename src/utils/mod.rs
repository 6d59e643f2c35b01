pub mod password;
pub mod token;
pub mod keys;
pub mod geo;
pub mod parsing;
pub mod validation;

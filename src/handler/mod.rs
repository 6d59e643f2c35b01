pub mod auth;
pub mod users;
pub mod profile;
pub mod jobs;
pub mod applications;
pub mod recommendations;
pub mod contact;

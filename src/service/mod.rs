pub mod error;
pub mod geocoding;
pub mod media;
pub mod contact_service;
pub mod google_oauth;
pub mod job_service;
pub mod matching_service;

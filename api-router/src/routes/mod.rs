pub mod ask_question;
pub mod liveness;
pub mod process_urls;
pub mod readiness;

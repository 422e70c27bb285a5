pub mod error;
pub mod retry;
pub mod swagger_doc;

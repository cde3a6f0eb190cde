pub mod attachments;
pub mod config;
pub mod convert;
pub mod dates;
pub mod document;
pub mod export;
pub mod media;
pub mod output;
pub mod paths;

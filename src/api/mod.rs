pub mod client;
pub mod error;
pub mod types;

pub use client::JobBuddyClient;
pub use error::ApiError;
pub use types::{GenerateOptions, SubmitReceipt};

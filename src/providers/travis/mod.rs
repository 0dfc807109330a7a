mod client;
mod provider;

pub use client::DEFAULT_API_URL;
pub use provider::{TravisProvider, DEFAULT_DOCS_URL, DEFAULT_WEB_URL};

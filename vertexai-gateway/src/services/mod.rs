pub mod credentials;
pub mod providers;

pub use credentials::{Credentials, TokenSource};
pub use providers::{ContentProvider, GeneratedContent, GenerationParams, ProviderError};

pub mod metrics;
pub mod oauth;
pub mod providers;

pub use oauth::{
    google::GoogleIdentityProvider, mock::MockIdentityProvider, IdentityError, IdentityProfile,
    IdentityProvider,
};
pub use providers::{
    gemini::GeminiProvider, mock::MockAnswerProvider, AnswerProvider, ProviderError,
};

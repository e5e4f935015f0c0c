pub mod client;
pub mod session;
pub mod transport;

pub use client::ApiClient;
pub use session::{Credentials, SessionManager, SessionState};
pub use transport::{ReqwestTransport, Transport};

/// Fixed headers every request carries
pub const LANG: &str = "en";
pub const APP_CODE: &str = "1";

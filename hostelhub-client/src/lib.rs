//! Client side of HostelHub: a typed HTTP client for the API, the session
//! lifecycle that replaces browser storage, the navigation gate, and the
//! debouncer behind the student search box.

pub mod api;
pub mod error;
pub mod forms;
pub mod gate;
pub mod models;
pub mod search;
pub mod session;

pub use api::ApiClient;
pub use error::ClientError;
pub use gate::{destination, Destination, Page};
pub use search::SearchDebouncer;
pub use session::{Session, SessionStore};

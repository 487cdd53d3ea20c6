pub mod auth;
pub mod error;
pub mod handlers;
pub mod responses;
pub mod router;
pub mod service;

pub use error::ApiError;
pub use router::{route, AppState};
pub use service::{AttachmentLocation, TodoList, TodoService};

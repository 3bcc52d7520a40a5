mod adapter;
pub use adapter::ServiceApiAdapter;

mod error;
pub use error::ApiError;

mod handler;
pub use handler::ApiHandler;

mod http;
pub use http::{HttpApi, signature_header};

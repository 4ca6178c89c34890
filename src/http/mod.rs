pub mod classify;
pub mod pipeline;
pub mod transport;

pub use classify::{classify, Outcome, Payload, RawResponse, ResponseKind, StatusClass, TransportFailure};
pub use pipeline::{ApiClient, RequestConfig, RequestDefaults};
pub use transport::{PreparedRequest, ReqwestTransport, Transport};

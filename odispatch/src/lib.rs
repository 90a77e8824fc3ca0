//! Request construction, upstream HTTP dispatch and result classification for OpenAPI tools.

mod corrector;
mod dispatcher;
mod enrich;
mod error;
mod error_model;
mod hooks;
mod request;
mod transport;

pub mod prelude;

pub use corrector::DoubleSerializationCorrector;
pub use dispatcher::{COMPLETED_MESSAGE, Dispatcher, ToolResult};
pub use enrich::{
    EnrichError, EnricherChain, ForwardedHost, RequestEnricher, USER_AGENT, UserAgentEnricher,
    X_FORWARDED_FOR, X_FORWARDED_HOST, X_FORWARDED_PORT, X_FORWARDED_PROTO,
    XForwardedForEnricher, XForwardedHostEnricher,
};
pub use error::{TransportError, TransportErrorKind};
pub use error_model::{DefaultErrorModelProvider, ErrorModel, ErrorModelProvider};
pub use hooks::{DispatchHooks, NoopDispatchHooks};
pub use request::{DecomposedRequestData, JSON_CONTENT_TYPE, ParametersByType, RequestBody};
#[cfg(feature = "http-transport")]
pub use transport::ReqwestTransport;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, TransportFuture};

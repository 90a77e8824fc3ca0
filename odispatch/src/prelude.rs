//! Common `odispatch` imports for downstream crates.

pub use crate::{
    DecomposedRequestData, DispatchHooks, Dispatcher, DoubleSerializationCorrector, EnricherChain,
    ErrorModelProvider, HttpRequest, HttpResponse, HttpTransport, NoopDispatchHooks,
    ParametersByType, RequestBody, RequestEnricher, ToolResult, TransportError,
    TransportErrorKind, TransportFuture,
};
#[cfg(feature = "http-transport")]
pub use crate::ReqwestTransport;
pub use ocommon::{BoxFuture, HeaderList, RequestContext};

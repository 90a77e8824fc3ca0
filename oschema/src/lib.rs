//! OpenAPI document model, schema graph, and the document filters that prepare schemas for
//! tool composition.

mod document;
mod error;
mod filter;
mod flatten;
mod graph;
mod render;
mod walker;

pub mod prelude {
    pub use crate::{
        DiscriminatorFlattener, FilterChain, HttpMethod, OpenApiDocument, OpenApiFilter,
        OperationDescriptor, ParameterDescriptor, ParameterLocation, PatternPropertyRemover,
        SchemaError, SchemaErrorKind, SchemaGraph, SchemaId, SchemaNode, SchemaType,
        SchemaWalker, SpecVersion,
    };
}

pub use document::{
    ApiInfo, HttpMethod, MediaTypeDescriptor, OpenApiDocument, OperationDescriptor,
    ParameterDescriptor, ParameterLocation, RequestBodyDescriptor, ResponseDescriptor,
    ServerDescriptor, SpecVersion,
};
pub use error::{SchemaError, SchemaErrorKind};
pub use filter::{FilterChain, OpenApiFilter, PatternPropertyRemover};
pub use flatten::DiscriminatorFlattener;
pub use graph::{
    AdditionalProperties, Discriminator, SchemaGraph, SchemaId, SchemaNode, SchemaType,
    reference_name,
};
pub use walker::SchemaWalker;

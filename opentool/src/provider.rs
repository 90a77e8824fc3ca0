//! Loads the OpenAPI document, builds its tools and publishes them as one catalog.
//!
//! Reload builds a complete replacement catalog before swapping it in, so calls in
//! flight keep running against the catalog they started with.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use ocommon::RequestContext;
use odispatch::{Dispatcher, EnricherChain, HttpTransport};
use oschema::{FilterChain, OpenApiDocument};
use otooling::{
    DefaultToolRuntime, InputSchemaComposer, ReloadHooks, ReloadStatus, ToolCall, ToolCallFilter,
    ToolDefinition, ToolError, ToolFactory, ToolFuture, ToolRegistry, ToolResult, ToolResultMocker,
    ToolRuntime,
};
use url::Url;

use crate::{BridgeConfig, BridgeError, BridgeHooks, DocumentSource};

/// Everything built from one version of the document.
pub struct ToolCatalog {
    document: OpenApiDocument,
    base_url: String,
    registry: Arc<ToolRegistry>,
    runtime: DefaultToolRuntime,
}

impl ToolCatalog {
    pub fn document(&self) -> &OpenApiDocument {
        &self.document
    }

    /// `info.version` of the document this catalog was built from.
    pub fn version(&self) -> &str {
        &self.document.info.version
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn registry(&self) -> Arc<ToolRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn runtime(&self) -> &DefaultToolRuntime {
        &self.runtime
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.registry.definitions()
    }
}

impl std::fmt::Debug for ToolCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolCatalog")
            .field("version", &self.version())
            .field("base_url", &self.base_url)
            .field("tools", &self.registry.names())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadOutcome {
    NoChange,
    ToolsUpdated {
        added: Vec<String>,
        changed: Vec<String>,
        removed: Vec<String>,
    },
}

impl ReloadOutcome {
    pub fn status(&self) -> ReloadStatus {
        match self {
            Self::NoChange => ReloadStatus::SuccessNoChange,
            Self::ToolsUpdated { .. } => ReloadStatus::SuccessToolsUpdated,
        }
    }
}

pub struct OpenApiProvider {
    builder: CatalogBuilder,
    catalog: RwLock<Arc<ToolCatalog>>,
}

impl OpenApiProvider {
    pub async fn load(
        config: BridgeConfig,
        source: Arc<dyn DocumentSource>,
        transport: Arc<dyn HttpTransport>,
        hooks: BridgeHooks,
    ) -> Result<Self, BridgeError> {
        Self::load_with_filters(config, source, transport, hooks, Vec::new()).await
    }

    /// Like [`OpenApiProvider::load`], with extra tool-call filters installed on every catalog.
    pub async fn load_with_filters(
        config: BridgeConfig,
        source: Arc<dyn DocumentSource>,
        transport: Arc<dyn HttpTransport>,
        hooks: BridgeHooks,
        filters: Vec<Arc<dyn ToolCallFilter>>,
    ) -> Result<Self, BridgeError> {
        config.validate()?;
        let builder = CatalogBuilder {
            config,
            source,
            transport,
            hooks,
            filters,
        };

        let document = builder.fetch_document().await?;
        let catalog = builder.build(document)?;
        tracing::info!(
            api = %catalog.document.info.title,
            version = %catalog.version(),
            base_url = %catalog.base_url,
            tools = catalog.registry.len(),
            "loaded OpenAPI document"
        );

        Ok(Self {
            builder,
            catalog: RwLock::new(Arc::new(catalog)),
        })
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.builder.config
    }

    /// The catalog currently published. Holders keep it alive across a reload.
    pub fn catalog(&self) -> Arc<ToolCatalog> {
        let guard = self.catalog.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.catalog().definitions()
    }

    pub fn reload_hooks(&self) -> Arc<dyn ReloadHooks> {
        Arc::clone(&self.builder.hooks.reload)
    }

    /// Re-reads the document and swaps in a new catalog when `info.version` moved.
    pub async fn reload(&self) -> Result<ReloadOutcome, BridgeError> {
        let document = self.builder.fetch_document().await?;

        let current = self.catalog();
        if document.info.version == current.version() {
            tracing::debug!(version = %current.version(), "document version unchanged");
            return Ok(ReloadOutcome::NoChange);
        }

        let next = Arc::new(self.builder.build(document)?);
        let outcome = diff_tools(&current.definitions(), &next.definitions());
        tracing::info!(
            previous_version = %current.version(),
            version = %next.version(),
            outcome = ?outcome,
            "published reloaded tool catalog"
        );

        let mut guard = self.catalog.write().unwrap_or_else(PoisonError::into_inner);
        *guard = next;
        Ok(outcome)
    }
}

/// The inputs every catalog is built from.
struct CatalogBuilder {
    config: BridgeConfig,
    source: Arc<dyn DocumentSource>,
    transport: Arc<dyn HttpTransport>,
    hooks: BridgeHooks,
    filters: Vec<Arc<dyn ToolCallFilter>>,
}

impl CatalogBuilder {
    async fn fetch_document(&self) -> Result<OpenApiDocument, BridgeError> {
        let text = self.source.fetch().await?;
        Ok(OpenApiDocument::parse(&text)?)
    }

    fn build(&self, mut document: OpenApiDocument) -> Result<ToolCatalog, BridgeError> {
        FilterChain::standard()
            .with_enabled(self.config.filters.clone())
            .apply(&mut document)?;

        let base_url = resolve_base_url(&self.config, &document, self.source.location())?;
        let dispatcher = Dispatcher::new(Arc::clone(&self.transport), base_url.clone())
            .with_enrichers(EnricherChain::standard(self.config.user_agent.clone()))
            .with_hooks(Arc::clone(&self.hooks.dispatch))
            .with_double_serialization_mitigation(
                self.config.tools.json_double_serialization_mitigation,
            );

        let tools = &self.config.tools;
        let registry = ToolFactory::from_config(
            &tools.naming,
            InputSchemaComposer::new(tools.schema.clone()),
        )?
        .with_prepend_summary_to_description(tools.prepend_summary_to_description)
        .build(&mut document, Arc::new(dispatcher))?;
        let registry = Arc::new(registry);

        let mut filters = self.filters.clone();
        if tools.mock {
            filters.push(Arc::new(ToolResultMocker));
        }
        let runtime = DefaultToolRuntime::new(Arc::clone(&registry))
            .with_filters(filters)
            .with_hooks(Arc::clone(&self.hooks.tools));

        Ok(ToolCatalog {
            document,
            base_url,
            registry,
            runtime,
        })
    }
}

impl ToolRuntime for OpenApiProvider {
    fn execute<'a>(
        &'a self,
        tool_call: ToolCall,
        context: &'a RequestContext,
    ) -> ToolFuture<'a, Result<ToolResult, ToolError>> {
        Box::pin(async move {
            let catalog = self.catalog();
            catalog.runtime.execute(tool_call, context).await
        })
    }
}

impl std::fmt::Debug for OpenApiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenApiProvider")
            .field("source", &self.builder.source)
            .field("transport", &self.builder.transport)
            .field("version", &self.catalog().version())
            .finish_non_exhaustive()
    }
}

/// Explicit URL first, then the configured server index, then the first server.
///
/// Relative server URLs are joined onto the document location when it is known.
pub fn resolve_base_url(
    config: &BridgeConfig,
    document: &OpenApiDocument,
    location: Option<&str>,
) -> Result<String, BridgeError> {
    if let Some(url) = config
        .api_base_url
        .as_deref()
        .filter(|url| !url.trim().is_empty())
    {
        Url::parse(url)
            .map_err(|err| BridgeError::config(format!("invalid apiBaseUrl {url}: {err}")))?;
        return Ok(url.to_string());
    }

    if document.servers.is_empty() {
        return Err(BridgeError::config(
            "no servers defined in the OpenAPI document; define servers or set apiBaseUrl",
        ));
    }
    let index = config.server_index.unwrap_or(0);
    let server = document.servers.get(index).ok_or_else(|| {
        BridgeError::config(format!(
            "server index {index} is out of bounds; the document defines {} server(s)",
            document.servers.len()
        ))
    })?;
    if server.url.trim().is_empty() {
        return Err(BridgeError::config(format!(
            "server at index {index} has no URL"
        )));
    }

    match Url::parse(&server.url) {
        Ok(_) => Ok(server.url.clone()),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let location = location.ok_or_else(|| {
                BridgeError::config(format!(
                    "server URL {} is relative and the document location is unknown",
                    server.url
                ))
            })?;
            let joined = Url::parse(location)
                .and_then(|base| base.join(&server.url))
                .map_err(|err| {
                    BridgeError::config(format!(
                        "cannot resolve {} against {location}: {err}",
                        server.url
                    ))
                })?;
            Ok(joined.to_string())
        }
        Err(err) => Err(BridgeError::config(format!(
            "invalid server URL {}: {err}",
            server.url
        ))),
    }
}

fn diff_tools(previous: &[ToolDefinition], next: &[ToolDefinition]) -> ReloadOutcome {
    let before: HashMap<&str, &ToolDefinition> = previous
        .iter()
        .map(|definition| (definition.name.as_str(), definition))
        .collect();
    let after: HashMap<&str, &ToolDefinition> = next
        .iter()
        .map(|definition| (definition.name.as_str(), definition))
        .collect();

    let mut added = Vec::new();
    let mut changed = Vec::new();
    for definition in next {
        match before.get(definition.name.as_str()) {
            None => added.push(definition.name.clone()),
            Some(old) if *old != definition => changed.push(definition.name.clone()),
            Some(_) => {}
        }
    }
    let removed: Vec<String> = previous
        .iter()
        .filter(|definition| !after.contains_key(definition.name.as_str()))
        .map(|definition| definition.name.clone())
        .collect();

    if added.is_empty() && changed.is_empty() && removed.is_empty() {
        ReloadOutcome::NoChange
    } else {
        ReloadOutcome::ToolsUpdated {
            added,
            changed,
            removed,
        }
    }
}

//! Shared utilities and strongly-typed common values for workspace crates.
//!
//! ```rust
//! use ocommon::{HeaderList, RequestContext, SessionId};
//!
//! let mut inbound = HeaderList::new();
//! inbound.append("Authorization", "Bearer abc");
//!
//! let context = RequestContext::new()
//!     .with_session_id("session-1")
//!     .with_inbound_headers(inbound)
//!     .with_remote_addr("10.0.0.7");
//!
//! assert_eq!(context.session_id, Some(SessionId::from("session-1")));
//! assert_eq!(context.inbound_header("authorization"), Some("Bearer abc"));
//! ```

pub mod future {
    //! Shared async future aliases.
    //!
    //! ```rust
    //! use ocommon::BoxFuture;
    //!
    //! fn str_len<'a>(value: &'a str) -> BoxFuture<'a, usize> {
    //!     Box::pin(async move { value.len() })
    //! }
    //!
    //! let _future = str_len("hello");
    //! ```

    use std::future::Future;
    use std::pin::Pin;

    pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
}

pub mod context {
    //! Identifier newtypes and the per-invocation request context.
    //!
    //! ```rust
    //! use ocommon::{RequestContext, TraceId};
    //!
    //! let context = RequestContext::new()
    //!     .with_trace_id("trace-42")
    //!     .with_scheme("https")
    //!     .with_metadata("tenant", "acme");
    //!
    //! assert_eq!(context.trace_id, Some(TraceId::from("trace-42")));
    //! assert_eq!(context.metadata.get("tenant").map(String::as_str), Some("acme"));
    //! ```

    use std::collections::HashMap;
    use std::fmt::{Display, Formatter};

    use crate::HeaderList;

    pub type MetadataMap = HashMap<String, String>;

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    pub struct SessionId(String);

    impl SessionId {
        pub fn new(value: impl Into<String>) -> Self {
            Self(value.into())
        }

        pub fn as_str(&self) -> &str {
            self.0.as_str()
        }
    }

    impl Display for SessionId {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl From<String> for SessionId {
        fn from(value: String) -> Self {
            Self(value)
        }
    }

    impl From<&str> for SessionId {
        fn from(value: &str) -> Self {
            Self(value.to_string())
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    pub struct TraceId(String);

    impl TraceId {
        pub fn new(value: impl Into<String>) -> Self {
            Self(value.into())
        }

        pub fn as_str(&self) -> &str {
            self.0.as_str()
        }
    }

    impl Display for TraceId {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl From<String> for TraceId {
        fn from(value: String) -> Self {
            Self(value)
        }
    }

    impl From<&str> for TraceId {
        fn from(value: &str) -> Self {
            Self(value.to_string())
        }
    }

    /// Everything known about the inbound protocol request that triggered a tool call.
    ///
    /// The bridge never owns the inbound transport, so embedders copy what they have
    /// (headers, peer address, scheme) into this value before invoking a tool.
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct RequestContext {
        pub session_id: Option<SessionId>,
        pub trace_id: Option<TraceId>,
        pub inbound_headers: HeaderList,
        pub remote_addr: Option<String>,
        pub scheme: Option<String>,
        pub metadata: MetadataMap,
    }

    impl RequestContext {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_session_id(mut self, session_id: impl Into<SessionId>) -> Self {
            self.session_id = Some(session_id.into());
            self
        }

        pub fn with_trace_id(mut self, trace_id: impl Into<TraceId>) -> Self {
            self.trace_id = Some(trace_id.into());
            self
        }

        pub fn with_inbound_headers(mut self, headers: HeaderList) -> Self {
            self.inbound_headers = headers;
            self
        }

        pub fn with_inbound_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
            self.inbound_headers.append(name, value);
            self
        }

        pub fn with_remote_addr(mut self, remote_addr: impl Into<String>) -> Self {
            self.remote_addr = Some(remote_addr.into());
            self
        }

        pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
            self.scheme = Some(scheme.into());
            self
        }

        pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
            self.metadata.insert(key.into(), value.into());
            self
        }

        pub fn inbound_header(&self, name: &str) -> Option<&str> {
            self.inbound_headers.get(name)
        }
    }
}

pub mod headers {
    //! Ordered header list with case-insensitive lookup.
    //!
    //! ```rust
    //! use ocommon::HeaderList;
    //!
    //! let mut headers = HeaderList::new();
    //! headers.append("Accept", "text/plain");
    //! headers.set("accept", "application/json");
    //!
    //! assert_eq!(headers.len(), 1);
    //! assert_eq!(headers.get("ACCEPT"), Some("application/json"));
    //! ```

    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct HeaderList {
        entries: Vec<(String, String)>,
    }

    impl HeaderList {
        pub fn new() -> Self {
            Self::default()
        }

        /// Adds an entry, keeping any existing values for the same name.
        pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
            self.entries.push((name.into(), value.into()));
        }

        /// Replaces every value stored under `name` with a single entry.
        pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
            let name = name.into();
            let value = value.into();
            match self
                .entries
                .iter()
                .position(|(existing, _)| existing.eq_ignore_ascii_case(&name))
            {
                Some(index) => {
                    self.entries[index].1 = value;
                    let mut position = 0;
                    self.entries.retain(|(existing, _)| {
                        let keep = position <= index || !existing.eq_ignore_ascii_case(&name);
                        position += 1;
                        keep
                    });
                }
                None => self.entries.push((name, value)),
            }
        }

        pub fn set_if_absent(&mut self, name: impl Into<String>, value: impl Into<String>) {
            let name = name.into();
            if !self.contains(&name) {
                self.entries.push((name, value.into()));
            }
        }

        pub fn get(&self, name: &str) -> Option<&str> {
            self.entries
                .iter()
                .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str())
        }

        pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
            self.entries
                .iter()
                .filter(move |(existing, _)| existing.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str())
        }

        pub fn contains(&self, name: &str) -> bool {
            self.get(name).is_some()
        }

        pub fn remove(&mut self, name: &str) {
            self.entries
                .retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
        }

        pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
            self.entries
                .iter()
                .map(|(name, value)| (name.as_str(), value.as_str()))
        }

        pub fn len(&self) -> usize {
            self.entries.len()
        }

        pub fn is_empty(&self) -> bool {
            self.entries.is_empty()
        }
    }

    impl<N, V> FromIterator<(N, V)> for HeaderList
    where
        N: Into<String>,
        V: Into<String>,
    {
        fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
            let mut headers = HeaderList::new();
            for (name, value) in iter {
                headers.append(name, value);
            }
            headers
        }
    }
}

pub mod registry {
    //! Insertion-ordered registry map used by runtime registries.
    //!
    //! ```rust
    //! use ocommon::Registry;
    //!
    //! let mut registry = Registry::new();
    //! registry.insert("beta".to_string(), 2_u32);
    //! registry.insert("alpha".to_string(), 1_u32);
    //!
    //! assert_eq!(registry.get("alpha"), Some(&1));
    //! assert_eq!(registry.keys().cloned().collect::<Vec<_>>(), vec!["beta", "alpha"]);
    //! ```

    use std::borrow::Borrow;
    use std::collections::HashMap;
    use std::hash::Hash;

    #[derive(Debug, Clone)]
    pub struct Registry<K, V> {
        items: HashMap<K, V>,
        order: Vec<K>,
    }

    impl<K, V> Default for Registry<K, V>
    where
        K: Eq + Hash,
    {
        fn default() -> Self {
            Self {
                items: HashMap::new(),
                order: Vec::new(),
            }
        }
    }

    impl<K, V> Registry<K, V>
    where
        K: Eq + Hash + Clone,
    {
        pub fn new() -> Self {
            Self::default()
        }

        /// Inserts or replaces a value; a replaced key keeps its original position.
        pub fn insert(&mut self, key: K, value: V) -> Option<V> {
            let previous = self.items.insert(key.clone(), value);
            if previous.is_none() {
                self.order.push(key);
            }
            previous
        }

        pub fn get<Q>(&self, key: &Q) -> Option<&V>
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.get(key)
        }

        pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            let removed = self.items.remove(key)?;
            self.order
                .retain(|existing| Borrow::<Q>::borrow(existing) != key);
            Some(removed)
        }

        pub fn contains_key<Q>(&self, key: &Q) -> bool
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.contains_key(key)
        }

        pub fn keys(&self) -> impl Iterator<Item = &K> {
            self.order.iter()
        }

        pub fn values(&self) -> impl Iterator<Item = &V> {
            self.order.iter().filter_map(|key| self.items.get(key))
        }

        pub fn len(&self) -> usize {
            self.items.len()
        }

        pub fn is_empty(&self) -> bool {
            self.items.is_empty()
        }
    }
}

pub use context::{MetadataMap, RequestContext, SessionId, TraceId};
pub use future::BoxFuture;
pub use headers::HeaderList;
pub use registry::Registry;

#[cfg(test)]
mod tests {
    use super::{HeaderList, Registry, RequestContext, SessionId, TraceId};

    #[test]
    fn id_newtypes_round_trip_strings() {
        let session = SessionId::new("session-1");
        let trace = TraceId::from("trace-1");

        assert_eq!(session.as_str(), "session-1");
        assert_eq!(trace.to_string(), "trace-1");
    }

    #[test]
    fn header_list_set_collapses_duplicates_case_insensitively() {
        let mut headers = HeaderList::new();
        headers.append("X-Trace", "a");
        headers.append("Accept", "text/plain");
        headers.append("x-trace", "b");

        headers.set("X-TRACE", "c");

        assert_eq!(headers.get_all("x-trace").collect::<Vec<_>>(), vec!["c"]);
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.iter().next(), Some(("X-Trace", "c")));
    }

    #[test]
    fn header_list_set_if_absent_keeps_existing_value() {
        let mut headers: HeaderList = [("accept", "text/csv")].into_iter().collect();
        headers.set_if_absent("Accept", "application/json");
        headers.set_if_absent("User-Agent", "bridge");

        assert_eq!(headers.get("Accept"), Some("text/csv"));
        assert_eq!(headers.get("user-agent"), Some("bridge"));
    }

    #[test]
    fn request_context_exposes_inbound_headers() {
        let context = RequestContext::new()
            .with_inbound_header("Host", "mcp.example.com")
            .with_remote_addr("192.168.1.4");

        assert_eq!(context.inbound_header("host"), Some("mcp.example.com"));
        assert_eq!(context.remote_addr.as_deref(), Some("192.168.1.4"));
    }

    #[test]
    fn registry_preserves_insertion_order_across_replace_and_remove() {
        let mut registry = Registry::new();
        registry.insert("b".to_string(), 1_u32);
        registry.insert("a".to_string(), 2_u32);
        registry.insert("b".to_string(), 3_u32);

        assert_eq!(registry.values().copied().collect::<Vec<_>>(), vec![3, 2]);

        assert_eq!(registry.remove("b"), Some(3));
        assert_eq!(registry.keys().cloned().collect::<Vec<_>>(), vec!["a".to_string()]);
        assert_eq!(registry.len(), 1);
    }
}

/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Named request handlers and the per-phase lists that hold them
//!
//! A [`Handler`] is one unit of request processing. Handlers are registered under a name in a
//! [`HandlerList`]; a client's [`Handlers`] holds one list per phase of request execution. Within a
//! list, handlers run in insertion order and the first error stops the list.
//!
//! ```rust
//! use aws_client::handlers::{handler_fn, Handlers};
//! let mut handlers = Handlers::default();
//! handlers.build.push_back_named(
//!     "example.AddHeader",
//!     handler_fn(|request| {
//!         request
//!             .http_request_mut()
//!             .headers_mut()
//!             .insert("x-example", http::HeaderValue::from_static("1"));
//!         Ok(())
//!     }),
//! );
//! assert_eq!(handlers.build.names(), vec!["example.AddHeader"]);
//! ```

use crate::error::SdkError;
use crate::request::Request;
use std::borrow::Cow;
use std::fmt::{self, Debug, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<(), SdkError>> + Send + 'a>>;

/// A stage of request processing
pub trait Handler: Send + Sync {
    fn handle<'a>(&'a self, request: &'a mut Request) -> HandlerFuture<'a>;
}

/// Handler backed by a synchronous closure, see [`handler_fn`]
#[derive(Clone)]
pub struct HandlerFn<F>(F);

/// Turn a synchronous closure into a [`Handler`].
pub fn handler_fn<F>(f: F) -> HandlerFn<F>
where
    F: Fn(&mut Request) -> Result<(), SdkError> + Send + Sync,
{
    HandlerFn(f)
}

impl<F> Handler for HandlerFn<F>
where
    F: Fn(&mut Request) -> Result<(), SdkError> + Send + Sync,
{
    fn handle<'a>(&'a self, request: &'a mut Request) -> HandlerFuture<'a> {
        Box::pin(std::future::ready((self.0)(request)))
    }
}

#[derive(Clone)]
pub struct NamedHandler {
    pub name: Cow<'static, str>,
    pub handler: Arc<dyn Handler>,
}

impl NamedHandler {
    pub fn new(name: impl Into<Cow<'static, str>>, handler: impl Handler + 'static) -> Self {
        NamedHandler {
            name: name.into(),
            handler: Arc::new(handler),
        }
    }
}

impl Debug for NamedHandler {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NamedHandler").field(&self.name).finish()
    }
}

/// Ordered list of named handlers for one phase
///
/// Cloning a list copies the entries; the handlers themselves are shared.
#[derive(Clone, Default, Debug)]
pub struct HandlerList {
    handlers: Vec<NamedHandler>,
}

impl HandlerList {
    /// Append a handler, even if one with the same name is present.
    pub fn push_back_named(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        handler: impl Handler + 'static,
    ) -> &mut Self {
        self.handlers.push(NamedHandler::new(name, handler));
        self
    }

    /// Prepend a handler, even if one with the same name is present.
    pub fn push_front_named(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        handler: impl Handler + 'static,
    ) -> &mut Self {
        self.handlers.insert(0, NamedHandler::new(name, handler));
        self
    }

    pub fn push_back(&mut self, handler: NamedHandler) -> &mut Self {
        self.handlers.push(handler);
        self
    }

    /// Replace every handler named `handler.name`, or append it when there are none.
    pub fn set_back_named(&mut self, handler: NamedHandler) -> &mut Self {
        if !self.swap(&handler) {
            self.handlers.push(handler);
        }
        self
    }

    /// Replace every handler named `handler.name`, or prepend it when there are none.
    pub fn set_front_named(&mut self, handler: NamedHandler) -> &mut Self {
        if !self.swap(&handler) {
            self.handlers.insert(0, handler);
        }
        self
    }

    /// Replace every handler named `name` with `handler`. Returns `true` if any were replaced.
    pub fn swap_named(&mut self, name: &str, handler: NamedHandler) -> bool {
        let mut swapped = false;
        for existing in self.handlers.iter_mut().filter(|h| h.name == name) {
            *existing = handler.clone();
            swapped = true;
        }
        swapped
    }

    fn swap(&mut self, handler: &NamedHandler) -> bool {
        let name = handler.name.clone();
        self.swap_named(&name, handler.clone())
    }

    /// Remove every handler named `name`.
    pub fn remove_by_name(&mut self, name: &str) -> &mut Self {
        self.handlers.retain(|h| h.name != name);
        self
    }

    pub fn clear(&mut self) {
        self.handlers.clear();
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.iter().any(|h| h.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.handlers.iter().map(|h| h.name.as_ref()).collect()
    }

    /// Run each handler in order, stopping at the first error.
    pub async fn run(&self, request: &mut Request) -> Result<(), SdkError> {
        for named in &self.handlers {
            named.handler.handle(request).await?;
        }
        Ok(())
    }
}

/// One [`HandlerList`] per phase of request execution, in execution order
#[derive(Clone, Default, Debug)]
pub struct Handlers {
    pub validate: HandlerList,
    pub build: HandlerList,
    pub sign: HandlerList,
    pub send: HandlerList,
    pub unmarshal_meta: HandlerList,
    pub validate_response: HandlerList,
    pub unmarshal: HandlerList,
    pub unmarshal_error: HandlerList,
    pub complete: HandlerList,
}

impl Handlers {
    /// Remove every handler from every phase.
    pub fn clear(&mut self) {
        for list in [
            &mut self.validate,
            &mut self.build,
            &mut self.sign,
            &mut self.send,
            &mut self.unmarshal_meta,
            &mut self.validate_response,
            &mut self.unmarshal,
            &mut self.unmarshal_error,
            &mut self.complete,
        ] {
            list.clear();
        }
    }
}

#[cfg(test)]
mod test {
    use super::{handler_fn, HandlerList, NamedHandler};
    use crate::client::ClientInfo;
    use crate::config::Config;
    use crate::error::SdkError;
    use crate::handlers::Handlers;
    use crate::operation::Operation;
    use crate::request::Request;
    use std::sync::Arc;

    fn noop() -> impl super::Handler {
        handler_fn(|_| Ok(()))
    }

    fn tag(tag: &'static str) -> impl super::Handler {
        handler_fn(move |request: &mut Request| {
            request
                .http_request_mut()
                .headers_mut()
                .append("x-order", http::HeaderValue::from_static(tag));
            Ok(())
        })
    }

    fn request() -> Request {
        Request::new(
            Arc::new(Config::default()),
            Arc::new(ClientInfo::new("test", "Test", "2021-01-01")),
            Handlers::default(),
            Operation::new("Op"),
            serde_json::Value::Null,
        )
    }

    fn order(request: &Request) -> Vec<&str> {
        request
            .http_request()
            .headers()
            .get_all("x-order")
            .iter()
            .map(|v| v.to_str().unwrap())
            .collect()
    }

    #[test]
    fn push_allows_duplicates() {
        let mut list = HandlerList::default();
        list.push_back_named("a", noop())
            .push_back_named("b", noop())
            .push_front_named("a", noop());
        assert_eq!(list.names(), vec!["a", "a", "b"]);
        list.remove_by_name("a");
        assert_eq!(list.names(), vec!["b"]);
    }

    #[test]
    fn set_named_replaces_or_inserts() {
        let mut list = HandlerList::default();
        list.push_back_named("a", noop()).push_back_named("b", noop());
        list.set_back_named(NamedHandler::new("a", noop()));
        assert_eq!(list.names(), vec!["a", "b"]);
        list.set_front_named(NamedHandler::new("c", noop()));
        list.set_back_named(NamedHandler::new("d", noop()));
        assert_eq!(list.names(), vec!["c", "a", "b", "d"]);
        assert!(!list.swap_named("missing", NamedHandler::new("x", noop())));
        assert!(list.swap_named("b", NamedHandler::new("e", noop())));
        assert_eq!(list.names(), vec!["c", "a", "e", "d"]);
        assert!(list.contains("e") && !list.contains("b"));
    }

    #[tokio::test]
    async fn runs_in_order_and_stops_at_first_error() {
        let mut list = HandlerList::default();
        list.push_back_named("first", tag("1"))
            .push_back_named("second", tag("2"))
            .push_back_named(
                "fail",
                handler_fn(|_| Err(SdkError::construction_failure("stop"))),
            )
            .push_back_named("never", tag("3"));
        let mut request = request();
        let err = list.run(&mut request).await.expect_err("fails");
        assert!(matches!(err, SdkError::ConstructionFailure(_)));
        assert_eq!(order(&request), vec!["1", "2"]);
    }

    #[test]
    fn cloned_lists_are_independent() {
        let mut handlers = Handlers::default();
        handlers.sign.push_back_named("sign", noop());
        let mut copy = handlers.clone();
        copy.sign.clear();
        copy.build.push_back_named("build", noop());
        assert_eq!(handlers.sign.names(), vec!["sign"]);
        assert!(handlers.build.is_empty());
        copy.clear();
        assert!(copy.sign.is_empty() && copy.build.is_empty());
    }
}

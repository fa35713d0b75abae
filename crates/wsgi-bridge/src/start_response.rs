use std::{cell::RefCell, rc::Rc};

use anyhow::Error;
use tracing::{event, Level};

use crate::{ServerHeaders, StartResponseError};

/// A single response header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Header name, sent as given.
    pub name: String,
    /// Header value, sent as given.
    pub value: String,
}

impl Header {
    /// Create a new header.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl<N, V> From<(N, V)> for Header
where
    N: Into<String>,
    V: Into<String>,
{
    fn from((name, value): (N, V)) -> Self {
        Self::new(name, value)
    }
}

/// Status and headers recorded by a `StartResponse` call.
///
/// Headers are the application's, followed by the server headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseDescriptor {
    /// Status, e.g. `200 OK`.
    pub status: String,
    /// Headers in wire order.
    pub headers: Vec<Header>,
}

/// Response-starter handed to the application.
///
/// Cloning gives another handle to the same recording slot, so a lazy `Body` can hold on to it
/// and start the response while it is being drained.
#[derive(Clone)]
pub struct StartResponse {
    inner: Rc<Inner>,
}

struct Inner {
    server_headers: ServerHeaders,
    strict: bool,
    descriptor: RefCell<Option<ResponseDescriptor>>,
}

impl StartResponse {
    /// Create an unstarted response-starter.
    pub fn new(server_headers: ServerHeaders, strict: bool) -> Self {
        let inner = Inner {
            server_headers,
            strict,
            descriptor: RefCell::new(None),
        };

        Self {
            inner: Rc::new(inner),
        }
    }

    /// Record the response status and headers.
    ///
    /// The server headers are appended after `headers`. Calling this again replaces the
    /// recorded descriptor, unless strict mode is on, in which case a repeated call is only
    /// accepted when `exc_info` carries the error that caused it.
    pub fn start<S, I, H>(
        &self,
        status: S,
        headers: I,
        exc_info: Option<&Error>,
    ) -> Result<(), StartResponseError>
    where
        S: Into<String>,
        I: IntoIterator<Item = H>,
        H: Into<Header>,
    {
        // Collect before borrowing, the iterator may call back into this handle
        let mut headers: Vec<Header> = headers.into_iter().map(Into::into).collect();
        headers.extend(self.inner.server_headers.to_headers());

        let descriptor = ResponseDescriptor {
            status: status.into(),
            headers,
        };

        let mut slot = self.inner.descriptor.borrow_mut();

        if slot.is_some() {
            if self.inner.strict && exc_info.is_none() {
                return Err(StartResponseError::AlreadyStarted);
            }

            event!(Level::DEBUG, "replacing previously started response");
        }

        if let Some(error) = exc_info {
            event!(Level::WARN, "application started response with error: {:#}", error);
        }

        *slot = Some(descriptor);

        Ok(())
    }

    /// Returns true if a response has been started.
    pub fn is_started(&self) -> bool {
        self.inner.descriptor.borrow().is_some()
    }

    /// Take the recorded descriptor, leaving the response-starter unstarted.
    pub fn take_descriptor(&self) -> Option<ResponseDescriptor> {
        self.inner.descriptor.borrow_mut().take()
    }
}

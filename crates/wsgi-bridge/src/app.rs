use anyhow::Error;
use bytes::{Bytes, BytesMut};
use tracing::{event, instrument, Level};

use crate::{Environ, HandleError, ResponseDescriptor, StartResponse};

/// Application callback invoked once per request.
///
/// The application receives the request `Environ` and a `StartResponse` handle. It must call
/// `StartResponse::start` at some point before its `Body` is exhausted.
pub trait Application {
    /// Handle one request.
    fn call(&self, environ: Environ, start_response: StartResponse) -> Result<Body, Error>;
}

impl<F> Application for F
where
    F: Fn(Environ, StartResponse) -> Result<Body, Error>,
{
    fn call(&self, environ: Environ, start_response: StartResponse) -> Result<Body, Error> {
        self(environ, start_response)
    }
}

/// Finite, possibly lazy, sequence of body chunks returned by an `Application`.
pub struct Body {
    chunks: Box<dyn Iterator<Item = Result<Bytes, Error>>>,
}

impl Body {
    /// A body without chunks.
    pub fn empty() -> Self {
        Self::from_results(std::iter::empty())
    }

    /// A body from ready chunks.
    pub fn from_chunks<I, C>(chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        I::IntoIter: 'static,
        C: Into<Bytes> + 'static,
    {
        Self::from_results(chunks.into_iter().map(|chunk| Ok(chunk.into())))
    }

    /// A body from fallible chunks, produced as the server drains it.
    pub fn from_results<I>(chunks: I) -> Self
    where
        I: IntoIterator<Item = Result<Bytes, Error>>,
        I::IntoIter: 'static,
    {
        Self {
            chunks: Box::new(chunks.into_iter()),
        }
    }

    /// Drain all chunks into one contiguous buffer, in order.
    pub fn drain(self) -> Result<Bytes, Error> {
        let mut data = BytesMut::new();

        for chunk in self.chunks {
            data.extend_from_slice(&chunk?);
        }

        Ok(data.freeze())
    }
}

impl Iterator for Body {
    type Item = Result<Bytes, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.chunks.next()
    }
}

/// Invoke `app` for one request, and fully drain the body it returns.
///
/// Returns the recorded descriptor, `None` if the application never started a response, along
/// with the buffered body.
#[instrument("invoke", level = "debug", skip_all)]
pub fn invoke<A>(
    app: &A,
    environ: Environ,
    start_response: StartResponse,
) -> Result<(Option<ResponseDescriptor>, Bytes), HandleError>
where
    A: Application + ?Sized,
{
    let body = app
        .call(environ, start_response.clone())
        .map_err(HandleError::Application)?;
    let body = body.drain().map_err(HandleError::Application)?;

    event!(Level::TRACE, bytes = body.len(), "drained body");

    let descriptor = start_response.take_descriptor();
    Ok((descriptor, body))
}

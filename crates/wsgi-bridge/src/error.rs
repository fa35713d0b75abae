use std::{io, str::Utf8Error};

use thiserror::Error;

/// Failed to handle a single request.
///
/// Failures are local to the connection they happened on, the connection is closed regardless.
#[derive(Error, Debug)]
pub enum HandleError {
    /// Reading the request from the connection failed.
    #[error("failed to read request")]
    Read(#[source] io::Error),

    /// The request bytes are not valid UTF-8.
    #[error("request is not valid utf-8")]
    Decode(#[from] Utf8Error),

    /// The application returned an error, either from its call or while producing its body.
    #[error("application failed")]
    Application(#[source] anyhow::Error),

    /// The application's body was drained without a response being started.
    #[error("application did not start a response")]
    MissingResponseDescriptor,

    /// Writing the response to the connection failed.
    #[error("failed to write response")]
    Write(#[source] io::Error),
}

/// Failed to start a response.
#[derive(Error, Debug)]
pub enum StartResponseError {
    /// A response was already started, and no error info was given to justify replacing it.
    #[error("response already started")]
    AlreadyStarted,
}

/// Failed to bind the listening endpoint.
#[derive(Error, Debug)]
#[error("failed to bind {host}:{port}")]
pub struct BindError {
    host: String,
    port: u16,
    #[source]
    source: io::Error,
}

impl BindError {
    pub(crate) fn new(host: &str, port: u16, source: io::Error) -> Self {
        Self {
            host: host.to_string(),
            port,
            source,
        }
    }
}

#![deny(missing_docs)]

//! A minimal bridge between a TCP socket and a WSGI-style application callback.
//!
//! Every accepted connection runs the same linear pipeline: a single bounded read, parsing of
//! the request line into an `Environ`, invocation of the `Application` with a `StartResponse`
//! handle, and serialization of the captured status, headers, and body back onto the wire.
//! The connection is closed on every exit path.

mod app;
mod config;
mod connection;
mod environ;
mod error;
mod listener;
mod parser;
mod response;
mod server;
mod start_response;

pub use self::{
    app::{invoke, Application, Body},
    config::{ServerConfig, ServerHeaders},
    connection::{handle_connection, read_request, Connection, Transport},
    environ::{build_environ, keys, EnvValue, Environ, ErrorStream, InputStream},
    error::{BindError, HandleError, StartResponseError},
    listener::ListeningEndpoint,
    parser::{parse_request_line, RequestLine},
    response::serialize_response,
    server::{make_server, Server},
    start_response::{Header, ResponseDescriptor, StartResponse},
};

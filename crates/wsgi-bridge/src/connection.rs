use std::{
    io::{self, Read, Write},
    net::{Shutdown, TcpStream},
    str,
};

use bytes::Bytes;
use tracing::{event, instrument, Level};

use crate::{
    build_environ, invoke, parse_request_line, serialize_response, Application, HandleError,
    ServerConfig, StartResponse,
};

/// Byte stream a request is served over.
pub trait Transport: Read + Write {
    /// Close the transport in both directions.
    fn close(&mut self) -> io::Result<()>;
}

impl Transport for TcpStream {
    fn close(&mut self) -> io::Result<()> {
        self.shutdown(Shutdown::Both)
    }
}

/// An accepted connection, closed when dropped.
pub struct Connection<T: Transport> {
    transport: T,
    closed: bool,
}

impl<T: Transport> Connection<T> {
    /// Take ownership of an accepted transport.
    pub fn new(transport: T) -> Self {
        event!(Level::DEBUG, "connection opened");

        Self {
            transport,
            closed: false,
        }
    }

    /// Access the underlying transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Close the connection, does nothing if it's already closed.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }

        event!(Level::DEBUG, "closing connection");
        self.closed = true;

        if let Err(error) = self.transport.close() {
            // The peer may have gone away already
            event!(Level::DEBUG, ?error, "error while closing connection");
        }
    }
}

impl<T: Transport> Drop for Connection<T> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Perform exactly one read of at most `capacity` bytes.
///
/// Does not loop to fill the buffer, anything past what the first read returns is never seen.
/// A peer that already closed results in zero bytes.
pub fn read_request<R>(reader: &mut R, capacity: usize) -> Result<Bytes, HandleError>
where
    R: Read + ?Sized,
{
    let mut buffer = vec![0; capacity];
    let len = reader.read(&mut buffer).map_err(HandleError::Read)?;
    buffer.truncate(len);

    event!(Level::TRACE, bytes = len, "received data");

    Ok(buffer.into())
}

/// Run the full request pipeline on one accepted transport.
///
/// Reads the request, builds the environment, invokes `app`, and writes the response. The
/// transport is closed before returning, on success and on every error.
#[instrument("handle-connection", level = "debug", skip_all)]
pub fn handle_connection<T, A>(
    transport: T,
    app: &A,
    config: &ServerConfig,
    server_port: u16,
) -> Result<(), HandleError>
where
    T: Transport,
    A: Application + ?Sized,
{
    let mut connection = Connection::new(transport);

    let raw = read_request(connection.transport_mut(), config.read_capacity)?;
    let text = str::from_utf8(&raw)?;

    let request_line = parse_request_line(text);
    if let Some(line) = &request_line {
        event!(
            Level::DEBUG,
            method = %line.method,
            path = %line.path,
            version = %line.version,
            "received request"
        );
    }

    let environ = build_environ(raw.clone(), request_line, &config.host, server_port);
    let start_response =
        StartResponse::new(config.server_headers.clone(), config.strict_start_response);

    let (descriptor, body) = invoke(app, environ, start_response)?;
    let descriptor = descriptor.ok_or(HandleError::MissingResponseDescriptor)?;

    event!(Level::DEBUG, status = %descriptor.status, "sending response");
    let data = serialize_response(&descriptor, &body);

    let transport = connection.transport_mut();
    transport.write_all(&data).map_err(HandleError::Write)?;
    transport.flush().map_err(HandleError::Write)?;

    event!(Level::TRACE, bytes = data.len(), "sent data");

    connection.close();

    Ok(())
}

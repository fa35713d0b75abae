use std::{
    io::{self, ErrorKind},
    net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs},
};

use socket2::{Domain, Protocol, Socket, Type};
use tracing::{event, instrument, Level};

use crate::BindError;

/// The bound, listening socket of a server.
///
/// Lives for as long as the server does.
pub struct ListeningEndpoint {
    host: String,
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl ListeningEndpoint {
    /// Bind and start listening on `host:port`.
    ///
    /// The socket is created with `SO_REUSEADDR`, and at most `backlog` connections are queued
    /// by the OS while one is being handled.
    #[instrument("ListeningEndpoint::bind", skip_all)]
    pub fn bind(host: &str, port: u16, backlog: i32) -> Result<Self, BindError> {
        event!(Level::DEBUG, host, port, "binding");

        let listener =
            bind_socket(host, port, backlog).map_err(|error| BindError::new(host, port, error))?;
        let local_addr = listener
            .local_addr()
            .map_err(|error| BindError::new(host, port, error))?;

        event!(Level::INFO, addr = ?local_addr, "listening");

        let endpoint = Self {
            host: host.to_string(),
            listener,
            local_addr,
        };
        Ok(endpoint)
    }

    /// The host name this endpoint was bound with.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The port actually bound, resolving `0` to the picked port.
    pub fn port(&self) -> u16 {
        self.local_addr.port()
    }

    /// The local socket address.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Block until the next connection is accepted.
    pub fn accept(&self) -> io::Result<(TcpStream, SocketAddr)> {
        let (stream, remote_addr) = self.listener.accept()?;
        event!(Level::DEBUG, ?remote_addr, "stream accepted");

        Ok((stream, remote_addr))
    }
}

fn bind_socket(host: &str, port: u16, backlog: i32) -> io::Result<TcpListener> {
    let addr = (host, port)
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| io::Error::new(ErrorKind::AddrNotAvailable, "host resolved to nothing"))?;

    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    socket.bind(&addr.into())?;
    socket.listen(backlog)?;

    Ok(socket.into())
}

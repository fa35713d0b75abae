use crate::Header;

/// Configuration of a `Server`, fixed for the lifetime of the process.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host name or address to bind.
    pub host: String,
    /// Port to bind, `0` picks an ephemeral port.
    pub port: u16,
    /// Depth of the OS-level listen queue.
    pub backlog: i32,
    /// Capacity of the single read performed per connection.
    ///
    /// Anything the client sends beyond this is never read, the request is truncated.
    pub read_capacity: usize,
    /// Headers appended to every response after the application's headers.
    pub server_headers: ServerHeaders,
    /// Reject a second `StartResponse::start` call that does not carry error info.
    ///
    /// When disabled, the latest call wins.
    pub strict_start_response: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3456,
            backlog: 1,
            read_capacity: 1024,
            server_headers: ServerHeaders::default(),
            strict_start_response: false,
        }
    }
}

impl ServerConfig {
    /// Set the address to bind.
    pub fn with_addr(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    /// Set the listen queue depth.
    pub fn with_backlog(mut self, backlog: i32) -> Self {
        self.backlog = backlog;
        self
    }

    /// Set the capacity of the per-connection read.
    pub fn with_read_capacity(mut self, read_capacity: usize) -> Self {
        self.read_capacity = read_capacity;
        self
    }

    /// Replace the server identification headers.
    pub fn with_server_headers(mut self, server_headers: ServerHeaders) -> Self {
        self.server_headers = server_headers;
        self
    }

    /// Enable or disable strict response-starter re-invocation checks.
    pub fn with_strict_start_response(mut self, strict: bool) -> Self {
        self.strict_start_response = strict;
        self
    }
}

/// The `Date` and `Server` header pair appended to every response.
///
/// The date is a fixed literal rather than the wall clock, keeping responses byte-for-byte
/// deterministic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerHeaders {
    date: String,
    server: String,
}

impl Default for ServerHeaders {
    fn default() -> Self {
        Self::new("2018-1-21", "WSGIServer 0.2")
    }
}

impl ServerHeaders {
    /// Create server headers from a fixed date and server identification.
    pub fn new(date: impl Into<String>, server: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            server: server.into(),
        }
    }

    /// Value of the `Date` header.
    pub fn date(&self) -> &str {
        &self.date
    }

    /// Value of the `Server` header.
    pub fn server(&self) -> &str {
        &self.server
    }

    /// The headers in wire order, `Date` then `Server`.
    pub fn to_headers(&self) -> [Header; 2] {
        [
            Header::new("Date", self.date.as_str()),
            Header::new("Server", self.server.as_str()),
        ]
    }
}

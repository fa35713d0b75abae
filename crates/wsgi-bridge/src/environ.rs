use std::io::{self, Cursor, Read, Write};

use bytes::Bytes;

use crate::RequestLine;

/// Keys present in every `Environ`.
pub mod keys {
    /// Protocol version marker, `(1, 0)`.
    pub const VERSION: &str = "wsgi.version";
    /// URL scheme, always `http`.
    pub const URL_SCHEME: &str = "wsgi.url_scheme";
    /// Readable stream over the raw request bytes.
    pub const INPUT: &str = "wsgi.input";
    /// Writable error output stream.
    pub const ERRORS: &str = "wsgi.errors";
    /// Whether the application may be invoked from multiple threads at once.
    pub const MULTITHREAD: &str = "wsgi.multithread";
    /// Whether the application may be invoked from multiple processes at once.
    pub const MULTIPROCESS: &str = "wsgi.multiprocess";
    /// Whether the application is invoked only once in the process lifetime.
    pub const RUN_ONCE: &str = "wsgi.run_once";
    /// Request method from the request line.
    pub const REQUEST_METHOD: &str = "REQUEST_METHOD";
    /// Request path from the request line.
    pub const PATH_INFO: &str = "PATH_INFO";
    /// Host the server was bound to.
    pub const SERVER_NAME: &str = "SERVER_NAME";
    /// Port the server is bound to, in string form.
    pub const SERVER_PORT: &str = "SERVER_PORT";
}

/// A value in an `Environ`.
#[derive(Debug)]
pub enum EnvValue {
    /// A `(major, minor)` version tuple.
    Version(u32, u32),
    /// A text value.
    Str(String),
    /// A capability flag.
    Bool(bool),
    /// The request input stream.
    Input(InputStream),
    /// The error output stream.
    Errors(ErrorStream),
    /// A value the request did not provide, such as the method of an unparseable request line.
    Null,
}

impl EnvValue {
    fn from_opt(value: Option<String>) -> Self {
        value.map(EnvValue::Str).unwrap_or(EnvValue::Null)
    }
}

/// Per-request environment handed to the application.
///
/// Entries keep insertion order. The server builds a fresh `Environ` for every request and never
/// touches it again once the application owns it.
#[derive(Debug, Default)]
pub struct Environ {
    entries: Vec<(&'static str, EnvValue)>,
}

impl Environ {
    fn insert(&mut self, key: &'static str, value: EnvValue) {
        self.entries.push((key, value));
    }

    /// Get the value for `key`.
    pub fn get(&self, key: &str) -> Option<&EnvValue> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, value)| value)
    }

    /// Get the text value for `key`, `None` if absent, null, or not text.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            EnvValue::Str(value) => Some(value),
            _ => None,
        }
    }

    /// Get the flag value for `key`.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            EnvValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// `REQUEST_METHOD`, if the request line could be parsed.
    pub fn method(&self) -> Option<&str> {
        self.get_str(keys::REQUEST_METHOD)
    }

    /// `PATH_INFO`, if the request line could be parsed.
    pub fn path(&self) -> Option<&str> {
        self.get_str(keys::PATH_INFO)
    }

    /// The `wsgi.input` stream.
    pub fn input(&mut self) -> Option<&mut InputStream> {
        self.entries.iter_mut().find_map(|(_, value)| match value {
            EnvValue::Input(input) => Some(input),
            _ => None,
        })
    }

    /// The `wsgi.errors` stream.
    pub fn errors(&mut self) -> Option<&mut ErrorStream> {
        self.entries.iter_mut().find_map(|(_, value)| match value {
            EnvValue::Errors(errors) => Some(errors),
            _ => None,
        })
    }

    /// Iterate keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(key, _)| *key)
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &EnvValue)> {
        self.entries.iter().map(|(key, value)| (*key, value))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build the environment for one request.
///
/// `request_line` is `None` when the request line could not be parsed, in which case the method
/// and path entries are `EnvValue::Null`.
pub fn build_environ(
    raw: Bytes,
    request_line: Option<RequestLine>,
    host: &str,
    port: u16,
) -> Environ {
    let (method, path) = match request_line {
        Some(line) => (Some(line.method), Some(line.path)),
        None => (None, None),
    };

    let mut environ = Environ::default();

    environ.insert(keys::VERSION, EnvValue::Version(1, 0));
    environ.insert(keys::URL_SCHEME, EnvValue::Str("http".to_string()));
    environ.insert(keys::INPUT, EnvValue::Input(InputStream::new(raw)));
    environ.insert(keys::ERRORS, EnvValue::Errors(ErrorStream::default()));
    environ.insert(keys::MULTITHREAD, EnvValue::Bool(false));
    environ.insert(keys::MULTIPROCESS, EnvValue::Bool(false));
    environ.insert(keys::RUN_ONCE, EnvValue::Bool(false));

    environ.insert(keys::REQUEST_METHOD, EnvValue::from_opt(method));
    environ.insert(keys::PATH_INFO, EnvValue::from_opt(path));
    environ.insert(keys::SERVER_NAME, EnvValue::Str(host.to_string()));
    environ.insert(keys::SERVER_PORT, EnvValue::Str(port.to_string()));

    environ
}

/// Readable stream over the raw request bytes.
///
/// Has a single read position that is never rewound.
#[derive(Debug)]
pub struct InputStream {
    cursor: Cursor<Bytes>,
}

impl InputStream {
    /// Wrap raw request bytes.
    pub fn new(data: Bytes) -> Self {
        Self {
            cursor: Cursor::new(data),
        }
    }

    /// Bytes not yet read.
    pub fn remaining(&self) -> usize {
        let total = self.cursor.get_ref().len() as u64;
        total.saturating_sub(self.cursor.position()) as usize
    }
}

impl Read for InputStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.cursor.read(buf)
    }
}

/// Error output stream, writes to the process stderr.
#[derive(Debug, Default)]
pub struct ErrorStream {
    _private: (),
}

impl Write for ErrorStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

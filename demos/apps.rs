use std::io::{Read, Write};

use anyhow::Error;
use bytes::Bytes;
use wsgi_bridge::{Body, EnvValue, Environ, StartResponse};

const HELLO: &str = "<!DOCTYPE html><html><body><h1>Hello, World!</h1></body></html>";

/// Greets every request.
pub fn hello(_environ: Environ, start: StartResponse) -> Result<Body, Error> {
    start.start("200 OK", [("Content-Type", "text/html")], None)?;
    Ok(Body::from_chunks([HELLO]))
}

/// Lists the request environment, one `key: value` line each.
pub fn environ(environ: Environ, start: StartResponse) -> Result<Body, Error> {
    let mut lines = Vec::new();

    for (key, value) in environ.iter() {
        let value = match value {
            EnvValue::Version(major, minor) => format!("({}, {})", major, minor),
            EnvValue::Str(value) => value.clone(),
            EnvValue::Bool(value) => value.to_string(),
            EnvValue::Input(input) => format!("<input, {} bytes>", input.remaining()),
            EnvValue::Errors(_) => "<stderr>".to_string(),
            EnvValue::Null => "null".to_string(),
        };
        lines.push(Bytes::from(format!("{}: {}\n", key, value)));
    }

    start.start("200 OK", [("Content-Type", "text/plain")], None)?;
    Ok(Body::from_chunks(lines))
}

/// Sends the raw request back, and notes it on the error stream.
pub fn echo(mut environ: Environ, start: StartResponse) -> Result<Body, Error> {
    let mut data = Vec::new();
    if let Some(input) = environ.input() {
        input.read_to_end(&mut data)?;
    }

    if let Some(errors) = environ.errors() {
        writeln!(errors, "echoing {} bytes", data.len())?;
    }

    start.start("200 OK", [("Content-Type", "application/octet-stream")], None)?;
    Ok(Body::from_chunks([data]))
}

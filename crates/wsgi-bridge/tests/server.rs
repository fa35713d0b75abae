use std::{
    io::{Read, Write},
    net::TcpStream,
    thread,
};

use anyhow::{bail, Error};
use tracing::Span;
use tracing_test::traced_test;
use wsgi_bridge::{
    make_server, Application, Body, Environ, HandleError, Server, ServerConfig, StartResponse,
};

fn given_server<A>(app: A) -> Result<Server<A>, Error>
where
    A: Application,
{
    let config = ServerConfig::default().with_addr("127.0.0.1", 0);
    let server = make_server(config, app)?;
    Ok(server)
}

fn when_requested<A>(
    server: &Server<A>,
    request: &[u8],
) -> Result<(Result<(), HandleError>, Vec<u8>), Error>
where
    A: Application,
{
    let mut client = TcpStream::connect(server.endpoint().local_addr())?;
    client.write_all(request)?;

    let result = server.handle_one()?;

    let mut response = Vec::new();
    client.read_to_end(&mut response)?;

    Ok((result, response))
}

fn path_app(environ: Environ, start: StartResponse) -> Result<Body, Error> {
    let Some(path) = environ.path() else {
        bail!("request has no path");
    };
    let body = format!("{} on port {}", path, environ.get_str("SERVER_PORT").unwrap_or("?"));

    start.start("200 OK", [("Content-Type", "text/plain")], None)?;
    Ok(Body::from_chunks([body]))
}

#[test]
#[traced_test]
fn serves_over_tcp() -> Result<(), Error> {
    let server = given_server(path_app)?;
    let port = server.endpoint().port();
    assert_ne!(port, 0);

    let (result, response) = when_requested(&server, b"GET /hello HTTP/1.1\r\nHost: x\r\n\r\n")?;
    result?;

    let expected = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nDate: 2018-1-21\r\nServer: WSGIServer 0.2\r\n\r\n/hello on port {}",
        port
    );
    assert_eq!(String::from_utf8(response)?, expected);

    Ok(())
}

#[test]
#[traced_test]
fn failed_request_does_not_stop_server() -> Result<(), Error> {
    let server = given_server(path_app)?;

    // No request line means no path, which fails the application
    let (result, response) = when_requested(&server, b"\r\n\r\n")?;
    assert!(matches!(result, Err(HandleError::Application(_))));
    assert!(response.is_empty());

    let (result, response) = when_requested(&server, b"GET /next HTTP/1.1\r\n\r\n")?;
    result?;
    assert!(response.starts_with(b"HTTP/1.1 200 OK\r\n"));

    Ok(())
}

#[test]
#[traced_test]
fn bind_reports_address_in_use() -> Result<(), Error> {
    let server = given_server(path_app)?;
    let port = server.endpoint().port();

    // A listening socket on the same port can't be bound twice, even with address reuse
    let config = ServerConfig::default().with_addr("127.0.0.1", port);
    let result = make_server(config, path_app);

    assert!(result.is_err());

    Ok(())
}

#[test]
#[traced_test]
fn serve_forever_continues_after_failed_request() -> Result<(), Error> {
    let server = given_server(path_app)?;
    let addr = server.endpoint().local_addr();

    // Keep the server's logs within this test's span
    let span = Span::current();
    thread::spawn(move || {
        let _entered = span.enter();
        server.serve_forever()
    });

    // Connect and hang up without sending anything, the read comes back empty
    drop(TcpStream::connect(addr)?);

    let mut client = TcpStream::connect(addr)?;
    client.write_all(b"GET /after HTTP/1.1\r\n\r\n")?;
    let mut response = Vec::new();
    client.read_to_end(&mut response)?;

    let response = String::from_utf8(response)?;
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(response.ends_with(&format!("/after on port {}", addr.port())));
    assert!(logs_contain("failed to handle request"));

    Ok(())
}

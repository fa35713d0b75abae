use std::io::{self, ErrorKind};

use tracing::{event, instrument, Level};

use crate::{
    handle_connection, Application, BindError, HandleError, ListeningEndpoint, ServerConfig,
};

/// Sequential request server.
///
/// One connection is handled to completion, including closing it, before the next one is
/// accepted.
pub struct Server<A> {
    endpoint: ListeningEndpoint,
    config: ServerConfig,
    app: A,
}

/// Bind a server for `app` using `config`.
pub fn make_server<A>(config: ServerConfig, app: A) -> Result<Server<A>, BindError>
where
    A: Application,
{
    let endpoint = ListeningEndpoint::bind(&config.host, config.port, config.backlog)?;

    let server = Server {
        endpoint,
        config,
        app,
    };
    Ok(server)
}

impl<A> Server<A>
where
    A: Application,
{
    /// The listening endpoint.
    pub fn endpoint(&self) -> &ListeningEndpoint {
        &self.endpoint
    }

    /// The configuration the server was made with.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Accept and handle connections until accepting fails.
    ///
    /// A failure while handling a connection only affects that connection, it's logged and the
    /// next connection is accepted. The same goes for a client aborting before it's accepted.
    #[instrument("serve-forever", skip_all)]
    pub fn serve_forever(&self) -> Result<(), io::Error> {
        loop {
            match self.handle_one() {
                Ok(Ok(())) => {}
                Ok(Err(error)) => {
                    let error = anyhow::Error::new(error);
                    event!(Level::ERROR, "failed to handle request: {:#}", error);
                }
                Err(error) if is_client_abort(&error) => {
                    event!(Level::WARN, ?error, "client aborted before accept");
                }
                Err(error) => return Err(error),
            }
        }
    }

    /// Accept one connection and run it through the request pipeline.
    ///
    /// The outer result is the accept, the inner result the request handling.
    pub fn handle_one(&self) -> Result<Result<(), HandleError>, io::Error> {
        let (stream, _remote_addr) = self.endpoint.accept()?;

        let result = handle_connection(stream, &self.app, &self.config, self.endpoint.port());
        Ok(result)
    }
}

fn is_client_abort(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        ErrorKind::ConnectionAborted | ErrorKind::ConnectionReset | ErrorKind::Interrupted
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_aborts_are_not_fatal() {
        for kind in [
            ErrorKind::ConnectionAborted,
            ErrorKind::ConnectionReset,
            ErrorKind::Interrupted,
        ] {
            assert!(is_client_abort(&io::Error::from(kind)));
        }

        assert!(!is_client_abort(&io::Error::from(ErrorKind::PermissionDenied)));
        assert!(!is_client_abort(&io::Error::from(ErrorKind::OutOfMemory)));
    }
}

mod mock;

use wsgi_bridge::{handle_connection, Application, HandleError, ServerConfig};

pub use self::mock::{MockState, MockTransport};

pub const SERVER_PORT: u16 = 3456;

pub fn given_request(data: &[u8]) -> (MockTransport, MockState) {
    MockTransport::new(data)
}

pub fn given_config() -> ServerConfig {
    ServerConfig::default().with_addr("localhost", SERVER_PORT)
}

pub fn when_handled<A>(
    transport: MockTransport,
    app: &A,
    config: &ServerConfig,
) -> Result<(), HandleError>
where
    A: Application,
{
    handle_connection(transport, app, config, SERVER_PORT)
}

pub fn then_response(state: &MockState, expected: &[u8]) {
    let written = state.written();
    assert!(
        written == expected,
        "unexpected response:\n{}",
        String::from_utf8_lossy(&written)
    );
}

pub fn then_closed(state: &MockState) {
    assert!(state.closed(), "connection not closed");
}

pub fn then_nothing_written(state: &MockState) {
    assert!(state.written().is_empty(), "response bytes were written");
}

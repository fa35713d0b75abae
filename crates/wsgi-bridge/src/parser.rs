use tracing::{event, Level};

/// The three parts of an HTTP request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    /// Request method, e.g. `GET`.
    pub method: String,
    /// Request target as sent, e.g. `/hello?x=1`.
    pub path: String,
    /// Protocol version, e.g. `HTTP/1.1`.
    pub version: String,
}

/// Characters that end a line, a bare `\r` included.
const LINE_BOUNDARIES: &[char] = &[
    '\r', '\n', '\x0b', '\x0c', '\x1c', '\x1d', '\x1e', '\u{85}', '\u{2028}', '\u{2029}',
];

/// Parse the request line from the start of a decoded request.
///
/// Only the first line is looked at, header lines and body are left for the application to
/// read from `wsgi.input`. Returns `None` if there is no line, or if it doesn't split into
/// exactly three whitespace separated tokens.
pub fn parse_request_line(text: &str) -> Option<RequestLine> {
    if text.is_empty() {
        event!(Level::DEBUG, "empty request, no request line");
        return None;
    }

    let line = text.split(LINE_BOUNDARIES).next().unwrap_or_default();

    let mut tokens = line.split_whitespace();
    let (Some(method), Some(path), Some(version), None) =
        (tokens.next(), tokens.next(), tokens.next(), tokens.next())
    else {
        event!(Level::WARN, line, "malformed request line");
        return None;
    };

    let request_line = RequestLine {
        method: method.to_string(),
        path: path.to_string(),
        version: version.to_string(),
    };
    Some(request_line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_first_line_is_parsed() {
        let line = parse_request_line("POST /submit HTTP/1.0\r\nHost: x\r\n\r\nbody").unwrap();

        assert_eq!(line.method, "POST");
        assert_eq!(line.path, "/submit");
        assert_eq!(line.version, "HTTP/1.0");
    }

    #[test]
    fn bare_line_boundaries_end_the_first_line() {
        let line = parse_request_line("GET /x HTTP/1.1\rHost: y\r\r").unwrap();
        assert_eq!(line.path, "/x");
        assert_eq!(line.version, "HTTP/1.1");

        let line = parse_request_line("PUT /y HTTP/1.1\u{2028}Host: y").unwrap();
        assert_eq!(line.method, "PUT");
    }

    #[test]
    fn wrong_token_count_is_rejected() {
        assert_eq!(parse_request_line("GET /\r\n"), None);
        assert_eq!(parse_request_line("GET / HTTP/1.1 extra\r\n"), None);
        assert_eq!(parse_request_line("\r\nGET / HTTP/1.1\r\n"), None);
    }

    #[test]
    fn empty_request_has_no_line() {
        assert_eq!(parse_request_line(""), None);
    }
}

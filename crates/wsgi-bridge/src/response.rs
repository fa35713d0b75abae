use bytes::{BufMut, Bytes, BytesMut};

use crate::ResponseDescriptor;

/// Serialize a full HTTP/1.1 response.
///
/// The status line and headers are written in order with CRLF line endings, followed by a blank
/// line and the body bytes verbatim.
pub fn serialize_response(descriptor: &ResponseDescriptor, body: &[u8]) -> Bytes {
    let mut data = BytesMut::new();

    data.put(&b"HTTP/1.1 "[..]);
    data.put(descriptor.status.as_bytes());
    data.put(&b"\r\n"[..]);

    for header in &descriptor.headers {
        data.put(header.name.as_bytes());
        data.put(&b": "[..]);
        data.put(header.value.as_bytes());
        data.put(&b"\r\n"[..]);
    }

    data.put(&b"\r\n"[..]);
    data.put(body);

    data.freeze()
}

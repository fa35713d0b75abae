use std::{
    cell::{Cell, RefCell},
    io::{self, Cursor, ErrorKind, Read, Write},
    rc::Rc,
};

use wsgi_bridge::Transport;

/// In-memory transport, recording what is written and whether it got closed.
pub struct MockTransport {
    input: Cursor<Vec<u8>>,
    state: MockState,
    fail_read: bool,
    fail_write: bool,
}

#[derive(Clone, Default)]
pub struct MockState {
    written: Rc<RefCell<Vec<u8>>>,
    closed: Rc<Cell<bool>>,
    reads: Rc<Cell<usize>>,
}

impl MockState {
    pub fn written(&self) -> Vec<u8> {
        self.written.borrow().clone()
    }

    pub fn closed(&self) -> bool {
        self.closed.get()
    }

    pub fn reads(&self) -> usize {
        self.reads.get()
    }
}

impl MockTransport {
    pub fn new(data: &[u8]) -> (Self, MockState) {
        let state = MockState::default();
        let transport = Self {
            input: Cursor::new(data.to_vec()),
            state: state.clone(),
            fail_read: false,
            fail_write: false,
        };

        (transport, state)
    }

    pub fn failing_read(mut self) -> Self {
        self.fail_read = true;
        self
    }

    pub fn failing_write(mut self) -> Self {
        self.fail_write = true;
        self
    }
}

impl Read for MockTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.state.reads.set(self.state.reads.get() + 1);

        if self.fail_read {
            return Err(io::Error::new(ErrorKind::ConnectionReset, "mock read failure"));
        }

        self.input.read(buf)
    }
}

impl Write for MockTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.fail_write {
            return Err(io::Error::new(ErrorKind::BrokenPipe, "mock write failure"));
        }

        self.state.written.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Transport for MockTransport {
    fn close(&mut self) -> io::Result<()> {
        self.state.closed.set(true);
        Ok(())
    }
}

//! TCP transport for the console client.

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use serde_json::json;

use conch_config::SocketEndpoint;

use crate::errors::AppError;

pub(crate) const CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Connects to the console endpoint with a bounded timeout.
pub(crate) fn connect(endpoint: &SocketEndpoint) -> Result<TcpStream, AppError> {
    let display = endpoint.to_string();
    let address = resolve(endpoint.host(), endpoint.port())
        .map_err(|source| AppError::resolve(display.clone(), source))?;
    TcpStream::connect_timeout(&address, CONNECTION_TIMEOUT)
        .map_err(|source| AppError::connect(display, source))
}

fn resolve(host: &str, port: u16) -> io::Result<SocketAddr> {
    let mut addrs = (host, port).to_socket_addrs()?;
    addrs
        .next()
        .ok_or_else(|| io::Error::new(io::ErrorKind::AddrNotAvailable, "no resolved addresses"))
}

/// Sends one request line and reads the reply frame up to its blank
/// terminator line, discarding anything past the terminator.
pub(crate) fn exchange<S: Read + Write>(
    stream: &mut S,
    tokens: &[String],
) -> Result<String, AppError> {
    let mut request = json!({ "id": 0, "query": tokens }).to_string();
    request.push('\n');
    stream.write_all(request.as_bytes()).map_err(AppError::io)?;
    stream.flush().map_err(AppError::io)?;

    let mut reply = Vec::new();
    let mut buffer = [0_u8; 1024];
    loop {
        let read = match stream.read(&mut buffer) {
            Ok(0) => break,
            Ok(read) => read,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(error) => return Err(AppError::io(error)),
        };
        reply.extend_from_slice(&buffer[..read]);
        // The terminator may land anywhere in a chunk, including split
        // across two reads.
        if let Some(end) = frame_end(&reply) {
            reply.truncate(end + 2);
            break;
        }
    }

    if reply.is_empty() {
        return Err(AppError::EmptyReply);
    }
    Ok(String::from_utf8_lossy(&reply).into_owned())
}

fn frame_end(reply: &[u8]) -> Option<usize> {
    reply.windows(2).position(|window| window == b"\n\n")
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    /// In-memory stream pairing scripted input with captured output.
    /// Reads hand out at most `chunk` bytes at a time.
    struct FakeStream {
        input: Cursor<Vec<u8>>,
        output: Vec<u8>,
        chunk: usize,
    }

    impl FakeStream {
        fn replying(reply: &str) -> Self {
            Self {
                input: Cursor::new(reply.as_bytes().to_vec()),
                output: Vec::new(),
                chunk: usize::MAX,
            }
        }

        fn replying_in_chunks(reply: &str, chunk: usize) -> Self {
            Self {
                chunk,
                ..Self::replying(reply)
            }
        }
    }

    impl Read for FakeStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let cap = self.chunk.min(buf.len());
            self.input.read(&mut buf[..cap])
        }
    }

    impl Write for FakeStream {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.output.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn sends_the_request_as_one_json_line() {
        let mut stream = FakeStream::replying("0:\n[\"pong\"]\n\n");
        let tokens = vec![String::from("sys"), String::from("ping")];
        exchange(&mut stream, &tokens).expect("exchange");
        assert_eq!(
            String::from_utf8(stream.output).expect("utf8"),
            "{\"id\":0,\"query\":[\"sys\",\"ping\"]}\n"
        );
    }

    #[test]
    fn reads_until_the_blank_terminator() {
        let mut stream = FakeStream::replying("0:\n[\"pong\"]\n\ntrailing");
        let tokens = vec![String::from("sys"), String::from("ping")];
        let reply = exchange(&mut stream, &tokens).expect("exchange");
        assert_eq!(reply, "0:\n[\"pong\"]\n\n");
    }

    #[test]
    fn terminator_split_across_reads_still_ends_the_frame() {
        let mut stream = FakeStream::replying_in_chunks("0:\n[\"pong\"]\n\ntrailing", 3);
        let tokens = vec![String::from("sys"), String::from("ping")];
        let reply = exchange(&mut stream, &tokens).expect("exchange");
        assert_eq!(reply, "0:\n[\"pong\"]\n\n");
    }

    #[test]
    fn closed_connection_without_reply_is_an_error() {
        let mut stream = FakeStream::replying("");
        let tokens = vec![String::from("sys"), String::from("ping")];
        assert!(matches!(
            exchange(&mut stream, &tokens),
            Err(AppError::EmptyReply)
        ));
    }
}

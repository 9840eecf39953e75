use std::{
    io::{self, BufRead, BufReader},
    sync::mpsc,
    thread,
};

use crate::prelude::*;

#[derive(Debug, PartialEq, Eq)]
pub enum InputMessage {
    Line(String),
    Eof,
    Error(String),
}

/// Reads standard input on a dedicated thread, one line per request, so the
/// terminal is only read while the prompt is showing.
pub struct InputReader {
    requests: mpsc::Sender<()>,
    lines: Receiver<InputMessage>,
}

impl InputReader {
    pub fn spawn(max_line_len: usize) -> io::Result<Self> {
        Self::spawn_with(BufReader::new(io::stdin()), max_line_len)
    }

    pub fn spawn_with<R>(reader: R, max_line_len: usize) -> io::Result<Self>
    where
        R: BufRead + Send + 'static,
    {
        let (requests, pending) = mpsc::channel::<()>();
        let (sender, lines) = unbounded_channel();

        thread::Builder::new()
            .name("tish-input".into())
            .spawn(move || input_thread(reader, max_line_len, pending, sender))?;

        Ok(Self { requests, lines })
    }

    pub fn request(&self) -> Result<(), mpsc::SendError<()>> {
        self.requests.send(())
    }

    pub async fn recv(&mut self) -> InputMessage {
        self.lines.recv().await.unwrap_or(InputMessage::Eof)
    }
}

fn input_thread<R: BufRead>(
    mut reader: R,
    max_line_len: usize,
    pending: mpsc::Receiver<()>,
    sender: Sender<InputMessage>,
) {
    let mut buf = Vec::new();

    while pending.recv().is_ok() {
        buf.clear();

        let msg = match reader.read_until(b'\n', &mut buf) {
            Ok(0) => InputMessage::Eof,
            Ok(_) => InputMessage::Line(truncate_line(&buf, max_line_len)),
            Err(err) => InputMessage::Error(err.to_string()),
        };

        let done = !matches!(msg, InputMessage::Line(_));
        if sender.send(msg).is_err() || done {
            break;
        }
    }

    trace!("input thread finished");
}

/// Drops the line terminator and anything past `max_line_len - 1` bytes,
/// backing off to a character boundary.
pub fn truncate_line(raw: &[u8], max_line_len: usize) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    let line = String::from_utf8_lossy(raw);

    let mut end = line.len().min(max_line_len.saturating_sub(1));
    while !line.is_char_boundary(end) {
        end -= 1;
    }

    if end < line.len() {
        debug!(len = line.len(), end, "truncating long input line");
    }

    line[..end].to_owned()
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn strips_line_terminators() {
        assert_eq!(truncate_line(b"ls -l\r\n", 1024), "ls -l");
        assert_eq!(truncate_line(b"ls", 1024), "ls");
    }

    #[test]
    fn cuts_long_lines_to_buffer_size() {
        assert_eq!(truncate_line(b"abcdefgh\n", 5), "abcd");
    }

    #[test]
    fn never_splits_a_character() {
        assert_eq!(truncate_line("aé".as_bytes(), 3), "a");
    }

    async fn next_line(reader: &mut InputReader) -> InputMessage {
        if reader.request().is_err() {
            return InputMessage::Eof;
        }
        reader.recv().await
    }

    #[tokio::test]
    async fn reads_one_line_per_request() {
        let input = Cursor::new(b"echo one\necho two\n".to_vec());
        let mut reader = InputReader::spawn_with(input, 1024).unwrap();

        assert_eq!(next_line(&mut reader).await, InputMessage::Line("echo one".into()));
        assert_eq!(next_line(&mut reader).await, InputMessage::Line("echo two".into()));
        assert_eq!(next_line(&mut reader).await, InputMessage::Eof);
        assert_eq!(next_line(&mut reader).await, InputMessage::Eof);
    }

    #[tokio::test]
    async fn partial_last_line_is_delivered() {
        let input = Cursor::new(b"pwd".to_vec());
        let mut reader = InputReader::spawn_with(input, 1024).unwrap();

        assert_eq!(next_line(&mut reader).await, InputMessage::Line("pwd".into()));
        assert_eq!(next_line(&mut reader).await, InputMessage::Eof);
    }
}

#[cfg(test)]
#[path = "decoder_test.rs"]
mod tests;

const DATA_PREFIX: &str = "data:";
const DELIMITERS: [&str; 2] = ["\r\n\r\n", "\n\n"];

/// Incremental decoder for delimited event-stream bodies.
///
/// Bytes are decoded as UTF-8 across fragment boundaries and the decoded text is
/// split on blank lines. The text after the last delimiter is kept as the
/// incomplete tail and completed by the next fragment.
#[derive(Debug, Default)]
pub struct DelimitedDecoder {
    pending: Vec<u8>,
    buffer: String,
}

impl DelimitedDecoder {
    pub fn new() -> DelimitedDecoder {
        return DelimitedDecoder::default();
    }

    /// Feeds one network fragment and returns the chunk texts of every event it
    /// completed, in order.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        self.decode(bytes);

        let mut chunks = vec![];
        while let Some((end, delimiter_len)) = find_delimiter(&self.buffer) {
            let event: String = self.buffer.drain(..end + delimiter_len).collect();
            extract_data(&event[..end], &mut chunks);
        }

        return chunks;
    }

    /// The undelimited text still waiting for the rest of its event.
    pub fn tail(&self) -> &str {
        return &self.buffer;
    }

    /// Ends the body. An unterminated tail is not an event and is discarded.
    pub fn finish(&mut self) {
        if !self.buffer.trim().is_empty() || !self.pending.is_empty() {
            tracing::debug!(
                tail = self.buffer.as_str(),
                pending_bytes = self.pending.len(),
                "discarding unterminated event at end of stream"
            );
        }
        self.buffer.clear();
        self.pending.clear();
    }

    fn decode(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);

        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    self.buffer.push_str(text);
                    self.pending.clear();
                    return;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    if let Ok(text) = std::str::from_utf8(&self.pending[..valid]) {
                        self.buffer.push_str(text);
                    }

                    match err.error_len() {
                        // Sequence cut by the fragment boundary, wait for more bytes.
                        None => {
                            self.pending.drain(..valid);
                            return;
                        }
                        Some(invalid_len) => {
                            self.buffer.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + invalid_len);
                        }
                    }
                }
            }
        }
    }
}

fn find_delimiter(buffer: &str) -> Option<(usize, usize)> {
    return DELIMITERS
        .iter()
        .filter_map(|delimiter| {
            return buffer
                .find(delimiter)
                .map(|position| (position, delimiter.len()));
        })
        .min_by_key(|(position, _)| *position);
}

fn extract_data(event: &str, chunks: &mut Vec<String>) {
    let mut continuation = false;
    for line in event.lines() {
        if let Some(data) = line.strip_prefix(DATA_PREFIX) {
            let data = data.strip_prefix(' ').unwrap_or(data);
            if continuation {
                chunks.push(format!("\n{data}"));
            } else {
                chunks.push(data.to_string());
            }
            continuation = true;
        }
    }
}

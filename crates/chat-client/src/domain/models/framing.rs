use strum::EnumIter;
use strum::EnumString;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;

/// Wire framing used by the backend for streamed responses.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, strum::Display, EnumString, EnumVariantNames, EnumIter,
)]
#[strum(serialize_all = "kebab-case")]
pub enum Framing {
    /// `data:` lines separated by blank lines over a chunked HTTP body.
    #[default]
    Delimited,
    /// One transport message per chunk over a websocket.
    Message,
}

impl Framing {
    pub fn parse(s: &str) -> Option<Framing> {
        return Framing::iter().find(|e| return e.to_string() == s);
    }
}

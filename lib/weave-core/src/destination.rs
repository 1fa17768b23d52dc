//! Where a successful response body goes.

use std::fmt;
use std::io::Write;

use serde::de::DeserializeOwned;

use crate::{Result, from_json_optional};

/// A value a JSON body can be decoded into in place.
///
/// Implemented for every [`DeserializeOwned`] type. A blank body leaves the
/// target untouched; a failed decode leaves it untouched too.
pub trait JsonTarget {
    /// Decode `bytes` and store the result in `self`.
    ///
    /// # Errors
    ///
    /// Returns an error if a non-blank body fails to deserialize.
    fn decode_json(&mut self, bytes: &[u8]) -> Result<()>;
}

impl<T: DeserializeOwned> JsonTarget for T {
    fn decode_json(&mut self, bytes: &[u8]) -> Result<()> {
        if let Some(value) = from_json_optional(bytes)? {
            *self = value;
        }
        Ok(())
    }
}

/// Destination of a successful response body.
///
/// ```
/// use weave_core::Destination;
///
/// let mut names: Vec<String> = Vec::new();
/// Destination::json(&mut names).write_body(br#"["a","b"]"#).unwrap();
/// assert_eq!(names, ["a", "b"]);
///
/// let mut raw = Vec::new();
/// Destination::raw(&mut raw).write_body(b"bytes").unwrap();
/// assert_eq!(raw, b"bytes");
/// ```
pub enum Destination<'a> {
    /// Ignore the body.
    Discard,
    /// Copy the body verbatim.
    Raw(&'a mut (dyn Write + Send)),
    /// Decode the body as JSON.
    Json(&'a mut (dyn JsonTarget + Send)),
}

impl<'a> Destination<'a> {
    /// Copy the body into a writer.
    pub fn raw<W: Write + Send>(writer: &'a mut W) -> Self {
        Self::Raw(writer)
    }

    /// Decode the body as JSON into `target`.
    pub fn json<T: DeserializeOwned + Send>(target: &'a mut T) -> Self {
        Self::Json(target)
    }

    /// Deliver `body` to this destination.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::Error::Io) when the writer fails, or a JSON
    /// deserialization error when a non-blank body does not decode.
    pub fn write_body(self, body: &[u8]) -> Result<()> {
        match self {
            Self::Discard => Ok(()),
            Self::Raw(writer) => {
                writer.write_all(body)?;
                writer.flush()?;
                Ok(())
            }
            Self::Json(target) => target.decode_json(body),
        }
    }
}

impl fmt::Debug for Destination<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discard => f.write_str("Discard"),
            Self::Raw(_) => f.write_str("Raw(..)"),
            Self::Json(_) => f.write_str("Json(..)"),
        }
    }
}

// file: src/geom/request.rs
// version: 1.0.0
// guid: 6c0e3b1a-94d2-4f57-8a1e-2d7b5f90c3a4

//! In-memory model of a `gctl_req` control request
//!
//! A [`Request`] is an ordered list of named parameters that is bound into a
//! native handle only when it is issued. Keeping the model on the Rust side
//! lets every backend share one diagnostic dump and lets tests inspect what
//! would have been sent to the kernel.

use std::fmt;
use std::io::{self, Write};

use libc::c_long;

use super::control::Control;
use crate::Result;

/// How the kernel may access a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Bound with `gctl_ro_param`
    ReadOnly,
    /// Bound with `gctl_rw_param`
    ReadWrite,
}

impl Access {
    /// Flag letters as printed by `gctl_dump`
    pub fn flags(&self) -> &'static str {
        match self {
            Access::ReadOnly => "R",
            Access::ReadWrite => "RW",
        }
    }
}

/// Value carried by a request parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// NUL-terminated ASCII text, bound with a length of `-1`
    Ascii(String),
    /// Native `long`, bound as raw bytes
    Int(c_long),
}

impl ParamValue {
    /// Length the kernel sees for this value
    fn len(&self) -> usize {
        match self {
            ParamValue::Ascii(text) => text.len() + 1,
            ParamValue::Int(_) => std::mem::size_of::<c_long>(),
        }
    }

    /// Text value, if this is an ASCII parameter
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Ascii(text) => Some(text),
            ParamValue::Int(_) => None,
        }
    }

    /// Bytes handed to libgeom: text plus its terminating NUL, or the
    /// integer in native byte order.
    pub fn to_c_bytes(&self) -> Vec<u8> {
        match self {
            ParamValue::Ascii(text) => {
                let mut bytes = Vec::with_capacity(text.len() + 1);
                bytes.extend_from_slice(text.as_bytes());
                bytes.push(0);
                bytes
            }
            ParamValue::Int(value) => value.to_ne_bytes().to_vec(),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Ascii(text) => f.write_str(text),
            ParamValue::Int(value) => write!(f, "{}", value),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(text: &str) -> Self {
        ParamValue::Ascii(text.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(text: String) -> Self {
        ParamValue::Ascii(text)
    }
}

impl From<c_long> for ParamValue {
    fn from(value: c_long) -> Self {
        ParamValue::Int(value)
    }
}

/// A single named parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    name: String,
    value: ParamValue,
    access: Access,
}

impl Param {
    pub fn new(name: impl Into<String>, value: impl Into<ParamValue>, access: Access) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            access,
        }
    }

    /// Read-only parameter, the common case
    pub fn ro(name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        Self::new(name, value, Access::ReadOnly)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &ParamValue {
        &self.value
    }

    pub fn access(&self) -> Access {
        self.access
    }
}

/// A control request against a GEOM class
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    params: Vec<Param>,
    error: Option<String>,
}

impl Request {
    /// Create an empty request
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a read-only parameter
    pub fn ro_param(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> &mut Self {
        self.params.push(Param::new(name, value, Access::ReadOnly));
        self
    }

    /// Append a read-write parameter
    pub fn rw_param(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> &mut Self {
        self.params.push(Param::new(name, value, Access::ReadWrite));
        self
    }

    /// Append an already built parameter
    pub fn push(&mut self, param: Param) -> &mut Self {
        self.params.push(param);
        self
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// First value bound under `name`
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.params
            .iter()
            .find(|param| param.name == name)
            .map(|param| &param.value)
    }

    /// Error text recorded by the last issue, if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Record an error that did not come from the kernel
    pub fn set_error(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
    }

    /// Submit the request through `control` and record the outcome
    pub fn issue<C: Control + ?Sized>(&mut self, control: &mut C) -> Result<Option<&str>> {
        self.error = control.issue(self)?;
        Ok(self.error.as_deref())
    }

    /// Write the request in the `gctl_dump(3)` layout
    pub fn dump<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "Dump of gctl request at {:p}:", self)?;
        match &self.error {
            Some(error) => writeln!(out, "  error:\t\"{}\"", error)?,
            None => writeln!(out, "  error:\tNULL")?,
        }
        for param in &self.params {
            write!(
                out,
                "  param:\t\"{}\" ({}) [{}",
                param.name,
                param.name.len() + 1,
                param.access.flags()
            )?;
            match &param.value {
                ParamValue::Ascii(text) => write!(out, "{}] = \"{}\"", param.value.len(), text)?,
                ParamValue::Int(_) => {
                    write!(out, "{}] = ", param.value.len())?;
                    for byte in param.value.to_c_bytes() {
                        write!(out, " {:02x}", byte)?;
                    }
                }
            }
            writeln!(out)?;
        }
        Ok(())
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for param in &self.params {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            write!(f, "{}={}", param.name, param.value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dump_to_string(request: &Request) -> String {
        let mut out = Vec::new();
        request.dump(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_params_keep_insertion_order() {
        let mut request = Request::new();
        request
            .ro_param("class", "PART")
            .ro_param("verb", "delete")
            .ro_param("geom", "ada1");

        let names: Vec<&str> = request.params().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["class", "verb", "geom"]);
        assert_eq!(request.get("verb").and_then(|v| v.as_str()), Some("delete"));
        assert!(request.get("index").is_none());
    }

    #[test]
    fn test_ascii_length_counts_terminator() {
        let value = ParamValue::from("PART");
        assert_eq!(value.len(), 5);
        assert_eq!(value.to_c_bytes(), b"PART\0".to_vec());
    }

    #[test]
    fn test_dump_without_error() {
        let mut request = Request::new();
        request.ro_param("class", "PART").ro_param("index", "1");

        let dump = dump_to_string(&request);
        let lines: Vec<&str> = dump.lines().collect();

        assert!(lines[0].starts_with("Dump of gctl request at "));
        assert!(lines[0].ends_with(':'));
        assert_eq!(lines[1], "  error:\tNULL");
        assert_eq!(lines[2], "  param:\t\"class\" (6) [R5] = \"PART\"");
        assert_eq!(lines[3], "  param:\t\"index\" (6) [R2] = \"1\"");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_dump_with_error_and_integer() {
        let mut request = Request::new();
        request.rw_param("index", 1 as c_long);
        request.set_error("Device busy");

        let dump = dump_to_string(&request);
        let width = std::mem::size_of::<c_long>();
        let bytes: String = (1 as c_long)
            .to_ne_bytes()
            .iter()
            .map(|b| format!(" {:02x}", b))
            .collect();

        assert!(dump.contains("  error:\t\"Device busy\"\n"));
        assert!(dump.contains(&format!("  param:\t\"index\" (6) [RW{}] = {}\n", width, bytes)));
    }

    #[test]
    fn test_display_summarizes_params() {
        let mut request = Request::new();
        request.ro_param("class", "PART").ro_param("index", 3 as c_long);
        assert_eq!(request.to_string(), "class=PART index=3");
    }
}

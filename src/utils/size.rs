// file: src/utils/size.rs
// version: 1.0.0
// guid: 3e7b1c95-08fa-4d26-b1e3-6a9d2f4c8075

//! Human readable byte sizes, 1024-based like gpart's own output

use crate::error::AgentError;
use crate::Result;

const SUFFIXES: [&str; 5] = ["b", "k", "M", "G", "T"];

/// Render `bytes` with a unit suffix and `precision` decimals
pub fn bytes_to_string(bytes: u64, precision: usize) -> String {
    let mut value = bytes as f64;
    let mut suffix = SUFFIXES[0];
    for &next in &SUFFIXES[1..] {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        suffix = next;
    }
    format!("{:.*}{}", precision, value, suffix)
}

/// Parse sizes such as `512`, `1,024k`, `1.5G` or `2t` into bytes.
///
/// Parsing stops at the first character that is not a digit, `.` or `,`;
/// that character selects the unit and anything after it is ignored.
pub fn string_to_bytes(text: &str) -> Result<u64> {
    let mut number = String::new();
    let mut multiplier: u64 = 1;
    for c in text.trim().chars() {
        match c {
            '0'..='9' | '.' => number.push(c),
            ',' => {}
            _ => {
                multiplier = match c.to_ascii_lowercase() {
                    'k' => 1 << 10,
                    'm' => 1 << 20,
                    'g' => 1 << 30,
                    't' => 1 << 40,
                    _ => 1,
                };
                break;
            }
        }
    }

    if number.is_empty() {
        return Err(AgentError::invalid_size(format!("no number in {:?}", text)));
    }

    if number.contains('.') {
        let value: f64 = number
            .parse()
            .map_err(|_| AgentError::invalid_size(format!("bad number in {:?}", text)))?;
        Ok((value * multiplier as f64).floor() as u64)
    } else {
        let value: u64 = number
            .parse()
            .map_err(|_| AgentError::invalid_size(format!("bad number in {:?}", text)))?;
        value
            .checked_mul(multiplier)
            .ok_or_else(|| AgentError::invalid_size(format!("{:?} is too large", text)))
    }
}

//! Tag-delimited text envelope
//!
//! ```text
//! <head>(<version>)<body><foot>
//! ```
//!
//! Used for portable key exports, where the body is base64 and the tags make
//! the blob survive being pasted into text with surrounding noise.

use mixcrypt_core::{CryptoError, CryptoResult};

/// Wrap `body` between `head` and `foot` with a parenthesised version.
pub fn encode_tagged(head: &str, foot: &str, version: &str, body: &str) -> String {
    let mut out = String::with_capacity(head.len() + foot.len() + version.len() + body.len() + 2);
    out.push_str(head);
    out.push('(');
    out.push_str(version);
    out.push(')');
    out.push_str(body);
    out.push_str(foot);
    out
}

/// Split a tagged envelope into `(version, body)`.
///
/// Text before the head tag and after the foot tag is ignored.
pub fn decode_tagged<'a>(head: &str, foot: &str, data: &'a str) -> CryptoResult<(&'a str, &'a str)> {
    let Some(head_at) = data.find(head) else {
        return Err(CryptoError::malformed(format!("missing head tag {head}")));
    };
    let Some(foot_at) = data.rfind(foot) else {
        return Err(CryptoError::malformed(format!("missing foot tag {foot}")));
    };
    let inner_start = head_at + head.len();
    if foot_at < inner_start {
        return Err(CryptoError::malformed("foot tag precedes head tag"));
    }
    let inner = &data[inner_start..foot_at];

    let Some(rest) = inner.strip_prefix('(') else {
        return Err(CryptoError::malformed("missing version"));
    };
    let Some(close) = rest.find(')') else {
        return Err(CryptoError::malformed("unterminated version"));
    };
    let version = &rest[..close];
    if version.is_empty() {
        return Err(CryptoError::malformed("empty version"));
    }
    Ok((version, &rest[close + 1..]))
}

//! Best-effort quoted-printable decoding

/// Decode quoted-printable text
///
/// Soft line breaks are removed and `=XX` escapes become the byte they name.
/// Anything that is not a valid escape is kept as is. Decoded bytes are read
/// as UTF-8, falling back to Latin-1 for the escaped bytes when they do not
/// form valid UTF-8.
#[must_use]
pub fn decode_quoted_printable(input: &str) -> String {
    let bytes = decode_bytes(input, |b| vec![b]);
    match String::from_utf8(bytes) {
        Ok(decoded) => decoded,
        Err(_) => {
            let latin1 = decode_bytes(input, |b| char::from(b).to_string().into_bytes());
            String::from_utf8_lossy(&latin1).into_owned()
        }
    }
}

fn decode_bytes(input: &str, escaped: impl Fn(u8) -> Vec<u8>) -> Vec<u8> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'=' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }

        let rest = &bytes[i + 1..];
        if rest.starts_with(b"\r\n") {
            i += 3;
        } else if rest.starts_with(b"\n") {
            i += 2;
        } else if let [hi, lo, ..] = rest
            && let (Some(hi), Some(lo)) = (hex_value(*hi), hex_value(*lo))
        {
            out.extend(escaped((hi << 4) | lo));
            i += 3;
        } else {
            out.push(b'=');
            i += 1;
        }
    }

    out
}

const fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

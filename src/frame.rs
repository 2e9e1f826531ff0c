//! LIS1-A / ASTM E1381 frame handling: checksum, framing and control-character notation.
//!
//! A frame on the wire looks like
//!
//! ```text
//! <STX> FN text <CR> <ETX|ETB> C1 C2 <CR> <LF>
//! ```
//!
//! `FN` is the frame number (`0`-`7`), `ETB` ends an intermediate frame and `ETX`
//! the last one. `C1 C2` are the checksum as two uppercase hex digits: the sum of
//! every byte after `STX` up to and including the end marker, modulo 256.

use crate::error::CodecError;

pub const NUL: u8 = 0x00;
pub const STX: u8 = 0x02;
pub const ETX: u8 = 0x03;
pub const EOT: u8 = 0x04;
pub const ENQ: u8 = 0x05;
pub const ACK: u8 = 0x06;
pub const LF: u8 = 0x0A;
pub const CR: u8 = 0x0D;
pub const NAK: u8 = 0x15;
pub const ETB: u8 = 0x17;

/// Bytes added around the text of a frame: STX, FN, ETX, C1, C2, CR, LF.
pub const FRAME_OVERHEAD: usize = 7;

/// Maximum text characters per frame.
pub const MAX_FRAME_TEXT: usize = 240;

const CONTROL_NAMES: [(u8, &str); 10] = [
    (NUL, "NUL"),
    (STX, "STX"),
    (ETX, "ETX"),
    (EOT, "EOT"),
    (ENQ, "ENQ"),
    (ACK, "ACK"),
    (LF, "LF"),
    (CR, "CR"),
    (NAK, "NAK"),
    (ETB, "ETB"),
];

/// Start marker (resets the sum) and the two end markers (included, then stop).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameMarkers {
    pub start: u8,
    pub ends: [u8; 2],
}

impl Default for FrameMarkers {
    fn default() -> Self {
        FrameMarkers {
            start: STX,
            ends: [ETX, ETB],
        }
    }
}

impl FrameMarkers {
    fn end_position(&self, frame: &[u8]) -> Option<usize> {
        frame.iter().position(|b| self.ends.contains(b))
    }
}

/// Checksum with the standard STX / ETX / ETB markers.
pub fn checksum(frame: &[u8]) -> String {
    checksum_with(frame, &FrameMarkers::default())
}

/// Sum-of-bytes modulo 256 as two uppercase hex digits. The start marker resets the
/// sum; the first end marker is added and ends the computation.
pub fn checksum_with(frame: &[u8], markers: &FrameMarkers) -> String {
    let mut sum: u8 = 0;
    for &b in frame {
        if b == markers.start {
            sum = 0;
            continue;
        }
        sum = sum.wrapping_add(b);
        if markers.ends.contains(&b) {
            break;
        }
    }
    format!("{:02X}", sum)
}

/// Frame one record: `STX FN record CR (ETX|ETB) C1 C2 CR LF`. `record` excludes
/// its terminating CR; `frame_number` is taken modulo 8.
pub fn build_frame(frame_number: u8, record: &[u8], last: bool) -> Vec<u8> {
    let mut frame = Vec::with_capacity(record.len() + FRAME_OVERHEAD + 1);
    frame.push(STX);
    frame.push(b'0' + frame_number % 8);
    frame.extend_from_slice(record);
    frame.push(CR);
    frame.push(if last { ETX } else { ETB });
    let sum = checksum(&frame);
    frame.extend_from_slice(sum.as_bytes());
    frame.extend_from_slice(&[CR, LF]);
    frame
}

/// Split a record over as many frames as needed, at most [`MAX_FRAME_TEXT`] bytes of
/// text each. Intermediate frames end with ETB and carry no record CR; the last frame
/// ends with the record CR and ETX. Frame numbers continue from `first_number`.
pub fn frames_for_record(record: &[u8], first_number: u8) -> Vec<Vec<u8>> {
    let mut text = record.to_vec();
    text.push(CR);
    let chunks: Vec<&[u8]> = text.chunks(MAX_FRAME_TEXT).collect();
    let count = chunks.len();
    chunks
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| {
            let last = i + 1 == count;
            let mut frame = Vec::with_capacity(chunk.len() + FRAME_OVERHEAD);
            frame.push(STX);
            frame.push(b'0' + first_number.wrapping_add(i as u8) % 8);
            frame.extend_from_slice(chunk);
            frame.push(if last { ETX } else { ETB });
            let sum = checksum(&frame);
            frame.extend_from_slice(sum.as_bytes());
            frame.extend_from_slice(&[CR, LF]);
            frame
        })
        .collect()
}

/// Recompute the checksum and rewrite the `C1 C2 CR LF` trailer after the first end
/// marker, discarding anything that followed it.
pub fn complete_frame(frame: &[u8], markers: &FrameMarkers) -> Result<Vec<u8>, CodecError> {
    let end = markers
        .end_position(frame)
        .ok_or_else(|| CodecError::Frame("no end marker in frame".to_string()))?;
    let sum = checksum_with(frame, markers);
    let mut out = frame[..=end].to_vec();
    out.extend_from_slice(sum.as_bytes());
    out.extend_from_slice(&[CR, LF]);
    Ok(out)
}

/// Compare the two checksum characters after the end marker with the computed sum.
pub fn verify_frame(frame: &[u8], markers: &FrameMarkers) -> Result<bool, CodecError> {
    let end = markers
        .end_position(frame)
        .ok_or_else(|| CodecError::Frame("no end marker in frame".to_string()))?;
    let received = frame
        .get(end + 1..end + 3)
        .ok_or_else(|| CodecError::Frame("frame has no checksum characters".to_string()))?;
    let expected = checksum_with(frame, markers);
    Ok(received.eq_ignore_ascii_case(expected.as_bytes()))
}

/// Render control bytes as `<STX>` style names. Non-UTF-8 bytes are replaced.
pub fn beautify(frame: &[u8]) -> String {
    let mut out = Vec::with_capacity(frame.len() + 16);
    for &b in frame {
        match CONTROL_NAMES.iter().find(|(code, _)| *code == b) {
            Some((_, name)) => {
                out.push(b'<');
                out.extend_from_slice(name.as_bytes());
                out.push(b'>');
            }
            None => out.push(b),
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Inverse of [`beautify`]: `<STX>`, `<stx>` etc. become control bytes. Unknown
/// names are kept as typed.
pub fn unbeautify(text: &str) -> Vec<u8> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    'scan: while i < bytes.len() {
        if bytes[i] == b'<' {
            for (code, name) in CONTROL_NAMES {
                let end = i + 1 + name.len();
                if bytes.len() > end
                    && bytes[end] == b'>'
                    && bytes[i + 1..end].eq_ignore_ascii_case(name.as_bytes())
                {
                    out.push(code);
                    i = end + 1;
                    continue 'scan;
                }
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    out
}

use bytes::{Buf, BytesMut};
use std::io;
use tokio_util::codec::Decoder;

/// Frames a byte stream in some legacy charset into UTF-8 chunks.
///
/// Spreadsheet exports saved from desktop tools are often Windows-1252;
/// this lets them go through the same text pipeline as a fetched body.
pub struct Utf8Transcoder {
    decoder: encoding_rs::Decoder,
}

impl Utf8Transcoder {
    pub fn new(encoding: &'static encoding_rs::Encoding) -> Self {
        Self {
            decoder: encoding.new_decoder(),
        }
    }

    fn transcode(&mut self, src: &mut BytesMut, last: bool) -> Option<BytesMut> {
        let capacity = self
            .decoder
            .max_utf8_buffer_length(src.len())
            .unwrap_or(src.len() * 3);
        let mut out = vec![0u8; capacity];

        let (_result, read, written, _replaced) = self.decoder.decode_to_utf8(src, &mut out, last);
        src.advance(read);

        if read == 0 && written == 0 {
            return None;
        }
        out.truncate(written);
        Some(BytesMut::from(&out[..]))
    }
}

impl Decoder for Utf8Transcoder {
    type Item = BytesMut;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }
        Ok(self.transcode(src, false))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }
        let chunk = self.transcode(src, true);
        src.clear();
        Ok(chunk.filter(|c| !c.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_1252_to_utf8() {
        let mut codec = Utf8Transcoder::new(encoding_rs::WINDOWS_1252);
        // "José,5" with é as 0xE9
        let mut src = BytesMut::from(&b"Jos\xe9,5"[..]);
        let out = codec.decode_eof(&mut src).unwrap().unwrap();
        assert_eq!(std::str::from_utf8(&out).unwrap(), "José,5");
        assert!(src.is_empty());
    }

    #[test]
    fn empty_input_yields_nothing() {
        let mut codec = Utf8Transcoder::new(encoding_rs::WINDOWS_1252);
        let mut src = BytesMut::new();
        assert!(codec.decode(&mut src).unwrap().is_none());
        assert!(codec.decode_eof(&mut src).unwrap().is_none());
    }
}

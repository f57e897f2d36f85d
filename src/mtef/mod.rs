// MTEF (MathType Equation Format) to LaTeX conversion.
//
// The pipeline has three stages, each independently testable:
//
// 1. `decoder` walks the tagged binary record stream and emits a flat,
//    ordered list of typed records;
// 2. `tree` folds that list into a rooted tree using the slot-terminator
//    stack protocol (the tree is implicit in the bytes; End records are the
//    only framing);
// 3. `latex` lowers the tree to a LaTeX string.
//
// One decode is a pure function from input bytes to a LaTeX string or an
// error; there is no shared state, so decodes may run in parallel freely.
//
// References:
// - https://docs.wiris.com/mathtype/en/mathtype-sdk/mtef5.html
// - https://docs.wiris.com/mathtype/en/mathtype-sdk/mtefstorage.html

pub mod charmap;
mod decoder;
mod latex;
pub mod reader;
pub mod records;
mod tree;

pub use decoder::{MtefDecoder, MtefHeader};
pub use latex::LatexEmitter;
pub use records::{Char, Embell, EqnPrefs, FontDef, Line, Matrix, Nudge, Pile, Record, Tmpl};
pub use tree::{build_tree, AstNode};

use crate::error::{Error, Result};
use crate::ole::OleFile;
use std::io::{Read, Seek};

/// Name of the stream holding the equation inside an embedded MathType
/// OLE object.
pub const EQUATION_STREAM: &str = "Equation Native";

/// Length of the OLE equation header that prefixes the MTEF body inside
/// the `Equation Native` stream.
const EQN_OLE_HEADER_LEN: usize = 28;

/// A parsed MathType equation.
#[derive(Debug, Clone)]
pub struct Equation {
    header: MtefHeader,
    root: AstNode,
}

impl Equation {
    /// Parse an `Equation Native` stream payload: a 28-byte OLE equation
    /// header followed by the MTEF body.
    pub fn parse(payload: &[u8]) -> Result<Self> {
        Self::from_mtef(equation_body(payload)?)
    }

    /// Parse a bare MTEF body (no OLE equation header).
    pub fn from_mtef(body: &[u8]) -> Result<Self> {
        let mut decoder = MtefDecoder::new(body)?;
        let records = decoder.decode_records()?;
        let header = decoder.header().clone();
        Ok(Self {
            header,
            root: build_tree(records),
        })
    }

    pub fn header(&self) -> &MtefHeader {
        &self.header
    }

    /// Root of the assembled equation tree.
    pub fn root(&self) -> &AstNode {
        &self.root
    }

    /// Lower the equation to LaTeX, discarding diagnostics.
    pub fn to_latex(&self) -> String {
        LatexEmitter::new().emit(&self.root)
    }

    /// Lower the equation to LaTeX and return the non-fatal diagnostics
    /// (unknown selectors/embellishments) collected along the way.
    pub fn to_latex_with_diagnostics(&self) -> (String, Vec<String>) {
        let mut emitter = LatexEmitter::new();
        let latex = emitter.emit(&self.root);
        (latex, emitter.into_diagnostics())
    }
}

/// Convert an `Equation Native` stream payload to LaTeX.
///
/// The output always begins with `"$$ "` and ends with `" $$"`.
///
/// # Example
///
/// ```no_run
/// let payload = std::fs::read("equation.bin")?;
/// let latex = longan::decode(&payload)?;
/// println!("{latex}");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn decode(payload: &[u8]) -> Result<String> {
    Equation::parse(payload).map(|eq| eq.to_latex())
}

/// Open a MathType OLE object (a compound file), locate its
/// `Equation Native` stream, and convert it to LaTeX.
pub fn decode_ole_object<R: Read + Seek>(reader: R) -> Result<String> {
    let mut ole = OleFile::open(reader)?;
    let payload = ole.open_stream(&[EQUATION_STREAM])?;
    decode(&payload)
}

/// Slice the MTEF body out of an `Equation Native` payload.
///
/// Layout: `cb_hdr: u16` (must be 28), six ignored bytes (version and
/// clipboard format), `cb_size: u32`, four reserved u32s; the body spans
/// `cb_hdr .. cb_hdr + cb_size`.
fn equation_body(payload: &[u8]) -> Result<&[u8]> {
    if payload.len() < EQN_OLE_HEADER_LEN {
        return Err(Error::BadContainer(format!(
            "payload of {} bytes is shorter than the equation header",
            payload.len()
        )));
    }

    let cb_hdr = u16::from_le_bytes([payload[0], payload[1]]);
    if cb_hdr as usize != EQN_OLE_HEADER_LEN {
        return Err(Error::BadContainer(format!(
            "equation header length {cb_hdr}, expected {EQN_OLE_HEADER_LEN}"
        )));
    }

    let cb_size = u32::from_le_bytes([payload[8], payload[9], payload[10], payload[11]]) as usize;
    let start = cb_hdr as usize;
    let end = start
        .checked_add(cb_size)
        .ok_or_else(|| Error::BadContainer("equation size overflows".to_string()))?;
    if payload.len() < end {
        return Err(Error::BadContainer(format!(
            "payload of {} bytes is shorter than the declared {cb_size}-byte body",
            payload.len()
        )));
    }

    Ok(&payload[start..end])
}

#[cfg(test)]
mod tests {
    use super::records::*;
    use super::*;

    /// Wrap an MTEF body in the 28-byte OLE equation header.
    fn payload(body: &[u8]) -> Vec<u8> {
        let mut data = Vec::with_capacity(EQN_OLE_HEADER_LEN + body.len());
        data.extend_from_slice(&28u16.to_le_bytes());
        data.extend_from_slice(&0x00020000u32.to_le_bytes());
        data.extend_from_slice(&0xC2D3u16.to_le_bytes());
        data.extend_from_slice(&(body.len() as u32).to_le_bytes());
        data.extend_from_slice(&[0u8; 16]);
        data.extend_from_slice(body);
        data
    }

    /// MTEF v5 header (empty application key) followed by record bytes.
    fn mtef_body(records: &[u8]) -> Vec<u8> {
        let mut body = vec![5, 1, 1, 5, 0, 0, 0];
        body.extend_from_slice(records);
        body
    }

    fn convert(records: &[u8]) -> String {
        decode(&payload(&mtef_body(records))).unwrap()
    }

    #[test]
    fn test_empty_body_yields_empty_display_math() {
        assert_eq!(convert(&[]), "$$  $$");
    }

    #[test]
    fn test_plain_character() {
        let latex = convert(&[LINE, 0x00, CHAR, 0x00, 131, 0x78, 0x00, END, END]);
        assert_eq!(latex, "$$ x $$");
    }

    #[test]
    fn test_fraction_one_half() {
        #[rustfmt::skip]
        let records = [
            LINE, 0x00,
            TMPL, 0x00, TM_FRACT, 0x00, 0x00,
            LINE, 0x00, CHAR, 0x00, 136, 0x31, 0x00, END,
            LINE, 0x00, CHAR, 0x00, 136, 0x32, 0x00, END,
            END, END, END,
        ];
        assert_eq!(convert(&records), "$$ \\frac { 1 } { 2 } $$");
    }

    #[test]
    fn test_square_root_of_x() {
        #[rustfmt::skip]
        let records = [
            LINE, 0x00,
            TMPL, 0x00, TM_ROOT, 0x00, 0x00,
            LINE, 0x00, CHAR, 0x00, 131, 0x78, 0x00, END,
            LINE, 0x00, END,
            END, END, END,
        ];
        assert_eq!(convert(&records), "$$ \\sqrt[] { x } $$");
    }

    #[test]
    fn test_hat_over_y() {
        #[rustfmt::skip]
        let records = [
            LINE, 0x00,
            CHAR, 0x00, 131, 0x79, 0x00,
            EMBELL, 0x00, EMB_HAT,
            END, END, END,
        ];
        assert_eq!(convert(&records), "$$  \\hat y $$");
    }

    #[test]
    fn test_hat_reorder_in_assembled_tree() {
        let body = mtef_body(&[
            LINE, 0x00, CHAR, 0x00, 131, 0x79, 0x00, EMBELL, 0x00, EMB_HAT, END, END, END,
        ]);
        let eq = Equation::from_mtef(&body).unwrap();
        let line = &eq.root().children[0];
        assert!(matches!(
            line.children[0].record,
            Some(Record::Embell(Embell { kind: EMB_HAT, .. }))
        ));
        assert!(matches!(line.children[1].record, Some(Record::Char(_))));
    }

    #[test]
    fn test_identity_matrix() {
        // The 0x00 partition bytes after the matrix fields decode as the two
        // End tags that close the decoder's synthetic slot lines.
        #[rustfmt::skip]
        let mut records = vec![
            LINE, 0x00,
            MATRIX, 0x00, 0, 0, 0, 2, 2,
            0x00, 0x00,
        ];
        for code in [0x31, 0x30, 0x30, 0x31] {
            records.extend_from_slice(&[LINE, 0x00, CHAR, 0x00, 136, code, 0x00, END]);
        }
        records.extend_from_slice(&[END, END]);

        let latex = convert(&records);
        assert!(latex.contains("\\begin{array} {}"));
        assert!(latex.contains("\\end{array}"));
        assert_eq!(latex.matches(" & ").count(), 2);
        assert_eq!(latex.matches(" \\\\ ").count(), 2);
    }

    #[test]
    fn test_sum_with_limits() {
        #[rustfmt::skip]
        let records = [
            LINE, 0x00,
            TMPL, 0x00, TM_SUM, 0x00, 0x00,
            // main: i
            LINE, 0x00, CHAR, 0x00, 131, 0x69, 0x00, END,
            // lower: i=1
            LINE, 0x00,
            CHAR, 0x00, 131, 0x69, 0x00,
            CHAR, 0x00, 134, 0x3D, 0x00,
            CHAR, 0x00, 136, 0x31, 0x00,
            END,
            // upper: n
            LINE, 0x00, CHAR, 0x00, 131, 0x6E, 0x00, END,
            // operator: U+2211
            LINE, 0x00, CHAR, 0x00, 134, 0x11, 0x22, END,
            END, END, END,
        ];
        assert_eq!(convert(&records), "$$ \\sum \\limits_{ i=1 } ^ n { i } $$");
    }

    #[test]
    fn test_null_line_at_top_level() {
        let body = mtef_body(&[LINE, 0x01, LINE, 0x00, CHAR, 0x00, 131, 0x61, 0x00, END, END]);
        let eq = Equation::from_mtef(&body).unwrap();
        assert_eq!(eq.root().children.len(), 2);
        assert!(eq.root().children[0].children.is_empty());
    }

    #[test]
    fn test_decode_is_deterministic() {
        let data = payload(&mtef_body(&[LINE, 0x00, CHAR, 0x00, 131, 0x78, 0x00, END, END]));
        assert_eq!(decode(&data).unwrap(), decode(&data).unwrap());
    }

    #[test]
    fn test_header_surfaces_application_key() {
        let mut body = vec![5, 1, 1, 5, 0];
        body.extend_from_slice(b"DSMT5\0");
        body.push(0); // inline
        let eq = Equation::from_mtef(&body).unwrap();
        assert_eq!(eq.header().application, "DSMT5");
    }

    #[test]
    fn test_short_payload_is_bad_container() {
        assert!(matches!(
            decode(&[0u8; 10]),
            Err(Error::BadContainer(_))
        ));
    }

    #[test]
    fn test_wrong_header_length_is_bad_container() {
        let mut data = payload(&mtef_body(&[]));
        data[0] = 0x10;
        assert!(matches!(decode(&data), Err(Error::BadContainer(_))));
    }

    #[test]
    fn test_declared_size_beyond_input_is_bad_container() {
        let mut data = payload(&mtef_body(&[]));
        data[8] = 0xFF; // inflate cb_size
        assert!(matches!(decode(&data), Err(Error::BadContainer(_))));
    }

    #[test]
    fn test_trailing_garbage_after_declared_size_is_ignored() {
        // WMF data commonly follows the MTEF body in real streams.
        let mut data = payload(&mtef_body(&[LINE, 0x00, CHAR, 0x00, 131, 0x78, 0x00, END, END]));
        data.extend_from_slice(&[0xD7, 0xCD, 0xC6, 0x9A]);
        assert_eq!(decode(&data).unwrap(), "$$ x $$");
    }

    #[test]
    fn test_non_v5_stream_is_rejected() {
        let data = payload(&[3, 0, 0, 0, 0, 0, 0]);
        assert!(matches!(decode(&data), Err(Error::UnsupportedVersion(3))));
    }

    #[test]
    fn test_diagnostics_are_surfaced() {
        // A box template (selector 37) has no emission rule.
        #[rustfmt::skip]
        let records = [
            LINE, 0x00,
            TMPL, 0x00, TM_BOX, 0x00, 0x00,
            LINE, 0x00, CHAR, 0x00, 131, 0x61, 0x00, END,
            END, END, END,
        ];
        let eq = Equation::from_mtef(&mtef_body(&records)).unwrap();
        let (latex, diagnostics) = eq.to_latex_with_diagnostics();
        assert_eq!(latex, "$$ a $$");
        assert_eq!(diagnostics.len(), 1);
    }
}

// MTEF v5 record decoder.
//
// Walks the tagged record stream and emits a flat list of `Record` values.
// Every conditional field read here is load-bearing: one misread byte
// desynchronises everything after it. Field order and widths follow the
// MTEF v5 storage layout.

use crate::error::{Error, Result};
use crate::mtef::reader::ByteReader;
use crate::mtef::records::*;

/// MTEF stream header. Only version 5 is interpreted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MtefHeader {
    pub mtef_version: u8,
    pub platform: u8,
    pub product: u8,
    pub version: u8,
    pub version_sub: u8,
    pub application: String,
    pub inline: u8,
}

/// Decoder over a bare MTEF body (no OLE equation header).
#[derive(Debug)]
pub struct MtefDecoder<'a> {
    reader: ByteReader<'a>,
    header: MtefHeader,
}

impl<'a> MtefDecoder<'a> {
    /// Parse the MTEF header and position the cursor on the first record.
    pub fn new(body: &'a [u8]) -> Result<Self> {
        let mut reader = ByteReader::new(body);

        let mtef_version = reader.read_u8()?;
        if mtef_version != 5 {
            return Err(Error::UnsupportedVersion(mtef_version));
        }

        let header = MtefHeader {
            mtef_version,
            platform: reader.read_u8()?,
            product: reader.read_u8()?,
            version: reader.read_u8()?,
            version_sub: reader.read_u8()?,
            application: reader.read_cstr()?,
            inline: reader.read_u8()?,
        };

        Ok(Self { reader, header })
    }

    pub fn header(&self) -> &MtefHeader {
        &self.header
    }

    /// Decode the record stream until end-of-input.
    ///
    /// EOF on the tag read is the normal termination signal; EOF inside a
    /// record's fields is a `TruncatedStream` error.
    pub fn decode_records(&mut self) -> Result<Vec<Record>> {
        let mut records = Vec::new();

        loop {
            let tag = match self.reader.read_u8() {
                Ok(tag) => tag,
                Err(_) => break,
            };

            // Future records carry their own length so readers can skip them.
            if tag >= FUTURE {
                let len = self.reader.read_u8()? as usize;
                self.reader.skip(len)?;
                continue;
            }

            match tag {
                END => records.push(Record::End),
                LINE => records.push(Record::Line(self.read_line()?)),
                CHAR => records.push(Record::Char(self.read_char()?)),
                TMPL => records.push(Record::Tmpl(self.read_tmpl()?)),
                PILE => records.push(Record::Pile(self.read_pile()?)),
                MATRIX => {
                    records.push(Record::Matrix(self.read_matrix()?));
                    // The matrix row/column partition bytes are not consumed
                    // above; they read back as two End tags. These two slot
                    // openers keep the stream balanced.
                    records.push(Record::empty_line());
                    records.push(Record::empty_line());
                }
                EMBELL => records.push(Record::Embell(self.read_embell()?)),
                FONT_STYLE_DEF => {
                    let _index = self.reader.read_u8()?;
                    let _name = self.reader.read_cstr()?;
                }
                FULL => records.push(Record::Full),
                SUB => records.push(Record::Sub),
                SUB2 => records.push(Record::Sub2),
                SYM => records.push(Record::Sym),
                SUBSYM => records.push(Record::SubSym),
                COLOR => {
                    let _index = self.reader.read_u8()?;
                }
                COLOR_DEF => self.read_color_def()?,
                FONT_DEF => {
                    records.push(Record::FontDef(FontDef {
                        enc_index: self.reader.read_u8()?,
                        name: self.reader.read_cstr()?,
                    }));
                }
                EQN_PREFS => records.push(Record::EqnPrefs(self.read_eqn_prefs()?)),
                ENCODING_DEF => records.push(Record::EncodingDef(self.reader.read_cstr()?)),
                _ => {
                    // Reserved tags without a defined body (RULER at top
                    // level, SIZE): consume the tag only.
                    log::warn!("unhandled MTEF record tag {tag}, skipping");
                }
            }
        }

        Ok(records)
    }

    /// Nudge pair: two bytes, escaping to two i16 values when either byte
    /// is 128.
    fn read_nudge(&mut self) -> Result<Nudge> {
        let b1 = self.reader.read_u8()?;
        let b2 = self.reader.read_u8()?;

        if b1 == 128 || b2 == 128 {
            Ok(Nudge {
                x: self.reader.read_i16()?,
                y: self.reader.read_i16()?,
            })
        } else {
            Ok(Nudge {
                x: i16::from(b1),
                y: i16::from(b2),
            })
        }
    }

    fn read_line(&mut self) -> Result<Line> {
        let options = self.reader.read_u8()?;
        let mut line = Line::default();

        if options & OPT_NUDGE != 0 {
            line.nudge = Some(self.read_nudge()?);
        }
        if options & OPT_LINE_LSPACE != 0 {
            line.line_space = Some(self.reader.read_u8()?);
        }
        if options & OPT_LINE_RULER != 0 {
            // Tab stops are read for alignment only.
            let n_stops = self.reader.read_u8()?;
            for _ in 0..n_stops {
                let _stop_type = self.reader.read_u8()?;
                let _tab_offset = self.reader.read_u16()?;
            }
        }
        line.null = options & OPT_LINE_NULL != 0;

        Ok(line)
    }

    fn read_char(&mut self) -> Result<Char> {
        let options = self.reader.read_u8()?;
        let mut ch = Char::default();

        if options & OPT_NUDGE != 0 {
            ch.nudge = Some(self.read_nudge()?);
        }
        ch.typeface = self.reader.read_u8()?;

        if options & OPT_CHAR_ENC_NO_MTCODE == 0 {
            ch.mtcode = Some(self.reader.read_u16()?);
        }
        if options & OPT_CHAR_ENC_CHAR_8 != 0 {
            ch.font_pos8 = Some(self.reader.read_u8()?);
        }
        if options & OPT_CHAR_ENC_CHAR_16 != 0 {
            ch.font_pos16 = Some(self.reader.read_u16()?);
        }

        Ok(ch)
    }

    fn read_tmpl(&mut self) -> Result<Tmpl> {
        let options = self.reader.read_u8()?;
        let mut tmpl = Tmpl::default();

        if options & OPT_NUDGE != 0 {
            tmpl.nudge = Some(self.read_nudge()?);
        }
        tmpl.selector = self.reader.read_u8()?;

        // Variation is one byte, or two when the continuation bit is set.
        let b1 = self.reader.read_u8()?;
        tmpl.variation = if b1 & 0x80 != 0 {
            let b2 = self.reader.read_u8()?;
            u16::from(b1 & 0x7F) | (u16::from(b2) << 8)
        } else {
            u16::from(b1)
        };

        tmpl.options = self.reader.read_u8()?;
        Ok(tmpl)
    }

    fn read_pile(&mut self) -> Result<Pile> {
        let options = self.reader.read_u8()?;
        let mut pile = Pile::default();

        if options & OPT_NUDGE != 0 {
            pile.nudge = Some(self.read_nudge()?);
        }
        pile.halign = self.reader.read_u8()?;
        pile.valign = self.reader.read_u8()?;

        Ok(pile)
    }

    fn read_matrix(&mut self) -> Result<Matrix> {
        let options = self.reader.read_u8()?;
        let mut matrix = Matrix::default();

        if options & OPT_NUDGE != 0 {
            matrix.nudge = Some(self.read_nudge()?);
        }
        matrix.valign = self.reader.read_u8()?;
        matrix.h_just = self.reader.read_u8()?;
        matrix.v_just = self.reader.read_u8()?;
        matrix.rows = self.reader.read_u8()?;
        matrix.cols = self.reader.read_u8()?;

        Ok(matrix)
    }

    fn read_embell(&mut self) -> Result<Embell> {
        let options = self.reader.read_u8()?;
        let mut embell = Embell::default();

        if options & OPT_NUDGE != 0 {
            embell.nudge = Some(self.read_nudge()?);
        }
        embell.kind = self.reader.read_u8()?;

        Ok(embell)
    }

    /// Colour definition: read fully for stream alignment, never emitted.
    fn read_color_def(&mut self) -> Result<()> {
        let options = self.reader.read_u8()?;

        let components = if options & OPT_COLOR_CMYK != 0 { 4 } else { 3 };
        for _ in 0..components {
            // Components are stored as 16-bit values.
            let _value = self.reader.read_u16()?;
        }

        if options & OPT_COLOR_NAME != 0 {
            let _name = self.reader.read_cstr()?;
        }

        Ok(())
    }

    fn read_eqn_prefs(&mut self) -> Result<EqnPrefs> {
        let _options = self.reader.read_u8()?;
        let mut prefs = EqnPrefs::default();

        let size_count = self.reader.read_u8()? as usize;
        prefs.sizes = self.read_dimension_array(size_count)?;

        let space_count = self.reader.read_u8()? as usize;
        prefs.spaces = self.read_dimension_array(space_count)?;

        let style_count = self.reader.read_u8()? as usize;
        prefs.styles = Vec::with_capacity(style_count);
        for _ in 0..style_count {
            let marker = self.reader.read_u8()?;
            if marker != 0 {
                prefs.styles.push(self.reader.read_u8()?);
            } else {
                prefs.styles.push(0);
            }
        }

        Ok(prefs)
    }

    /// Dimension arrays are packed 4-bit nibbles, high nibble first. Each
    /// entry is a unit nibble (0=in 1=cm 2=pt 3=pc 4=%) followed by decimal
    /// digits (0x0A is '.', 0x0B is '-') and terminated by 0x0F, yielding
    /// strings like "12.5pt".
    fn read_dimension_array(&mut self, count: usize) -> Result<Vec<String>> {
        let mut entries = Vec::with_capacity(count);
        let mut unit = "";
        let mut value = String::new();
        let mut expect_unit = true;

        while entries.len() < count {
            let byte = self.reader.read_u8()?;
            for nibble in [byte >> 4, byte & 0x0F] {
                if expect_unit {
                    match nibble {
                        0x00 => unit = "in",
                        0x01 => unit = "cm",
                        0x02 => unit = "pt",
                        0x03 => unit = "pc",
                        0x04 => unit = "%",
                        _ => {
                            log::warn!("invalid dimension unit nibble {nibble:#x}");
                            continue;
                        }
                    }
                    expect_unit = false;
                } else {
                    match nibble {
                        0x00..=0x09 => value.push((b'0' + nibble) as char),
                        0x0A => value.push('.'),
                        0x0B => value.push('-'),
                        0x0F => {
                            entries.push(format!("{value}{unit}"));
                            value.clear();
                            unit = "";
                            expect_unit = true;
                        }
                        _ => log::warn!("invalid dimension digit nibble {nibble:#x}"),
                    }
                }
            }
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal MTEF v5 header: version, platform, product, version,
    /// version_sub, empty application key, inline flag.
    fn header() -> Vec<u8> {
        vec![5, 1, 1, 5, 0, 0, 0]
    }

    fn body(records: &[u8]) -> Vec<u8> {
        let mut data = header();
        data.extend_from_slice(records);
        data
    }

    fn decode(records: &[u8]) -> Vec<Record> {
        let data = body(records);
        let mut decoder = MtefDecoder::new(&data).unwrap();
        decoder.decode_records().unwrap()
    }

    #[test]
    fn test_header_fields() {
        let data = vec![5, 1, 2, 5, 1, b'W', b'o', b'r', b'd', 0, 1];
        let decoder = MtefDecoder::new(&data).unwrap();
        let hdr = decoder.header();
        assert_eq!(hdr.mtef_version, 5);
        assert_eq!(hdr.platform, 1);
        assert_eq!(hdr.product, 2);
        assert_eq!(hdr.application, "Word");
        assert_eq!(hdr.inline, 1);
    }

    #[test]
    fn test_wrong_version_is_rejected() {
        let data = vec![3, 1, 1, 0, 0, 0, 0];
        match MtefDecoder::new(&data) {
            Err(Error::UnsupportedVersion(3)) => {}
            other => panic!("expected UnsupportedVersion, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_body_terminates_cleanly() {
        assert!(decode(&[]).is_empty());
    }

    #[test]
    fn test_simple_char_line() {
        // LINE(options=0), CHAR(options=0, typeface=131, mtcode='x'), END, END
        let records = decode(&[LINE, 0x00, CHAR, 0x00, 131, 0x78, 0x00, END, END]);
        assert_eq!(records.len(), 4);
        match &records[0] {
            Record::Line(line) => assert!(!line.null),
            other => panic!("expected Line, got {other:?}"),
        }
        match &records[1] {
            Record::Char(ch) => {
                assert_eq!(ch.typeface, 131);
                assert_eq!(ch.mtcode, Some(0x0078));
            }
            other => panic!("expected Char, got {other:?}"),
        }
        assert_eq!(records[2], Record::End);
        assert_eq!(records[3], Record::End);
    }

    #[test]
    fn test_null_line_flag() {
        let records = decode(&[LINE, 0x01]);
        match &records[0] {
            Record::Line(line) => assert!(line.null),
            other => panic!("expected Line, got {other:?}"),
        }
    }

    #[test]
    fn test_line_with_spacing_and_ruler() {
        // options = lspace | ruler: one byte of spacing, then one tab stop
        let records = decode(&[LINE, OPT_LINE_LSPACE | OPT_LINE_RULER, 42, 1, 2, 0x10, 0x00]);
        match &records[0] {
            Record::Line(line) => {
                assert_eq!(line.line_space, Some(42));
                assert!(!line.null);
            }
            other => panic!("expected Line, got {other:?}"),
        }
    }

    #[test]
    fn test_simple_nudge() {
        let records = decode(&[CHAR, OPT_NUDGE, 3, 7, 131, 0x79, 0x00]);
        match &records[0] {
            Record::Char(ch) => {
                assert_eq!(ch.nudge, Some(Nudge { x: 3, y: 7 }));
                assert_eq!(ch.mtcode, Some(0x0079));
            }
            other => panic!("expected Char, got {other:?}"),
        }
    }

    #[test]
    fn test_extended_nudge() {
        // Either byte equal to 128 switches to the wide encoding.
        let records = decode(&[CHAR, OPT_NUDGE, 128, 0, 0x2C, 0x01, 0xFE, 0xFF, 131, 0x79, 0x00]);
        match &records[0] {
            Record::Char(ch) => assert_eq!(ch.nudge, Some(Nudge { x: 300, y: -2 })),
            other => panic!("expected Char, got {other:?}"),
        }
    }

    #[test]
    fn test_char_encoding_options() {
        // No MTCode, 8-bit font position only.
        let records = decode(&[CHAR, OPT_CHAR_ENC_NO_MTCODE | OPT_CHAR_ENC_CHAR_8, 129, 65]);
        match &records[0] {
            Record::Char(ch) => {
                assert_eq!(ch.mtcode, None);
                assert_eq!(ch.font_pos8, Some(65));
                assert_eq!(ch.font_pos16, None);
            }
            other => panic!("expected Char, got {other:?}"),
        }

        // MTCode plus a 16-bit font position.
        let records = decode(&[CHAR, OPT_CHAR_ENC_CHAR_16, 134, 0x11, 0x22, 0x33, 0x44]);
        match &records[0] {
            Record::Char(ch) => {
                assert_eq!(ch.mtcode, Some(0x2211));
                assert_eq!(ch.font_pos16, Some(0x4433));
            }
            other => panic!("expected Char, got {other:?}"),
        }
    }

    #[test]
    fn test_tmpl_short_variation() {
        let records = decode(&[TMPL, 0x00, TM_FRACT, 0x00, 0x00]);
        match &records[0] {
            Record::Tmpl(tmpl) => {
                assert_eq!(tmpl.selector, TM_FRACT);
                assert_eq!(tmpl.variation, 0);
            }
            other => panic!("expected Tmpl, got {other:?}"),
        }
    }

    #[test]
    fn test_tmpl_two_byte_variation() {
        // 0x81, 0x02 -> (0x81 & 0x7F) | (0x02 << 8) = 0x0201
        let records = decode(&[TMPL, 0x00, TM_INTEG, 0x81, 0x02, 0x00]);
        match &records[0] {
            Record::Tmpl(tmpl) => assert_eq!(tmpl.variation, 0x0201),
            other => panic!("expected Tmpl, got {other:?}"),
        }
    }

    #[test]
    fn test_matrix_padding_contract() {
        // valign, h_just, v_just, rows, cols
        let records = decode(&[MATRIX, 0x00, 0, 1, 1, 2, 2]);
        assert_eq!(records.len(), 3);
        match &records[0] {
            Record::Matrix(m) => {
                assert_eq!(m.rows, 2);
                assert_eq!(m.cols, 2);
            }
            other => panic!("expected Matrix, got {other:?}"),
        }
        assert_eq!(records[1], Record::empty_line());
        assert_eq!(records[2], Record::empty_line());
    }

    #[test]
    fn test_future_record_skipped() {
        let records = decode(&[120, 3, 0xAA, 0xBB, 0xCC, END]);
        assert_eq!(records, vec![Record::End]);
    }

    #[test]
    fn test_future_record_zero_length() {
        let records = decode(&[100, 0, END]);
        assert_eq!(records, vec![Record::End]);
    }

    #[test]
    fn test_defs_consumed_but_not_emitted() {
        // FONT_STYLE_DEF(index, name), COLOR(index), COLOR_DEF(rgb), END
        let mut bytes = vec![FONT_STYLE_DEF, 1, b'b', b'o', b'l', b'd', 0];
        bytes.extend_from_slice(&[COLOR, 2]);
        bytes.extend_from_slice(&[COLOR_DEF, 0x00, 0, 0, 0, 0, 0, 0]);
        bytes.push(END);
        assert_eq!(decode(&bytes), vec![Record::End]);
    }

    #[test]
    fn test_color_def_cmyk_with_name() {
        let mut bytes = vec![COLOR_DEF, OPT_COLOR_CMYK | OPT_COLOR_NAME];
        bytes.extend_from_slice(&[1, 0, 2, 0, 3, 0, 4, 0]);
        bytes.extend_from_slice(b"cyanish\0");
        bytes.push(END);
        assert_eq!(decode(&bytes), vec![Record::End]);
    }

    #[test]
    fn test_font_def_emitted() {
        let records = decode(&[FONT_DEF, 2, b'E', b'u', b'c', b'l', b'i', b'd', 0]);
        assert_eq!(
            records,
            vec![Record::FontDef(FontDef {
                enc_index: 2,
                name: "Euclid".into(),
            })]
        );
    }

    #[test]
    fn test_singletons_emitted() {
        let records = decode(&[FULL, SUB, SUB2, SYM, SUBSYM]);
        assert_eq!(
            records,
            vec![
                Record::Full,
                Record::Sub,
                Record::Sub2,
                Record::Sym,
                Record::SubSym,
            ]
        );
    }

    #[test]
    fn test_reserved_size_tag_consumes_tag_only() {
        let records = decode(&[SIZE, END]);
        assert_eq!(records, vec![Record::End]);
    }

    #[test]
    fn test_truncated_record_is_an_error() {
        // CHAR promises an mtcode but the stream ends after one byte.
        let data = body(&[CHAR, 0x00, 131, 0x78]);
        let mut decoder = MtefDecoder::new(&data).unwrap();
        assert!(matches!(
            decoder.decode_records(),
            Err(Error::TruncatedStream(_))
        ));
    }

    #[test]
    fn test_decode_is_deterministic() {
        let bytes = [LINE, 0x00, CHAR, 0x00, 131, 0x78, 0x00, END, END];
        assert_eq!(decode(&bytes), decode(&bytes));
    }

    // Dimension arrays: "12.5pt" is unit 0x2 then nibbles 1 2 . 5 terminator.
    #[test]
    fn test_eqn_prefs_dimension_arrays() {
        let mut bytes = vec![EQN_PREFS, 0x00];
        // sizes: one entry, "12.5pt"
        bytes.push(1);
        bytes.extend_from_slice(&[0x21, 0x2A, 0x5F]);
        // spaces: two entries, "100%" and "-3in"
        bytes.push(2);
        bytes.extend_from_slice(&[0x41, 0x00, 0xF0, 0xB3, 0xF0]);
        // styles: three entries, the middle one with a payload byte
        bytes.push(3);
        bytes.extend_from_slice(&[0, 2, 7, 0]);

        let records = decode(&bytes);
        match &records[0] {
            Record::EqnPrefs(prefs) => {
                assert_eq!(prefs.sizes, vec!["12.5pt".to_string()]);
                assert_eq!(prefs.spaces, vec!["100%".to_string(), "-3in".to_string()]);
                assert_eq!(prefs.styles, vec![0, 7, 0]);
            }
            other => panic!("expected EqnPrefs, got {other:?}"),
        }
    }

    #[test]
    fn test_dimension_array_entry_count() {
        // Exactly k terminators yield exactly k entries.
        let mut bytes = vec![EQN_PREFS, 0x00];
        bytes.push(3);
        // "1in", "2cm", "3pc" packed: 0,1,F | 1,2,F | 3,3,F
        bytes.extend_from_slice(&[0x01, 0xF1, 0x2F, 0x33, 0xF0]);
        bytes.push(0); // spaces
        bytes.push(0); // styles
        let records = decode(&bytes);
        match &records[0] {
            Record::EqnPrefs(prefs) => {
                assert_eq!(prefs.sizes.len(), 3);
                assert_eq!(prefs.sizes, vec!["1in", "2cm", "3pc"]);
            }
            other => panic!("expected EqnPrefs, got {other:?}"),
        }
    }
}

//! PDF export.
//!
//! Writes a small PDF 1.4 document using the standard Type1 Times fonts, so
//! no font files are embedded. Layout is A4 portrait in millimetres: 10mm
//! side and top margins, a page break 15mm above the bottom edge, the title
//! in 14pt bold centred on 10mm lines, the body in 12pt on 6mm lines.
//!
//! Standard fonts only cover Latin-1; every other character becomes `?`.

/// Points per millimetre.
const K: f32 = 72.0 / 25.4;

const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN: f32 = 10.0;
const BOTTOM_MARGIN: f32 = 15.0;
/// Horizontal padding inside a cell.
const CELL_MARGIN: f32 = 1.0;

const TITLE_SIZE: f32 = 14.0;
const TITLE_LINE_H: f32 = 10.0;
const TITLE_GAP: f32 = 5.0;
const BODY_SIZE: f32 = 12.0;
const BODY_LINE_H: f32 = 6.0;

/// Times-Roman advance widths for ASCII 32..=126, in 1/1000 em.
const TIMES_WIDTHS: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278, // ' '..'/'
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, // '0'..'9'
    278, 278, 564, 564, 564, 444, 921, // ':'..'@'
    722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722, 556, 722,
    667, 556, 611, 722, 722, 944, 722, 722, 611, // 'A'..'Z'
    333, 278, 333, 469, 500, 333, // '['..'`'
    444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500, 500, 500,
    333, 389, 278, 500, 500, 722, 500, 500, 444, // 'a'..'z'
    480, 200, 480, 541, // '{'..'~'
];

/// Times-Bold advance widths for ASCII 32..=126, in 1/1000 em.
const TIMES_BOLD_WIDTHS: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278, // ' '..'/'
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, // '0'..'9'
    333, 333, 570, 570, 570, 500, 930, // ':'..'@'
    722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, 722, 778, 611, 778,
    722, 556, 667, 722, 722, 1000, 722, 722, 667, // 'A'..'Z'
    333, 278, 333, 581, 500, 333, // '['..'`'
    500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, 556, 500, 556, 556,
    444, 389, 333, 556, 500, 722, 500, 500, 444, // 'a'..'z'
    394, 220, 394, 520, // '{'..'~'
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Font {
    Bold,
    Regular,
}

impl Font {
    /// Advance width of one Latin-1 byte, in 1/1000 em.
    fn char_width(self, b: u8) -> u16 {
        let (ascii, upper) = match self {
            Font::Bold => (&TIMES_BOLD_WIDTHS, 556),
            Font::Regular => (&TIMES_WIDTHS, 500),
        };
        match b {
            32..=126 => ascii[usize::from(b - 32)],
            160..=255 => upper,
            _ => 0,
        }
    }

    fn resource(self) -> &'static str {
        match self {
            Font::Bold => "/F1",
            Font::Regular => "/F2",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Center,
}

/// Render a story as PDF bytes.
pub fn export_pdf(title: &str, body: &str) -> Vec<u8> {
    let mut layout = Layout::new();

    layout.multi_cell(&to_latin1(title), Font::Bold, TITLE_SIZE, TITLE_LINE_H, Align::Center);
    layout.y += TITLE_GAP;

    for line in body.split('\n') {
        let line = line.trim_end_matches('\r');
        layout.multi_cell(&to_latin1(line), Font::Regular, BODY_SIZE, BODY_LINE_H, Align::Left);
    }

    assemble(&layout.finish())
}

/// Replace every character outside printable Latin-1 with `?`.
///
/// C0 and C1 controls are replaced too: WinAnsiEncoding maps 0x80..=0x9F to
/// unrelated glyphs.
pub fn to_latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match u32::from(c) {
            0x09 => b' ',
            n if n < 0x20 || (0x7F..=0x9F).contains(&n) => b'?',
            n if n <= 0xFF => n as u8,
            _ => b'?',
        })
        .collect()
}

/// Width of a Latin-1 string in millimetres at `size` points.
fn text_width(text: &[u8], font: Font, size: f32) -> f32 {
    let units: u32 = text.iter().map(|b| u32::from(font.char_width(*b))).sum();
    units as f32 * size / 1000.0 / K
}

/// Greedy word wrap to `max_w` millimetres.
fn wrap(text: &[u8], font: Font, size: f32, max_w: f32) -> Vec<Vec<u8>> {
    let mut lines = Vec::new();
    let mut current: Vec<u8> = Vec::new();

    for word in text.split(|b| *b == b' ').filter(|w| !w.is_empty()) {
        let mut candidate = current.clone();
        if !candidate.is_empty() {
            candidate.push(b' ');
        }
        candidate.extend_from_slice(word);

        if text_width(&candidate, font, size) <= max_w {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }

        if text_width(word, font, size) <= max_w {
            current.extend_from_slice(word);
        } else {
            for &b in word {
                current.push(b);
                if text_width(&current, font, size) > max_w && current.len() > 1 {
                    let overflow = current.pop().unwrap_or(b);
                    lines.push(std::mem::take(&mut current));
                    current.push(overflow);
                }
            }
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

struct Layout {
    pages: Vec<Vec<u8>>,
    current: Vec<u8>,
    /// Distance of the cursor from the top edge, in mm.
    y: f32,
}

impl Layout {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Vec::new(),
            y: MARGIN,
        }
    }

    fn new_page(&mut self) {
        let finished = std::mem::take(&mut self.current);
        self.pages.push(finished);
        self.y = MARGIN;
    }

    fn multi_cell(&mut self, text: &[u8], font: Font, size: f32, line_h: f32, align: Align) {
        let cell_w = PAGE_W - 2.0 * MARGIN;
        let max_w = cell_w - 2.0 * CELL_MARGIN;

        for line in wrap(text, font, size, max_w) {
            if self.y + line_h > PAGE_H - BOTTOM_MARGIN {
                self.new_page();
            }

            if !line.is_empty() {
                let x = match align {
                    Align::Left => MARGIN + CELL_MARGIN,
                    Align::Center => MARGIN + (cell_w - text_width(&line, font, size)) / 2.0,
                };
                let baseline = self.y + 0.5 * line_h + 0.3 * size / K;
                self.text(x, baseline, font, size, &line);
            }

            self.y += line_h;
        }
    }

    fn text(&mut self, x: f32, baseline: f32, font: Font, size: f32, text: &[u8]) {
        let header = format!(
            "BT {} {:.2} Tf {:.2} {:.2} Td (",
            font.resource(),
            size,
            x * K,
            (PAGE_H - baseline) * K
        );
        self.current.extend_from_slice(header.as_bytes());
        for &b in text {
            if matches!(b, b'\\' | b'(' | b')') {
                self.current.push(b'\\');
            }
            self.current.push(b);
        }
        self.current.extend_from_slice(b") Tj ET\n");
    }

    fn finish(mut self) -> Vec<Vec<u8>> {
        self.new_page();
        self.pages
    }
}

/// Serialize page content streams into a complete PDF file.
fn assemble(pages: &[Vec<u8>]) -> Vec<u8> {
    let mut out: Vec<u8> = Vec::new();
    let mut offsets: Vec<usize> = Vec::new();

    out.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");

    let page_ids: Vec<usize> = (0..pages.len()).map(|i| 5 + 2 * i).collect();
    let kids = page_ids
        .iter()
        .map(|id| format!("{id} 0 R"))
        .collect::<Vec<_>>()
        .join(" ");

    let mut objects: Vec<Vec<u8>> = vec![
        b"<< /Type /Catalog /Pages 2 0 R >>".to_vec(),
        format!("<< /Type /Pages /Kids [{kids}] /Count {} >>", pages.len()).into_bytes(),
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Times-Bold /Encoding /WinAnsiEncoding >>"
            .to_vec(),
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Times-Roman /Encoding /WinAnsiEncoding >>"
            .to_vec(),
    ];

    for (i, content) in pages.iter().enumerate() {
        let content_id = page_ids[i] + 1;
        objects.push(
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {content_id} 0 R >>",
                PAGE_W * K,
                PAGE_H * K
            )
            .into_bytes(),
        );

        let mut stream = format!("<< /Length {} >>\nstream\n", content.len()).into_bytes();
        stream.extend_from_slice(content);
        stream.extend_from_slice(b"\nendstream");
        objects.push(stream);
    }

    for (i, object) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n", i + 1).as_bytes());
        out.extend_from_slice(object);
        out.extend_from_slice(b"\nendobj\n");
    }

    let xref_offset = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for offset in &offsets {
        out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
            objects.len() + 1
        )
        .as_bytes(),
    );

    out
}

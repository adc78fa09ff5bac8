//! PDF rendering with `printpdf` builtin fonts.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};

use crate::StatementError;
use crate::layout::{
    Line, LineStyle, MARGIN_MM, PAGE_HEIGHT_MM, PAGE_WIDTH_MM, StatementLayout, USABLE_HEIGHT_MM,
    paginate,
};

const LAYER: &str = "statement";

// Average Helvetica glyph width as a fraction of the font size.
const AVG_GLYPH_WIDTH_EM: f32 = 0.5;
const PT_TO_MM: f32 = 0.3528;

pub fn to_pdf(layout: &StatementLayout) -> Result<Vec<u8>, StatementError> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        layout.title.as_str(),
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        LAYER,
    );
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(render_error)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(render_error)?;

    for (index, page_lines) in paginate(&layout.lines, USABLE_HEIGHT_MM)
        .into_iter()
        .enumerate()
    {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER);
            doc.get_page(page).get_layer(layer)
        };
        draw_page(&layer, page_lines, &regular, &bold);
    }

    doc.save_to_bytes().map_err(render_error)
}

fn draw_page(
    layer: &PdfLayerReference,
    lines: &[Line],
    regular: &IndirectFontRef,
    bold: &IndirectFontRef,
) {
    let mut y = PAGE_HEIGHT_MM - MARGIN_MM;

    for line in lines {
        let size = line.style.font_size_pt();
        y -= line.style.height_mm();

        match line.style {
            LineStyle::Blank => {}
            LineStyle::Title => {
                let x = centered_x(&line.text, size);
                layer.use_text(line.text.as_str(), size, Mm(x), Mm(y), bold);
            }
            LineStyle::Heading => {
                layer.use_text(line.text.as_str(), size, Mm(MARGIN_MM), Mm(y), bold);
            }
            LineStyle::Body => {
                layer.use_text(line.text.as_str(), size, Mm(MARGIN_MM), Mm(y), regular);
            }
        }
    }
}

fn centered_x(text: &str, size_pt: f32) -> f32 {
    let width = text.chars().count() as f32 * size_pt * AVG_GLYPH_WIDTH_EM * PT_TO_MM;
    ((PAGE_WIDTH_MM - width) / 2.0).max(MARGIN_MM)
}

fn render_error(err: impl std::fmt::Display) -> StatementError {
    StatementError::Render(err.to_string())
}

//! Statement layout.
//!
//! A statement is a flat list of styled lines. Geometry is expressed in
//! millimetres on an A4 page so pagination can be tested without producing a
//! PDF.

use rogerbank_core::format_money;

use crate::{Locale, StatementData};

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
pub const MARGIN_MM: f32 = 20.0;

/// Vertical space available for lines on one page.
pub const USABLE_HEIGHT_MM: f32 = PAGE_HEIGHT_MM - 2.0 * MARGIN_MM;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Title,
    Heading,
    Body,
    Blank,
}

impl LineStyle {
    pub fn font_size_pt(&self) -> f32 {
        match self {
            LineStyle::Title => 18.0,
            LineStyle::Heading => 14.0,
            LineStyle::Body | LineStyle::Blank => 12.0,
        }
    }

    /// Vertical advance after the line.
    pub fn height_mm(&self) -> f32 {
        match self {
            LineStyle::Title => 10.0,
            LineStyle::Heading => 8.0,
            LineStyle::Body => 6.0,
            LineStyle::Blank => 4.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub text: String,
    pub style: LineStyle,
}

impl Line {
    fn new(style: LineStyle, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    fn blank() -> Self {
        Self::new(LineStyle::Blank, "")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementLayout {
    pub title: String,
    pub lines: Vec<Line>,
}

impl StatementLayout {
    pub fn build(data: &StatementData, locale: Locale) -> Self {
        let mut lines = vec![
            Line::new(LineStyle::Title, locale.title()),
            Line::blank(),
            Line::new(
                LineStyle::Body,
                format!("{}: {}", locale.user_label(), data.name),
            ),
            Line::new(LineStyle::Body, format!("Email: {}", data.email)),
            Line::new(
                LineStyle::Body,
                format!(
                    "{}: R$ {}",
                    locale.balance_label(),
                    format_money(data.balance)
                ),
            ),
            Line::blank(),
            Line::new(LineStyle::Heading, locale.history_label()),
        ];

        lines.extend(data.transactions.iter().enumerate().map(|(i, t)| {
            Line::new(
                LineStyle::Body,
                format!(
                    "{}. {}: R$ {} - {}: {}",
                    i + 1,
                    locale.kind_label(t.kind),
                    t.amount,
                    locale.date_label(),
                    locale.format_timestamp(t.occurred_at)
                ),
            )
        }));

        Self {
            title: locale.title().to_string(),
            lines,
        }
    }
}

/// Split `lines` into pages of at most `page_height_mm` each.
///
/// A line taller than a whole page still gets a page of its own. Returns no
/// pages for no lines.
pub fn paginate(lines: &[Line], page_height_mm: f32) -> Vec<&[Line]> {
    let mut pages = Vec::new();
    let mut start = 0;
    let mut used = 0.0_f32;

    for (i, line) in lines.iter().enumerate() {
        let height = line.style.height_mm();
        if i > start && used + height > page_height_mm {
            pages.push(&lines[start..i]);
            start = i;
            used = 0.0;
        }
        used += height;
    }

    if start < lines.len() {
        pages.push(&lines[start..]);
    }
    pages
}

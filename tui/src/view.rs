//! Studio View
//!
//! Renders a [`DisplayState`] into a buffer:
//!
//! ```text
//! ┌ header: ATELIER · <theme name> ─────────────────────┐
//! │ texture: a.png (image/png, 1.2 MB)                  │
//! │ silhouette: ...                                     │
//! │ color: ...                                          │
//! ├─────────────────────────────────────────────────────┤
//! │ concept card (scrollable)                           │
//! ├─────────────────────────────────────────────────────┤
//! │ status line · key hints                             │
//! └─────────────────────────────────────────────────────┘
//! ```

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::widgets::StatefulWidget;
use unicode_width::UnicodeWidthStr;

use crate::display::DisplayState;
use crate::theme::{ERROR_RED, SUCCESS_GREEN};
use crate::widgets::{card_lines, TextBlock, TextBlockState};

/// Key hints shown in the status bar
pub const KEY_HINTS: &str = " r run · ↑↓ scroll · q quit ";

/// Render the whole studio
pub fn render(
    display: &DisplayState,
    notice: Option<&str>,
    card: &mut TextBlockState,
    area: Rect,
    buf: &mut Buffer,
) {
    let palette = &display.palette;
    buf.set_style(area, palette.base());
    if area.width < 20 || area.height < 8 {
        buf.set_stringn(
            area.x,
            area.y,
            "Terminal too small",
            area.width as usize,
            palette.dim(),
        );
        return;
    }

    let [header, uploads, rule, body, status] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(area);

    let title = format!(" ATELIER · {} ", display.theme.name);
    buf.set_stringn(header.x, header.y, &title, header.width as usize, palette.heading());

    for (y, upload) in (uploads.y..uploads.bottom()).zip(display.uploads.iter()) {
        let style = if upload.is_filled() {
            palette.base().fg(SUCCESS_GREEN)
        } else {
            palette.dim()
        };
        buf.set_stringn(
            uploads.x + 1,
            y,
            upload.summary(),
            uploads.width.saturating_sub(1) as usize,
            style,
        );
    }

    let separator = "─".repeat(rule.width as usize);
    buf.set_stringn(rule.x, rule.y, &separator, rule.width as usize, palette.dim());

    let lines = card_lines(display);
    let inner = Rect {
        x: body.x + 1,
        width: body.width.saturating_sub(2),
        ..body
    };
    TextBlock::new(&lines)
        .style(palette.base())
        .render(inner, buf, card);

    render_status(display, notice, status, buf);
}

fn render_status(display: &DisplayState, notice: Option<&str>, area: Rect, buf: &mut Buffer) {
    let palette = &display.palette;
    let hints_width = KEY_HINTS.width() as u16;
    let text_width = area.width.saturating_sub(hints_width + 1) as usize;

    let (text, style) = match notice {
        Some(notice) => (format!(" {notice}"), palette.base().fg(ERROR_RED)),
        None => (format!(" {}", display.status_line()), palette.label()),
    };
    buf.set_stringn(area.x, area.y, text, text_width, style);

    if area.width > hints_width {
        buf.set_string(area.right() - hints_width, area.y, KEY_HINTS, palette.button());
    }
}

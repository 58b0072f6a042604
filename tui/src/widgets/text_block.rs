//! TextBlock Widget
//!
//! A borderless, scrollable region of styled lines.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::StatefulWidget;
use textwrap::wrap;

/// One logical line and its style
pub type StyledLine = (String, Style);

/// State for a scrollable text block
#[derive(Debug, Default)]
pub struct TextBlockState {
    /// Scroll offset (lines from top)
    pub scroll_offset: usize,
    /// Total wrapped lines at the last render
    pub total_lines: usize,
}

impl TextBlockState {
    /// Scroll by delta (positive = down)
    pub fn scroll(&mut self, delta: isize) {
        self.scroll_offset = self.scroll_offset.saturating_add_signed(delta);
    }

    /// Scroll to top
    pub fn scroll_to_top(&mut self) {
        self.scroll_offset = 0;
    }
}

/// A borderless, scrollable text block
pub struct TextBlock<'a> {
    lines: &'a [StyledLine],
    style: Style,
}

impl<'a> TextBlock<'a> {
    /// Create a block over pre-styled lines
    pub fn new(lines: &'a [StyledLine]) -> Self {
        Self {
            lines,
            style: Style::default(),
        }
    }

    /// Fill style for the whole area
    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }
}

impl StatefulWidget for TextBlock<'_> {
    type State = TextBlockState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        buf.set_style(area, self.style);

        // Wrap text to width, keeping each source line's style
        let wrapped: Vec<(String, Style)> = self
            .lines
            .iter()
            .flat_map(|(line, style)| {
                if line.is_empty() {
                    vec![(String::new(), *style)]
                } else {
                    wrap(line, area.width as usize)
                        .into_iter()
                        .map(|cow| (cow.into_owned(), *style))
                        .collect()
                }
            })
            .collect();

        state.total_lines = wrapped.len();

        // Clamp scroll
        let max_scroll = state.total_lines.saturating_sub(area.height as usize);
        state.scroll_offset = state.scroll_offset.min(max_scroll);

        for (y, (line, style)) in (area.y..area.bottom()).zip(
            wrapped
                .iter()
                .skip(state.scroll_offset)
                .take(area.height as usize),
        ) {
            buf.set_stringn(area.x, y, line, area.width as usize, *style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol())
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    #[test]
    fn test_wraps_and_scrolls() {
        let lines = vec![
            ("alpha beta gamma".to_string(), Style::default()),
            (String::new(), Style::default()),
            ("delta".to_string(), Style::default()),
        ];
        let area = Rect::new(0, 0, 10, 2);
        let mut buf = Buffer::empty(area);
        let mut state = TextBlockState::default();

        TextBlock::new(&lines).render(area, &mut buf, &mut state);
        assert_eq!(state.total_lines, 4);
        assert_eq!(row(&buf, 0), "alpha beta");
        assert_eq!(row(&buf, 1), "gamma");

        state.scroll(10);
        let mut buf = Buffer::empty(area);
        TextBlock::new(&lines).render(area, &mut buf, &mut state);
        assert_eq!(state.scroll_offset, 2);
        assert_eq!(row(&buf, 1), "delta");
    }
}

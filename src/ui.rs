use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::{metrics::ResultRecord, render::RenderStrategy, session::Session};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

/// Keep `text` within `max_width` columns, eliding the front
fn fit_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let mut width = 1;
    let mut kept: Vec<char> = Vec::new();
    for c in text.chars().rev() {
        let w = c.width().unwrap_or(0);
        if width + w > max_width {
            break;
        }
        width += w;
        kept.push(c);
    }
    std::iter::once('…').chain(kept.into_iter().rev()).collect()
}

/// The typing screen: sample text centred vertically, source path underneath
pub struct TypingView<'a> {
    pub session: &'a Session,
    pub strategy: &'a dyn RenderStrategy,
}

impl Widget for TypingView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let margin = if area.width > HORIZONTAL_MARGIN * 4 {
            HORIZONTAL_MARGIN
        } else {
            0
        };
        let text_width = area.width.saturating_sub(margin * 2);
        let rows = self
            .strategy
            .rows(self.session, text_width)
            .min(area.height.saturating_sub(1));
        let padding = area.height.saturating_sub(rows + 1) / 2;

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(margin)
            .constraints([
                Constraint::Length(padding),
                Constraint::Length(rows),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(area);

        self.strategy.render(self.session, chunks[1], buf);

        let legend = "   (esc)ape";
        let path_width = chunks[2].width.saturating_sub(legend.width() as u16) as usize;
        let status = format!(
            "{}{legend}",
            fit_width(self.session.source_path(), path_width)
        );
        Paragraph::new(Span::styled(
            status,
            Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);
    }
}

/// The results screen shown until the user presses a key
pub struct ResultsView<'a> {
    pub record: &'a ResultRecord,
}

impl Widget for ResultsView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(1), // headline
                Constraint::Length(1), // details
                Constraint::Length(1), // source
                Constraint::Length(1), // padding
                Constraint::Length(1), // legend
                Constraint::Min(0),
            ])
            .split(area);

        let record = self.record;
        Paragraph::new(Span::styled(
            format!("Finished! WPM: {:.2}", record.wpm),
            bold_style,
        ))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

        Paragraph::new(Line::from(format!(
            "{:.2} cpm   {:.2}% acc   {:.2}% consistency",
            record.cpm, record.accuracy, record.consistency
        )))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

        Paragraph::new(Span::styled(
            fit_width(&record.source_path, chunks[3].width as usize),
            Style::default().add_modifier(Modifier::DIM),
        ))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);

        Paragraph::new(Span::styled("Press any key to exit...", italic_style))
            .alignment(Alignment::Center)
            .render(chunks[5], buf);
    }
}

pub fn draw_typing(f: &mut Frame, session: &Session, strategy: &dyn RenderStrategy) {
    f.render_widget(TypingView { session, strategy }, f.area());
}

pub fn draw_results(f: &mut Frame, record: &ResultRecord) {
    f.render_widget(ResultsView { record }, f.area());
}

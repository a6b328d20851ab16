use rand::Rng;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::{matching::Outcome, session::Session};

const HORIZONTAL_MARGIN: u16 = 5;

impl<R: Rng> Widget for &Session<R> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // styles
        let bold_style = Style::default().add_modifier(Modifier::BOLD);

        let correct_style = Style::default().patch(bold_style).fg(Color::White);
        let incorrect_style = Style::default().patch(bold_style).fg(Color::LightRed);
        let pending_style = Style::default().fg(Color::Blue);
        let cursor_style = pending_style.add_modifier(Modifier::UNDERLINED);

        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);
        let prompt_style = Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD);

        let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
        let lines_for = |text: &str| -> u16 {
            ((text.width() as f64 / max_chars_per_line as f64).ceil() as u16).max(1)
        };

        let target = self.target();
        let [next, next_next] = self.previews();
        let target_lines = lines_for(target.as_str());
        let next_lines = lines_for(next.as_str());
        let next_next_lines = lines_for(next_next.as_str());

        // timer, gap, target, previews, gap, prompt, footer
        let content_height = 1 + 1 + target_lines + next_lines + next_next_lines + 1 + 1 + 1;
        let top_padding = area.height.saturating_sub(content_height) / 2;

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .constraints(
                [
                    Constraint::Length(top_padding),
                    Constraint::Length(1),
                    Constraint::Length(1),
                    Constraint::Length(target_lines),
                    Constraint::Length(next_lines),
                    Constraint::Length(next_next_lines),
                    Constraint::Length(1),
                    Constraint::Length(1),
                    Constraint::Length(1),
                    Constraint::Min(0),
                ]
                .as_ref(),
            )
            .split(area);

        let header = match self.timer_display() {
            Some(remaining) => format!("{remaining}   lines {}", self.lines_completed()),
            None => format!("lines {}", self.lines_completed()),
        };
        Paragraph::new(Span::styled(header, dim_style))
            .alignment(Alignment::Center)
            .render(chunks[1], buf);

        let cursor = self.input().cursor();
        let spans = target
            .chars()
            .iter()
            .zip(self.outcomes())
            .enumerate()
            .map(|(idx, (expected, outcome))| match outcome {
                Outcome::Correct => Span::styled(expected.to_string(), correct_style),
                Outcome::Incorrect => Span::styled(
                    match expected {
                        ' ' => "·".to_owned(),
                        c => c.to_string(),
                    },
                    incorrect_style,
                ),
                Outcome::Pending if idx == cursor => {
                    Span::styled(expected.to_string(), cursor_style)
                }
                Outcome::Pending => Span::styled(expected.to_string(), pending_style),
            })
            .collect::<Vec<Span>>();

        Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false })
            .render(chunks[3], buf);

        for (sentence, chunk) in [(next, chunks[4]), (next_next, chunks[5])] {
            Paragraph::new(Span::styled(sentence.to_string(), dim_style))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: false })
                .render(chunk, buf);
        }

        if !self.prompt().is_empty() {
            let text = format!("{}  (enter) confirm", self.prompt());
            Paragraph::new(Span::styled(text, prompt_style))
                .alignment(Alignment::Center)
                .render(chunks[7], buf);
        }

        let mut footer = String::new();
        if let Some(run) = self.last_run() {
            footer.push_str(&format!(
                "last run: {} lines, {} keys   ",
                run.lines_completed, run.keystrokes
            ));
        }
        footer.push_str(if self.config().restart_prompt {
            "(tab) restart / (esc)ape"
        } else {
            "(esc)ape"
        });
        Paragraph::new(Span::styled(footer, italic_style))
            .alignment(Alignment::Center)
            .render(chunks[8], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Corpus;
    use crate::session::{KeyAction, SessionConfig, SessionEvent};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn create_test_session(config: SessionConfig) -> Session<StdRng> {
        Session::with_rng(
            Arc::new(Corpus::embedded().unwrap()),
            config,
            StdRng::seed_from_u64(99),
        )
        .unwrap()
    }

    fn render(session: &Session<StdRng>, width: u16, height: u16) -> Buffer {
        let area = Rect::new(0, 0, width, height);
        let mut buffer = Buffer::empty(area);
        session.render(area, &mut buffer);
        buffer
    }

    fn buffer_text(buffer: &Buffer) -> String {
        let width = buffer.area.width as usize;
        buffer
            .content
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_renders_target_previews_and_timer() {
        let session = create_test_session(SessionConfig::default());
        let text = buffer_text(&render(&session, 120, 20));

        assert!(text.contains(session.target().as_str().trim_end()));
        for preview in session.previews() {
            assert!(text.contains(preview.as_str().trim_end()));
        }
        assert!(text.contains("5s"));
        assert!(text.contains("(tab) restart"));
        assert!(!text.contains("Restart test?"));
    }

    #[test]
    fn test_renders_restart_prompt() {
        let mut session = create_test_session(SessionConfig::default());
        session.handle(SessionEvent::Key(KeyAction::RestartRequest));

        let text = buffer_text(&render(&session, 120, 20));
        assert!(text.contains("Restart test?"));
    }

    #[test]
    fn test_incorrect_chars_are_red() {
        let mut session = create_test_session(SessionConfig::default());
        session.handle(SessionEvent::Key(KeyAction::Char('#')));

        let buffer = render(&session, 120, 20);
        assert!(buffer
            .content
            .iter()
            .any(|cell| cell.fg == Color::LightRed));
    }

    #[test]
    fn test_correct_chars_are_white() {
        let mut session = create_test_session(SessionConfig::default());
        let first = session.target().chars()[0];
        session.handle(SessionEvent::Key(KeyAction::Char(first)));

        let buffer = render(&session, 120, 20);
        assert!(buffer.content.iter().any(|cell| cell.fg == Color::White));
        assert!(buffer
            .content
            .iter()
            .any(|cell| cell.modifier.contains(Modifier::UNDERLINED)));
    }

    #[test]
    fn test_untimed_header_and_footer() {
        let session = create_test_session(SessionConfig::untimed());
        let text = buffer_text(&render(&session, 120, 20));

        assert!(text.contains("lines 0"));
        assert!(!text.contains("(tab) restart"));
        assert!(text.contains("(esc)ape"));
    }

    #[test]
    fn test_last_run_shown_after_timeout() {
        let mut session = create_test_session(SessionConfig::default());
        session.handle(SessionEvent::Key(KeyAction::Char('a')));
        session.handle(SessionEvent::Timeout);

        let text = buffer_text(&render(&session, 120, 20));
        assert!(text.contains("last run: 0 lines, 1 keys"));
    }

    #[test]
    fn test_tiny_area_does_not_panic() {
        let session = create_test_session(SessionConfig::default());
        let _ = render(&session, 8, 3);
        let _ = render(&session, 1, 1);
    }
}

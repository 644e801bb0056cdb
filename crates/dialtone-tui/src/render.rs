//! Pure view functions. They read `&AppState`, draw, and never mutate.

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::state::{AppState, Screen};
use crate::{auth, dashboard};

/// Spinner frames for loading states.
const SPINNER_FRAMES: &[&str] = &["◐", "◓", "◑", "◒"];

pub fn spinner(frame: usize) -> &'static str {
    SPINNER_FRAMES[frame % SPINNER_FRAMES.len()]
}

pub fn render(app: &AppState, frame: &mut Frame) {
    let area = frame.area();
    match app.screen() {
        Screen::Loading => render_loading(frame, area, app.spinner_frame),
        Screen::Auth => auth::render_auth(
            frame,
            area,
            &app.auth,
            app.is_login_pending(),
            app.spinner_frame,
        ),
        Screen::Dashboard => match app.session.user() {
            Some(user) => dashboard::render_dashboard(frame, area, user, &app.dashboard),
            None => render_loading(frame, area, app.spinner_frame),
        },
    }
}

fn render_loading(frame: &mut Frame, area: Rect, spinner_frame: usize) {
    let y = area.y + area.height / 2;
    let line_area = Rect::new(area.x, y, area.width, 1.min(area.height));
    let line = Line::from(vec![
        Span::styled(spinner(spinner_frame), Style::default().fg(Color::Cyan)),
        Span::styled(" Loading...", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), line_area);
}

/// Centers a `width` x `height` rect in `area`, clamped to fit.
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(2));
    let height = height.min(area.height);
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width, height)
}

/// Draws a bordered, titled card in the middle of `area` and returns its
/// padded inner area.
pub fn render_card(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    width: u16,
    height: u16,
    border_color: Color,
) -> Rect {
    let card = centered_rect(area, width, height);
    frame.render_widget(Clear, card);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(" {title} "))
        .title_style(
            Style::default()
                .fg(border_color)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(block, card);

    Rect::new(
        card.x + 2,
        card.y + 1,
        card.width.saturating_sub(4),
        card.height.saturating_sub(2),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_cycles() {
        assert_eq!(spinner(0), "◐");
        assert_eq!(spinner(3), "◒");
        assert_eq!(spinner(4), "◐");
    }

    #[test]
    fn test_centered_rect_clamps_to_area() {
        let area = Rect::new(0, 0, 40, 10);
        let rect = centered_rect(area, 60, 16);
        assert_eq!(rect, Rect::new(1, 0, 38, 10));

        let rect = centered_rect(Rect::new(0, 0, 100, 40), 60, 16);
        assert_eq!(rect, Rect::new(20, 12, 60, 16));
    }
}

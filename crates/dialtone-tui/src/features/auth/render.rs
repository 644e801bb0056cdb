//! Auth screen view.

use dialtone_core::phone::PLACEHOLDER;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::AuthFormState;
use crate::render::{render_card, spinner};

const CARD_WIDTH: u16 = 60;
const CARD_HEIGHT: u16 = 16;

pub fn render_auth(
    frame: &mut Frame,
    area: Rect,
    form: &AuthFormState,
    submitting: bool,
    spinner_frame: usize,
) {
    let inner = render_card(frame, area, "Sign in", CARD_WIDTH, CARD_HEIGHT, Color::Cyan);
    let lines = auth_lines(form, submitting, spinner_frame);
    frame.render_widget(Paragraph::new(lines), inner);
}

pub fn auth_lines(form: &AuthFormState, submitting: bool, spinner_frame: usize) -> Vec<Line<'static>> {
    let muted = Style::default().fg(Color::DarkGray);
    let mut lines = vec![
        Line::from(Span::styled(
            "Welcome",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Enter your mobile number to access your dashboard",
            muted,
        )),
        Line::from(""),
        Line::from("Mobile Number"),
        input_line(form, submitting),
    ];

    if let Some(err) = form.visible_error() {
        lines.push(Line::from(Span::styled(
            err.to_string(),
            Style::default().fg(Color::Red),
        )));
    } else {
        lines.push(Line::from(""));
    }

    lines.push(Line::from(""));
    if let Some(failure) = &form.failure {
        lines.push(Line::from(Span::styled(
            failure.clone(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));
    }

    let button = if submitting {
        Span::styled(
            format!("[ {} Authenticating... ]", spinner(spinner_frame)),
            Style::default().fg(Color::Yellow),
        )
    } else if form.validate().is_ok() {
        Span::styled(
            "[ Continue ]",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled("[ Continue ]", muted)
    };
    lines.push(Line::from(button));
    lines.push(Line::from(""));

    let hint = if submitting {
        "Esc to cancel"
    } else {
        "Enter to continue, Esc to quit"
    };
    lines.push(Line::from(Span::styled(hint, muted)));
    lines
}

fn input_line(form: &AuthFormState, submitting: bool) -> Line<'static> {
    let prompt = Span::styled("> ", Style::default().fg(Color::Cyan));
    let value = if form.input.is_empty() {
        Span::styled(PLACEHOLDER, Style::default().fg(Color::DarkGray))
    } else if submitting {
        Span::styled(form.input.clone(), Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(form.input.clone())
    };

    let mut spans = vec![prompt, value];
    match form.indicator() {
        Some(true) => spans.push(Span::styled(" ✓", Style::default().fg(Color::Green))),
        Some(false) => spans.push(Span::styled(" •", Style::default().fg(Color::DarkGray))),
        None => {}
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::AUTH_FAILED_MESSAGE;

    fn text(lines: &[Line<'_>]) -> String {
        lines
            .iter()
            .map(|line| {
                line.spans
                    .iter()
                    .map(|span| span.content.as_ref())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_empty_form_shows_placeholder_and_continue() {
        let out = text(&auth_lines(&AuthFormState::default(), false, 0));
        assert!(out.contains("Welcome"));
        assert!(out.contains("Mobile Number"));
        assert!(out.contains("> 09123456789"));
        assert!(out.contains("[ Continue ]"));
        assert!(!out.contains('✓'));
        assert!(!out.contains('•'));
    }

    #[test]
    fn test_indicator_and_submit_error() {
        let mut form = AuthFormState::default();
        form.insert_digits("0912");
        let out = text(&auth_lines(&form, false, 0));
        assert!(out.contains("> 0912 •"));
        assert!(!out.contains("Please enter a valid mobile number"));

        form.submitted = true;
        let out = text(&auth_lines(&form, false, 0));
        assert!(out.contains("Please enter a valid mobile number (09XXXXXXXXX)"));

        form.insert_digits("3456789");
        let out = text(&auth_lines(&form, false, 0));
        assert!(out.contains("> 09123456789 ✓"));
        assert!(!out.contains("Please enter"));
    }

    #[test]
    fn test_submitting_and_failure_banner() {
        let mut form = AuthFormState::default();
        form.insert_digits("09123456789");

        let out = text(&auth_lines(&form, true, 1));
        assert!(out.contains("Authenticating..."));
        assert!(out.contains("Esc to cancel"));

        form.failure = Some(AUTH_FAILED_MESSAGE.to_string());
        let out = text(&auth_lines(&form, false, 0));
        assert!(out.contains(AUTH_FAILED_MESSAGE));
        assert!(out.contains("[ Continue ]"));
    }
}

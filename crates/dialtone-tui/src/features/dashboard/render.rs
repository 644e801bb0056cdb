use dialtone_core::user::UserRecord;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::DashboardState;
use crate::render::render_card;

const CARD_WIDTH: u16 = 72;
const CARD_HEIGHT: u16 = 20;

/// Width of the label column in the profile card.
const LABEL_WIDTH: usize = 15;

pub fn render_dashboard(frame: &mut Frame, area: Rect, user: &UserRecord, state: &DashboardState) {
    let inner = render_card(frame, area, "Dashboard", CARD_WIDTH, CARD_HEIGHT, Color::Green);
    frame.render_widget(Paragraph::new(dashboard_lines(user, state)), inner);
}

pub fn dashboard_lines(user: &UserRecord, state: &DashboardState) -> Vec<Line<'static>> {
    let muted = Style::default().fg(Color::DarkGray);
    let mut lines = vec![
        Line::from(Span::styled(
            "Welcome to your Dashboard",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Your secure workspace is ready.",
            muted,
        )),
        Line::from(""),
        Line::from(Span::styled(
            user.full_name(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("● ", Style::default().fg(Color::Green)),
            Span::styled("Active Session", Style::default().fg(Color::Green)),
        ]),
        Line::from(""),
        field("Email Address", user.email()),
        field("Phone Number", user.phone()),
        field("Location", &user.location_line()),
        field("Picture", &user.picture().large),
        Line::from(""),
    ];

    if let Some(notice) = &state.notice {
        lines.push(Line::from(Span::styled(
            notice.clone(),
            Style::default().fg(Color::Yellow),
        )));
        lines.push(Line::from(""));
    }

    lines.push(Line::from(Span::styled(
        "o open picture · s sign out · q quit",
        muted,
    )));
    lines
}

fn field(label: &str, value: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{label:<LABEL_WIDTH$}"),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw(value.to_string()),
    ])
}

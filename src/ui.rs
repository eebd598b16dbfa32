pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::{
    app::{App, AppState},
    quiz::{Answer, QuestionStyle},
    session::RenderedQuestion,
};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;

/// Lines a block of text needs when wrapped to `width` columns
fn wrapped_height(text: &str, width: u16) -> u16 {
    let width = width.max(1) as usize;
    text.lines()
        .map(|line| line.width().max(1).div_ceil(width) as u16)
        .sum::<u16>()
        .max(1)
}

/// What the learner should have answered, in the question's own terms
pub fn correct_label(question: &RenderedQuestion) -> String {
    match question.style {
        QuestionStyle::MultipleChoice => question
            .correct_answer
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|idx| question.options.get(idx))
            .cloned()
            .unwrap_or_else(|| question.correct_answer.clone()),
        _ => question.correct_answer.clone(),
    }
}

fn answer_label(question: &RenderedQuestion, answer: Option<&Answer>) -> String {
    match answer {
        None => "-".to_string(),
        Some(Answer::Choice(idx)) => question
            .options
            .get(*idx)
            .cloned()
            .unwrap_or_else(|| idx.to_string()),
        Some(Answer::Text(t)) => t.clone(),
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Taking => render_question(self, area, buf),
            AppState::Results => render_results(self, area, buf),
        }
    }
}

fn render_question(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_style = Style::default().add_modifier(Modifier::DIM);
    let selected_style = Style::default().patch(bold_style).fg(Color::Green);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let session = &app.session;
    let Some(question) = session.current_question() else {
        Paragraph::new(Span::styled("Loading quiz...", italic_style))
            .alignment(Alignment::Center)
            .render(area, buf);
        return;
    };

    let inner_width = area.width.saturating_sub(HORIZONTAL_MARGIN * 2);
    let prompt_lines = wrapped_height(&question.prompt, inner_width);
    let body_lines = match question.style {
        QuestionStyle::FreeResponse => 1,
        _ => question.options.len() as u16,
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints(
            [
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(prompt_lines),
                Constraint::Length(1),
                Constraint::Length(body_lines),
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(area);

    Paragraph::new(Line::from(vec![
        Span::styled(session.title().to_string(), bold_style),
        Span::styled(
            format!(
                "   question {}/{}",
                session.current_index() + 1,
                session.questions().len()
            ),
            dim_style,
        ),
    ]))
    .render(chunks[0], buf);

    Paragraph::new(question.prompt.as_str())
        .style(bold_style)
        .wrap(Wrap { trim: false })
        .render(chunks[2], buf);

    let current = session.current_answer();
    match question.style {
        QuestionStyle::FreeResponse => {
            Paragraph::new(Line::from(vec![
                Span::styled("> ", dim_style),
                Span::raw(app.input.clone()),
                Span::styled("_", dim_style.add_modifier(Modifier::SLOW_BLINK)),
            ]))
            .render(chunks[4], buf);
        }
        _ => {
            let lines = question
                .options
                .iter()
                .enumerate()
                .map(|(idx, option)| {
                    let chosen = matches!(current, Some(Answer::Choice(c)) if *c == idx);
                    let marker = if chosen { "●" } else { "○" };
                    Line::from(Span::styled(
                        format!("{marker} {}. {option}", idx + 1),
                        if chosen { selected_style } else { Style::default() },
                    ))
                })
                .collect::<Vec<Line>>();
            Paragraph::new(lines).render(chunks[4], buf);
        }
    }

    if let Some(status) = &app.status {
        Paragraph::new(Span::styled(status.clone(), Style::default().fg(Color::Red)))
            .render(chunks[6], buf);
    }

    let legend = match question.style {
        QuestionStyle::MultipleChoice => "(1-9) choose / (enter) next / (←) back / (esc)ape",
        QuestionStyle::TrueFalse => "(t)rue / (f)alse / (enter) next / (←) back / (esc)ape",
        QuestionStyle::FreeResponse => "type answer / (enter) next / (←) back / (esc)ape",
    };
    Paragraph::new(Span::styled(legend, italic_style)).render(chunks[7], buf);
}

fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
    let red_bold_style = Style::default().patch(bold_style).fg(Color::Red);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let Some(summary) = app.summary() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints(
            [
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(area);

    Paragraph::new(Span::styled(
        format!(
            "{}%   {}/{} correct   {}m {}s",
            summary.percentage, summary.score, summary.total, summary.minutes, summary.seconds
        ),
        bold_style,
    ))
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    Paragraph::new(Line::from(vec![
        Span::styled(format!("{} correct", summary.correct), green_bold_style),
        Span::raw("   "),
        Span::styled(format!("{} incorrect", summary.incorrect), red_bold_style),
    ]))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    let session = &app.session;
    let mut review = Vec::new();
    for (idx, (question, answer)) in session
        .questions()
        .iter()
        .zip(session.answers())
        .enumerate()
    {
        let correct = question.is_correct(answer.as_ref());
        review.push(Line::from(vec![
            Span::styled(
                if correct { "✓ " } else { "✗ " },
                if correct { green_bold_style } else { red_bold_style },
            ),
            Span::raw(format!(
                "{}. yours: {}   answer: {}",
                idx + 1,
                answer_label(question, answer.as_ref()),
                correct_label(question)
            )),
        ]));
        if let Some(explanation) = &question.explanation {
            review.push(Line::from(Span::styled(
                format!("   {explanation}"),
                italic_style,
            )));
        }
    }
    Paragraph::new(review)
        .wrap(Wrap { trim: false })
        .render(chunks[3], buf);

    Paragraph::new(Span::styled("(enter/esc) quit", italic_style)).render(chunks[4], buf);
}

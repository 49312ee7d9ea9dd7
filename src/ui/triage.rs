use iced::widget::{button, column, container, horizontal_space, progress_bar, row, slider, text};
use iced::{Alignment, Element, Length, Theme};

use super::widgets::{bucket_color, preview};
use super::Preview;
use crate::state::data::Classification;
use crate::triage::TriageSession;
use crate::Message;

/// One image at a time: hold K / M / Y and release to decide
pub fn view<'a>(
    session: &'a TriageSession,
    pressed: Option<Classification>,
    current_preview: Option<&'a Preview>,
) -> Element<'a, Message> {
    let (classified, total) = session.progress();

    let header = row![
        button("‹ Leave").style(button::text).on_press(Message::Back),
        text(session.folder().name()).size(22),
        horizontal_space(),
        text(format!("{} / {}", session.cursor() + 1, total)),
        button("Review ↵").on_press_maybe(session.can_review().then_some(Message::EnterReview)),
    ]
    .spacing(12)
    .align_y(Alignment::Center);

    let mut progress = column![
        progress_bar(0.0..=total.max(1) as f32, classified as f32).height(6),
        text(if session.is_complete() {
            format!("All {} classified · ↵ to review", total)
        } else {
            format!("{} of {} classified", classified, total)
        })
        .size(12),
    ]
    .spacing(4);

    if total > 1 {
        let last = (total - 1) as u32;
        progress = progress.push(
            slider(0..=last, session.cursor() as u32, |index| {
                Message::JumpTo(index as usize)
            })
            .width(Length::Fill),
        );
    }

    let Some(current) = session.current() else {
        return column![header, text("Nothing to triage.")].spacing(16).into();
    };

    let decided = session.ledger().get(&current.id);
    let status = match decided {
        Some(bucket) => {
            text(format!("{}  ·  ⌫ to undo", bucket.label())).color(bucket_color(bucket))
        }
        None => text(current.name.clone()),
    };

    let handle = current_preview.and_then(|p| p.handle_for(&current.path));
    let stage = container(preview(handle, current))
        .width(Length::Fill)
        .height(Length::Fill)
        .padding(8)
        .style(move |theme: &Theme| {
            let palette = theme.extended_palette();
            let border_color = pressed
                .or(decided)
                .map(bucket_color)
                .unwrap_or(palette.background.strong.color);
            container::Style {
                border: iced::Border {
                    color: border_color,
                    width: if pressed.is_some() { 4.0 } else { 2.0 },
                    radius: 8.0.into(),
                },
                ..container::Style::default()
            }
        });

    let buttons = row(Classification::ALL.into_iter().map(|bucket| {
        let key = match bucket {
            Classification::Keep => "K",
            Classification::Maybe => "M",
            Classification::Yeet => "Y",
        };
        let active = pressed == Some(bucket) || decided == Some(bucket);
        button(text(format!("{}  {}", bucket.label(), key)).size(18))
            .padding([10, 24])
            .style(move |theme: &Theme, status| {
                let mut style = button::secondary(theme, status);
                if active {
                    style.background = Some(bucket_color(bucket).into());
                }
                style
            })
            .on_press(Message::Classify(bucket))
            .into()
    }))
    .spacing(16);

    column![
        header,
        progress,
        stage,
        row![status, horizontal_space(), buttons].align_y(Alignment::Center),
        text("← → to move without deciding").size(12),
    ]
    .spacing(12)
    .into()
}

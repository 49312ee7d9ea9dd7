use iced::widget::{button, column, row, scrollable, text, Column};
use iced::{Element, Length};

use super::widgets::bucket_color;
use crate::state::data::Classification;
use crate::triage::commit::CommitSummary;
use crate::Message;

/// Shown after a successful commit
pub fn view<'a>(folder_name: &'a str, summary: &'a CommitSummary) -> Element<'a, Message> {
    let count = |bucket: Classification, value: usize| {
        text(format!("{} {}", value, bucket.label().to_lowercase()))
            .size(22)
            .color(bucket_color(bucket))
    };

    let mut content = column![
        text(format!("{} triaged", folder_name)).size(28),
        text(format!("{} images sorted", summary.total())).size(14),
        row![
            count(Classification::Keep, summary.keep),
            count(Classification::Maybe, summary.maybe),
            count(Classification::Yeet, summary.yeet),
        ]
        .spacing(24),
    ]
    .spacing(16);

    if !summary.conflicts.is_empty() {
        let renamed = summary.conflicts.iter().map(|conflict| {
            text(format!(
                "{}  →  {}",
                conflict.source.display(),
                conflict.destination.display()
            ))
            .size(12)
            .into()
        });
        content = content
            .push(text(format!(
                "{} files were renamed to avoid overwriting:",
                summary.conflicts.len()
            )))
            .push(scrollable(Column::with_children(renamed).spacing(4)).height(Length::Fill));
    }

    content
        .push(
            row![
                button("Keep gallery").on_press(Message::OpenGallery(Classification::Keep)),
                button("Maybe gallery").on_press(Message::OpenGallery(Classification::Maybe)),
                button("Back to project").on_press(Message::Back),
            ]
            .spacing(8),
        )
        .into()
}

/// Review: the three buckets side by side.
///
/// Cards are picked up on press and dropped on release: releasing over
/// another card inserts before it, releasing over empty column space
/// appends. Releasing over the same card is a click (Cmd/Ctrl toggles).
use iced::widget::{
    button, column, container, horizontal_space, mouse_area, row, scrollable, text, Column,
};
use iced::{Alignment, Color, Element, Length};

use super::widgets::{bucket_color, card_style, thumbnail};
use crate::state::data::{Classification, ImageId};
use crate::triage::TriageSession;
use crate::Message;

const CARD_THUMBNAIL: f32 = 120.0;

pub fn view<'a>(
    session: &'a TriageSession,
    held: Option<&'a ImageId>,
    committing: bool,
) -> Element<'a, Message> {
    let (keep, maybe, yeet) = session.ledger().counts();
    let (_, total) = session.progress();
    let unset = total - (keep + maybe + yeet);

    let commit_label = if committing { "Committing…" } else { "Commit" };
    let header = row![
        button("‹ Back to triage").style(button::text).on_press(Message::LeaveReview),
        text(session.folder().name()).size(22),
        horizontal_space(),
        text(format!("{} not yet classified", unset)).size(14),
        button(commit_label)
            .style(button::success)
            .padding([8, 20])
            .on_press_maybe((!committing).then_some(Message::Commit)),
    ]
    .spacing(12)
    .align_y(Alignment::Center);

    let columns = row(Classification::ALL
        .into_iter()
        .map(|bucket| bucket_column(session, bucket, held)))
    .spacing(12)
    .height(Length::Fill);

    let help = text(
        "↑↓ select (⇧ extend) · ←→ switch column · ⌥←→ move selection · \
         ↵ keep · ⌘↵ maybe · ⌫ yeet · Esc back",
    )
    .size(12);

    column![header, columns, help].spacing(12).into()
}

fn bucket_column<'a>(
    session: &'a TriageSession,
    bucket: Classification,
    held: Option<&'a ImageId>,
) -> Element<'a, Message> {
    let order = session.ledger().order(bucket);
    let selection = session.selection();

    let cards = order.iter().enumerate().filter_map(|(index, id)| {
        let image = session.image(id)?;

        let highlight = if selection.focused() == Some(id) {
            Some(Color::WHITE)
        } else if selection.is_selected(id) {
            Some(bucket_color(bucket))
        } else {
            None
        };

        let card = column![thumbnail(image, CARD_THUMBNAIL), text(&image.name).size(12)]
            .spacing(4)
            .align_x(Alignment::Center);

        let card = container(card)
            .padding(6)
            .width(Length::Fill)
            .style(card_style(highlight));

        // Dim the card being dragged
        let card: Element<Message> = if held == Some(id) {
            container(card).style(|_| container::Style {
                text_color: Some(Color::from_rgba(1.0, 1.0, 1.0, 0.4)),
                ..container::Style::default()
            })
            .into()
        } else {
            card.into()
        };

        Some(
            mouse_area(card)
                .on_press(Message::CardPressed(id.clone()))
                .on_release(Message::CardReleased(bucket, index, id.clone()))
                .into(),
        )
    });

    let title = text(format!("{} ({})", bucket.label(), order.len()))
        .size(18)
        .color(bucket_color(bucket));

    let list = scrollable(Column::with_children(cards).spacing(8).padding([0, 8]))
        .height(Length::Fill);

    mouse_area(
        container(column![title, list].spacing(8))
            .padding(8)
            .width(Length::FillPortion(1))
            .height(Length::Fill)
            .style(card_style(None)),
    )
    .on_release(Message::ColumnReleased(bucket))
    .into()
}

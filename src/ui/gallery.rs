/// Keep / Maybe gallery of a project's outputs
use iced::widget::{button, column, container, horizontal_space, mouse_area, row, scrollable, text};
use iced::{Alignment, Color, Element, Length, Pixels};
use iced_aw::Wrap;

use super::widgets::{card_style, format_size, preview, thumbnail};
use super::Preview;
use crate::cache::gallery::GalleryEntry;
use crate::cache::LoadStatus;
use crate::config::GALLERY_THUMBNAIL_SIZE;
use crate::state::data::{Classification, Project};
use crate::Message;

pub fn view<'a>(
    project: &'a Project,
    bucket: Classification,
    entry: Option<&'a GalleryEntry>,
    current_preview: Option<&'a Preview>,
) -> Element<'a, Message> {
    let tab = |label: &'a str, value: Classification| {
        button(text(label))
            .style(if bucket == value { button::primary } else { button::text })
            .on_press(Message::OpenGallery(value))
    };

    let summary = entry
        .filter(|entry| entry.status.is_ready())
        .map(|entry| format!("{} images · {}", entry.images.len(), format_size(entry.total_size())))
        .unwrap_or_default();

    let header = row![
        button("‹ Project").style(button::text).on_press(Message::Back),
        text(&project.name).size(22),
        tab("Keep", Classification::Keep),
        tab("Maybe", Classification::Maybe),
        horizontal_space(),
        text(summary).size(14),
    ]
    .spacing(12)
    .align_y(Alignment::Center);

    let body: Element<Message> = match entry {
        None => text("Loading…").into(),
        Some(entry) => match &entry.status {
            LoadStatus::Loading => text("Loading…").into(),
            LoadStatus::Error(message) => {
                text(format!("Could not list outputs: {}", message)).into()
            }
            LoadStatus::Ready if entry.images.is_empty() => {
                text(format!("No {} images yet.", bucket.label().to_lowercase())).into()
            }
            LoadStatus::Ready => grid(project, entry, current_preview),
        },
    };

    column![header, body].spacing(16).height(Length::Fill).into()
}

fn grid<'a>(
    project: &'a Project,
    entry: &'a GalleryEntry,
    current_preview: Option<&'a Preview>,
) -> Element<'a, Message> {
    let size = GALLERY_THUMBNAIL_SIZE as f32;

    let tiles: Vec<Element<Message>> = entry
        .images
        .iter()
        .enumerate()
        .map(|(index, output)| {
            let highlight = (index == entry.selected).then_some(Color::WHITE);
            mouse_area(
                container(thumbnail(&output.image, size))
                    .padding(2)
                    .style(card_style(highlight)),
            )
            .on_press(Message::GalleryPick(index))
            .into()
        })
        .collect();

    let details: Element<Message> = match entry.selected_image() {
        Some(output) => {
            let origin = project
                .folder(&output.source_folder_id)
                .map(|folder| folder.name())
                .unwrap_or_else(|| "unknown folder".to_string());
            column![
                container(preview(
                    current_preview.and_then(|p| p.handle_for(&output.image.path)),
                    &output.image,
                ))
                .height(Length::Fill),
                text(&output.image.name),
                text(format!("{} · from {}", format_size(output.image.size), origin)).size(12),
            ]
            .spacing(6)
            .width(Length::FillPortion(2))
            .into()
        }
        None => horizontal_space().into(),
    };

    row![
        scrollable(
            Wrap::with_elements(tiles)
                .spacing(Pixels(8.0))
                .line_spacing(Pixels(8.0))
        )
        .width(Length::FillPortion(3))
        .height(Length::Fill),
        details,
    ]
    .spacing(16)
    .into()
}

use iced::widget::{button, container, image, row, text};
use iced::{Border, Color, ContentFit, Element, Length, Theme};

use crate::state::data::{Classification, Image};
use crate::Message;

/// Thumbnail or a placeholder box of the same size
pub fn thumbnail<'a>(image_data: &Image, size: f32) -> Element<'a, Message> {
    match &image_data.thumbnail {
        Some(path) => image(image::Handle::from_path(path))
            .width(size)
            .height(size)
            .content_fit(ContentFit::Contain)
            .into(),
        None => container(text("…").size(14))
            .center(Length::Fixed(size))
            .style(container::rounded_box)
            .into(),
    }
}

/// Full-size image if loaded, otherwise the thumbnail stretched to fill
pub fn preview<'a>(handle: Option<&image::Handle>, image_data: &Image) -> Element<'a, Message> {
    let source = match (handle, &image_data.thumbnail) {
        (Some(handle), _) => handle.clone(),
        (None, Some(path)) => image::Handle::from_path(path),
        (None, None) => {
            return container(text("Loading…"))
                .center(Length::Fill)
                .into();
        }
    };

    image(source)
        .width(Length::Fill)
        .height(Length::Fill)
        .content_fit(ContentFit::Contain)
        .into()
}

pub fn bucket_color(bucket: Classification) -> Color {
    match bucket {
        Classification::Keep => Color::from_rgb(0.30, 0.75, 0.40),
        Classification::Maybe => Color::from_rgb(0.95, 0.70, 0.20),
        Classification::Yeet => Color::from_rgb(0.90, 0.30, 0.30),
    }
}

/// Frame around a card; highlighted when selected or focused
pub fn card_style(highlight: Option<Color>) -> impl Fn(&Theme) -> container::Style {
    move |theme: &Theme| {
        let palette = theme.extended_palette();
        container::Style {
            background: Some(palette.background.weak.color.into()),
            border: Border {
                color: highlight.unwrap_or(palette.background.strong.color),
                width: if highlight.is_some() { 2.0 } else { 1.0 },
                radius: 6.0.into(),
            },
            ..container::Style::default()
        }
    }
}

pub fn banner<'a>(message: &'a str) -> Element<'a, Message> {
    container(
        row![
            text(message).width(Length::Fill),
            button(text("Dismiss").size(14))
                .style(button::text)
                .on_press(Message::DismissBanner),
        ]
        .spacing(12),
    )
    .padding(10)
    .width(Length::Fill)
    .style(|theme: &Theme| {
        let palette = theme.extended_palette();
        container::Style {
            background: Some(palette.danger.weak.color.into()),
            text_color: Some(palette.danger.weak.text),
            border: Border {
                radius: 6.0.into(),
                ..Border::default()
            },
            ..container::Style::default()
        }
    })
    .into()
}

/// Human readable byte size
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    let value = bytes as f64;
    if value >= GB {
        format!("{:.1} GB", value / GB)
    } else if value >= MB {
        format!("{:.1} MB", value / MB)
    } else if value >= KB {
        format!("{:.1} KB", value / KB)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(5 * 1024 * 1024 + 512 * 1024), "5.5 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.0 GB");
    }
}

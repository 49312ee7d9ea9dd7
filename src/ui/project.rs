/// Project screen: overview tab plus one tab per source folder
use iced::widget::{
    button, column, container, horizontal_space, mouse_area, row, scrollable, text, Column, Row,
};
use iced::{Alignment, Element, Length};

use super::widgets::{card_style, preview, thumbnail};
use super::Preview;
use crate::cache::folder::FolderEntry;
use crate::cache::{FolderCache, LoadStatus};
use crate::state::data::{Classification, Folder, OutputLayout, OutputMode, Project, ProjectStats};
use crate::Message;

const FILMSTRIP_THUMBNAIL: f32 = 96.0;

pub fn view<'a>(
    project: &'a Project,
    tab: usize,
    stats: Option<&'a ProjectStats>,
    folders: &'a FolderCache,
    current_preview: Option<&'a Preview>,
    start_pressed: bool,
) -> Element<'a, Message> {
    let header = row![
        button("‹ Projects").style(button::text).on_press(Message::Back),
        text(&project.name).size(28),
        horizontal_space(),
        layout_toggle(project.output_layout),
        button("Add folder…").on_press(Message::AddFolder),
    ]
    .spacing(12)
    .align_y(Alignment::Center);

    let body = match tab.checked_sub(1).and_then(|index| project.folders.get(index)) {
        Some(folder) => folder_tab(folder, folders.get(&folder.id), current_preview, start_pressed),
        None => overview(project, stats),
    };

    column![header, tab_bar(project, tab), body]
        .spacing(16)
        .height(Length::Fill)
        .into()
}

fn layout_toggle<'a>(layout: OutputLayout) -> Element<'a, Message> {
    let option = |label: &'a str, value: OutputLayout| {
        button(text(label).size(14))
            .style(if layout == value { button::primary } else { button::secondary })
            .on_press(Message::SetLayout(value))
    };

    row![
        text("Output:").size(14),
        option("Per folder", OutputLayout::PerFolder),
        option("Unified", OutputLayout::Unified),
    ]
    .spacing(4)
    .align_y(Alignment::Center)
    .into()
}

fn tab_bar<'a>(project: &'a Project, active: usize) -> Element<'a, Message> {
    let labels =
        std::iter::once("Overview".to_string()).chain(project.folders.iter().map(Folder::name));

    let tabs = labels.enumerate().map(|(index, label)| {
        // Cmd+1..9 shortcut hint
        let label = if index < 9 {
            format!("{}  ⌘{}", label, index + 1)
        } else {
            label
        };
        button(text(label).size(14))
            .style(if index == active { button::primary } else { button::text })
            .on_press(Message::SelectTab(index))
            .into()
    });

    scrollable(Row::with_children(tabs).spacing(4))
        .direction(scrollable::Direction::Horizontal(scrollable::Scrollbar::new()))
        .into()
}

fn overview<'a>(project: &'a Project, stats: Option<&'a ProjectStats>) -> Element<'a, Message> {
    let totals = match stats {
        Some(stats) => format!("{} keep · {} maybe", stats.total_keep, stats.total_maybe),
        None => "Counting…".to_string(),
    };

    let galleries = row![
        text(totals),
        horizontal_space(),
        button("Keep gallery").on_press(Message::OpenGallery(Classification::Keep)),
        button("Maybe gallery").on_press(Message::OpenGallery(Classification::Maybe)),
    ]
    .spacing(8)
    .align_y(Alignment::Center);

    if project.folders.is_empty() {
        return column![galleries, text("Add a source folder to get started.")]
            .spacing(16)
            .into();
    }

    let rows = project.folders.iter().enumerate().map(|(index, folder)| {
        let folder_stats =
            stats.and_then(|stats| stats.folders.iter().find(|s| s.folder_id == folder.id));
        folder_row(index + 1, folder, folder_stats)
    });

    column![
        galleries,
        scrollable(Column::with_children(rows).spacing(8)).height(Length::Fill),
    ]
    .spacing(16)
    .into()
}

fn folder_row<'a>(
    tab: usize,
    folder: &'a Folder,
    stats: Option<&crate::state::data::FolderStats>,
) -> Element<'a, Message> {
    let counts = match stats {
        Some(s) => format!(
            "{} images · {} keep · {} maybe",
            s.source_count, s.keep_count, s.maybe_count
        ),
        None => String::new(),
    };

    let mode = |label: &'a str, value: OutputMode| {
        button(text(label).size(14))
            .style(if folder.output_mode == value { button::primary } else { button::secondary })
            .on_press(Message::SetFolderMode(folder.id.clone(), value))
    };

    container(
        row![
            column![
                text(folder.name()).size(18),
                text(folder.source_path.display().to_string()).size(12),
                text(counts).size(14),
            ]
            .spacing(4),
            horizontal_space(),
            mode("Move", OutputMode::Move),
            mode("Copy", OutputMode::Copy),
            button("Open").on_press(Message::SelectTab(tab)),
            button("Remove")
                .style(button::danger)
                .on_press(Message::RemoveFolder(folder.id.clone())),
        ]
        .spacing(8)
        .align_y(Alignment::Center),
    )
    .padding(12)
    .width(Length::Fill)
    .style(card_style(None))
    .into()
}

fn folder_tab<'a>(
    folder: &'a Folder,
    entry: Option<&'a FolderEntry>,
    current_preview: Option<&'a Preview>,
    start_pressed: bool,
) -> Element<'a, Message> {
    let Some(entry) = entry else {
        return text("Loading…").into();
    };

    match &entry.status {
        LoadStatus::Loading => {
            return text(format!("Scanning {}…", folder.source_path.display())).into()
        }
        LoadStatus::Error(message) => {
            return text(format!("Could not load folder: {}", message)).into()
        }
        LoadStatus::Ready => {}
    }

    if entry.images.is_empty() {
        return text("No images in this folder.").into();
    }

    let label = format!("Start triage ({} images)   hold ⇧↵", entry.images.len());
    let start = button(text(label).size(16))
        .style(if start_pressed { button::success } else { button::primary })
        .padding(10)
        .on_press(Message::StartTriage);

    let large: Element<Message> = match entry.selected_image() {
        Some(image) => preview(current_preview.and_then(|p| p.handle_for(&image.path)), image),
        None => horizontal_space().into(),
    };

    let strip = entry.images.iter().enumerate().map(|(index, image)| {
        let highlight = (index == entry.selected).then(|| iced::Color::WHITE);
        mouse_area(
            container(thumbnail(image, FILMSTRIP_THUMBNAIL))
                .padding(2)
                .style(card_style(highlight)),
        )
        .on_press(Message::BrowsePick(index))
        .into()
    });

    let caption = entry
        .selected_image()
        .map(|image| format!("{} / {}  {}", entry.selected + 1, entry.images.len(), image.name))
        .unwrap_or_default();

    column![
        row![text(caption), horizontal_space(), start].align_y(Alignment::Center),
        container(large).height(Length::Fill).width(Length::Fill),
        scrollable(Row::with_children(strip).spacing(6))
            .direction(scrollable::Direction::Horizontal(scrollable::Scrollbar::new())),
    ]
    .spacing(12)
    .into()
}

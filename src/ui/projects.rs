/// Landing screen: every project in the catalog
use iced::widget::{
    button, column, container, horizontal_space, row, scrollable, text, text_input, Column,
};
use iced::{Alignment, Element, Length};
use std::collections::HashMap;

use super::widgets::card_style;
use crate::state::data::{Project, ProjectStats};
use crate::Message;

pub fn view<'a>(
    projects: &'a [Project],
    stats: &'a HashMap<String, ProjectStats>,
    new_name: &'a str,
) -> Element<'a, Message> {
    let create = row![
        text_input("New project name", new_name)
            .on_input(Message::NewProjectNameChanged)
            .on_submit(Message::CreateProject)
            .padding(8),
        button("Create…")
            .on_press_maybe((!new_name.trim().is_empty()).then_some(Message::CreateProject))
            .padding(8),
    ]
    .spacing(8);

    let list: Element<Message> = if projects.is_empty() {
        text("No projects yet. Create one to start triaging.").into()
    } else {
        let rows = projects.iter().map(|project| project_row(project, stats.get(&project.id)));
        scrollable(Column::with_children(rows).spacing(8))
            .height(Length::Fill)
            .into()
    };

    column![text("Toss").size(40), create, list]
        .spacing(20)
        .into()
}

fn project_row<'a>(project: &'a Project, stats: Option<&ProjectStats>) -> Element<'a, Message> {
    let counts = match stats {
        Some(stats) => format!(
            "{} folders · {} keep · {} maybe",
            project.folders.len(),
            stats.total_keep,
            stats.total_maybe
        ),
        None => format!("{} folders", project.folders.len()),
    };

    let info = column![
        text(&project.name).size(20),
        text(counts).size(14),
        text(project.path.display().to_string()).size(12),
    ]
    .spacing(4);

    container(
        row![
            info,
            horizontal_space(),
            button("Open").on_press(Message::OpenProject(project.id.clone())),
            button("Remove")
                .style(button::danger)
                .on_press(Message::DeleteProject(project.id.clone())),
        ]
        .spacing(8)
        .align_y(Alignment::Center),
    )
    .padding(12)
    .width(Length::Fill)
    .style(card_style(None))
    .into()
}

use iced::widget::{column, container, image, text};
use iced::{Element, Length, Subscription, Task, Theme};
use rfd::FileDialog;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

mod cache;
mod config;
mod logging;
mod media;
mod state;
mod triage;
mod ui;

use cache::gallery::GalleryKey;
use cache::{FolderCache, GallerySessions, LoadTicket};
use config::Settings;
use media::scan::OutputImage;
use media::store;
use media::{FsExecutor, FsImageStore, ImageStore, TriageExecutor};
use state::catalog::Catalog;
use state::data::{
    Classification, Folder, Image, ImageId, OutputLayout, OutputMode, Project, ProjectStats,
};
use triage::commit::CommitSummary;
use triage::gesture::{self, GestureEngine, Signal, StartTriage};
use triage::input::{Key, Modifiers};
use triage::navigator::{Direction, ReviewCommand};
use triage::{Phase, TriageSession};
use ui::Preview;

/// Which screen is showing
#[derive(Debug, Clone)]
enum Screen {
    Projects,
    /// Tab 0 is the overview, tab N the N-th folder
    Project { project_id: String, tab: usize },
    /// Classify or review; the session lives in `Toss::session`
    Triage { project_id: String },
    Summary {
        project_id: String,
        folder_name: String,
        summary: CommitSummary,
    },
    Gallery {
        project_id: String,
        bucket: Classification,
    },
}

/// Main application state
struct Toss {
    catalog: Catalog,
    settings: Settings,
    store: Arc<dyn ImageStore>,
    executor: Arc<dyn TriageExecutor>,
    screen: Screen,
    projects: Vec<Project>,
    stats: HashMap<String, ProjectStats>,
    folders: FolderCache,
    galleries: GallerySessions,
    session: Option<TriageSession>,
    triage_keys: GestureEngine<Classification>,
    start_keys: GestureEngine<StartTriage>,
    modifiers: Modifiers,
    /// Review card picked up by the pointer
    held: Option<ImageId>,
    preview: Option<Preview>,
    new_project_name: String,
    banner: Option<String>,
    committing: bool,
}

/// The project and folder a commit was started for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOrigin {
    pub project_id: String,
    pub folder_id: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    KeyPressed(Key, Modifiers),
    KeyReleased(Key),
    ModifiersChanged(Modifiers),
    WindowUnfocused,
    Back,
    DismissBanner,

    NewProjectNameChanged(String),
    CreateProject,
    OpenProject(String),
    DeleteProject(String),
    StatsLoaded(String, Result<ProjectStats, String>),

    SelectTab(usize),
    AddFolder,
    RemoveFolder(String),
    SetFolderMode(String, OutputMode),
    SetLayout(OutputLayout),
    FolderListed(LoadTicket<String>, Result<Vec<Image>, String>),
    FolderThumbnail(LoadTicket<String>, ImageId, Result<PathBuf, String>),
    BrowsePick(usize),
    PreviewLoaded(PathBuf, Result<Vec<u8>, String>),

    StartTriage,
    Classify(Classification),
    JumpTo(usize),
    EnterReview,
    LeaveReview,
    CardPressed(ImageId),
    CardReleased(Classification, usize, ImageId),
    ColumnReleased(Classification),
    Commit,
    Committed(CommitOrigin, Result<CommitSummary, String>),

    OpenGallery(Classification),
    GalleryListed(LoadTicket<GalleryKey>, Result<Vec<OutputImage>, String>),
    GalleryThumbnail(LoadTicket<GalleryKey>, ImageId, Result<PathBuf, String>),
    GalleryPick(usize),
}

impl Toss {
    fn new(settings: Settings, catalog: Catalog) -> (Self, Task<Message>) {
        let cache_dir = media::thumbnail::get_thumbnail_cache_dir().unwrap_or_else(|e| {
            let fallback = std::env::temp_dir().join("toss-thumbnails");
            warn!("{}; caching thumbnails in {}", e, fallback.display());
            fallback
        });

        let mut app = Toss {
            catalog,
            settings,
            store: Arc::new(FsImageStore::new(cache_dir)),
            executor: Arc::new(FsExecutor::new()),
            screen: Screen::Projects,
            projects: Vec::new(),
            stats: HashMap::new(),
            folders: FolderCache::new(),
            galleries: GallerySessions::new(),
            session: None,
            triage_keys: GestureEngine::new(gesture::triage_bindings()),
            start_keys: GestureEngine::new(gesture::start_bindings()),
            modifiers: Modifiers::NONE,
            held: None,
            preview: None,
            new_project_name: String::new(),
            banner: None,
            committing: false,
        };

        app.reload_projects();
        info!("Toss started with {} projects", app.projects.len());

        let task = Task::batch(app.projects.iter().map(stats_task));
        (app, task)
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::KeyPressed(key, modifiers) => self.on_key_pressed(key, modifiers),
            Message::KeyReleased(key) => self.on_key_released(key),
            Message::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers;
                Task::none()
            }
            Message::WindowUnfocused => {
                // A held gesture never commits after losing focus
                let triage = self.triage_keys.blur();
                let start = self.start_keys.blur();
                if triage.is_some() || start.is_some() {
                    debug!("Gesture cancelled by window blur");
                }
                self.held = None;
                Task::none()
            }
            Message::Back => self.go_back(),
            Message::DismissBanner => {
                self.banner = None;
                Task::none()
            }

            Message::NewProjectNameChanged(name) => {
                self.new_project_name = name;
                Task::none()
            }
            Message::CreateProject => self.create_project(),
            Message::OpenProject(project_id) => self.open_tab(&project_id, 0),
            Message::DeleteProject(project_id) => {
                if let Err(e) = self.catalog.delete_project(&project_id) {
                    self.report(format!("Failed to remove project: {}", e));
                }
                self.stats.remove(&project_id);
                self.galleries.invalidate_project(&project_id);
                self.reload_projects();
                Task::none()
            }
            Message::StatsLoaded(project_id, result) => {
                match result {
                    Ok(stats) => {
                        self.stats.insert(project_id, stats);
                    }
                    Err(e) => warn!("Failed to count outputs of project {}: {}", project_id, e),
                }
                Task::none()
            }

            Message::SelectTab(tab) => match &self.screen {
                Screen::Project { project_id, .. } => {
                    let project_id = project_id.clone();
                    self.open_tab(&project_id, tab)
                }
                _ => Task::none(),
            },
            Message::AddFolder => self.add_folder(),
            Message::RemoveFolder(folder_id) => {
                let Some(project_id) = self.current_project_id() else {
                    return Task::none();
                };
                if let Err(e) = self.catalog.remove_folder(&project_id, &folder_id) {
                    self.report(format!("Failed to remove folder: {}", e));
                }
                self.folders.invalidate(&folder_id);
                self.galleries.invalidate_project(&project_id);
                self.reload_projects();
                self.refresh_project(&project_id)
            }
            Message::SetFolderMode(folder_id, mode) => {
                if let Err(e) = self.catalog.set_folder_output_mode(&folder_id, mode) {
                    self.report(format!("Failed to change output mode: {}", e));
                }
                self.reload_projects();
                Task::none()
            }
            Message::SetLayout(layout) => {
                let Some(project_id) = self.current_project_id() else {
                    return Task::none();
                };
                if let Err(e) = self.catalog.set_output_layout(&project_id, layout) {
                    self.report(format!("Failed to change output layout: {}", e));
                }
                self.galleries.invalidate_project(&project_id);
                self.reload_projects();
                self.refresh_project(&project_id)
            }
            Message::FolderListed(ticket, result) => self.on_folder_listed(ticket, result),
            Message::FolderThumbnail(ticket, image_id, result) => {
                match result {
                    Ok(path) => {
                        if self.folders.apply_thumbnail(&ticket, &image_id, path.clone()) {
                            if let Some(session) = self.session.as_mut() {
                                if session.folder().id == ticket.key {
                                    session.set_thumbnail(&image_id, path);
                                }
                            }
                        }
                    }
                    Err(e) => warn!("Thumbnail failed: {}", e),
                }
                Task::none()
            }
            Message::BrowsePick(index) => {
                if let Some(folder) = self.current_folder() {
                    self.folders.select(&folder.id, index);
                }
                self.preview_browse()
            }
            Message::PreviewLoaded(path, result) => {
                if let Some(preview) = self.preview.as_mut().filter(|p| p.path == path) {
                    match result {
                        Ok(bytes) => preview.handle = Some(image::Handle::from_bytes(bytes)),
                        Err(e) => warn!("Failed to load {}: {}", path.display(), e),
                    }
                }
                Task::none()
            }

            Message::StartTriage => self.start_triage(),
            Message::Classify(bucket) => self.classify(bucket),
            Message::JumpTo(index) => {
                if let Some(session) = self.session.as_mut() {
                    session.jump_to(index);
                }
                self.preview_current()
            }
            Message::EnterReview => {
                if let Some(session) = self.session.as_mut() {
                    session.enter_review();
                }
                Task::none()
            }
            Message::LeaveReview => {
                if self.committing {
                    return Task::none();
                }
                if let Some(session) = self.session.as_mut() {
                    session.leave_review();
                }
                self.held = None;
                self.preview_current()
            }
            Message::CardPressed(id) => {
                self.held = Some(id);
                Task::none()
            }
            Message::CardReleased(bucket, index, target) => {
                let held = self.held.take();
                if self.committing {
                    return Task::none();
                }
                if let Some(session) = self.session.as_mut() {
                    match held {
                        Some(id) if id == target => session.click(id, self.modifiers.command),
                        Some(id) => session.drop_on(&id, bucket, Some(index)),
                        None => {}
                    }
                }
                Task::none()
            }
            Message::ColumnReleased(bucket) => {
                let held = self.held.take();
                if self.committing {
                    return Task::none();
                }
                if let (Some(id), Some(session)) = (held, self.session.as_mut()) {
                    session.drop_on(&id, bucket, None);
                }
                Task::none()
            }
            Message::Commit => self.commit(),
            Message::Committed(origin, result) => self.on_committed(origin, result),

            Message::OpenGallery(bucket) => self.open_gallery(bucket),
            Message::GalleryListed(ticket, result) => self.on_gallery_listed(ticket, result),
            Message::GalleryThumbnail(ticket, image_id, result) => {
                match result {
                    Ok(path) => {
                        self.galleries.apply_thumbnail(&ticket, &image_id, path);
                    }
                    Err(e) => warn!("Thumbnail failed: {}", e),
                }
                Task::none()
            }
            Message::GalleryPick(index) => {
                if let Screen::Gallery { project_id, bucket } = &self.screen {
                    self.galleries.select(project_id, *bucket, index);
                }
                self.preview_gallery()
            }
        }
    }

    fn on_key_pressed(&mut self, key: Key, modifiers: Modifiers) -> Task<Message> {
        if key == Key::Escape {
            return self.go_back();
        }

        match self.screen.clone() {
            Screen::Projects => Task::none(),
            Screen::Project { project_id, tab } => {
                if modifiers.command {
                    if let Some(n) = ui::keys::digit(key) {
                        self.start_keys.blur();
                        return self.open_tab(&project_id, n - 1);
                    }
                }
                if tab == 0 {
                    return Task::none();
                }
                // Shift+Enter arms the start gesture; any other key cancels it
                if let Some(signal) = self.start_keys.key_down(key, modifiers) {
                    debug!("Start gesture: {:?}", signal);
                    return Task::none();
                }
                let Some(folder) = self.current_folder() else {
                    return Task::none();
                };
                match key {
                    Key::ArrowLeft => self.folders.step(&folder.id, Direction::Back),
                    Key::ArrowRight => self.folders.step(&folder.id, Direction::Forward),
                    _ => return Task::none(),
                }
                self.preview_browse()
            }
            Screen::Triage { .. } => self.on_triage_key(key, modifiers),
            Screen::Summary { .. } => {
                if key == Key::Enter {
                    return self.go_back();
                }
                Task::none()
            }
            Screen::Gallery { project_id, bucket } => {
                match key {
                    Key::ArrowLeft => self.galleries.step(&project_id, bucket, Direction::Back),
                    Key::ArrowRight => self.galleries.step(&project_id, bucket, Direction::Forward),
                    _ => return Task::none(),
                }
                self.preview_gallery()
            }
        }
    }

    fn on_triage_key(&mut self, key: Key, modifiers: Modifiers) -> Task<Message> {
        if self.committing {
            debug!("Ignoring {:?} while a commit is running", key);
            return Task::none();
        }
        let Some(session) = self.session.as_mut() else {
            return Task::none();
        };

        match session.phase() {
            Phase::Classify => {
                if let Some(signal) = self.triage_keys.key_down(key, modifiers) {
                    debug!("Triage gesture: {:?}", signal);
                    return Task::none();
                }
                match key {
                    Key::Backspace => session.unclassify(),
                    Key::ArrowLeft => session.step_back(),
                    Key::ArrowRight => session.step_forward(),
                    Key::Enter => {
                        session.enter_review();
                    }
                    _ => return Task::none(),
                }
                self.preview_current()
            }
            Phase::Review => {
                match ReviewCommand::from_key(key, modifiers) {
                    Some(command) => {
                        session.review(command);
                    }
                    None => debug!("Review ignored {:?}", key),
                }
                Task::none()
            }
        }
    }

    fn on_key_released(&mut self, key: Key) -> Task<Message> {
        match self.screen {
            Screen::Project { .. } => match self.start_keys.key_up(key) {
                Some(Signal::Commit(StartTriage)) => self.start_triage(),
                _ => Task::none(),
            },
            Screen::Triage { .. } => match self.triage_keys.key_up(key) {
                Some(Signal::Commit(bucket)) => self.classify(bucket),
                _ => Task::none(),
            },
            _ => Task::none(),
        }
    }

    fn go_back(&mut self) -> Task<Message> {
        // The session has to outlive its commit
        if self.committing && matches!(self.screen, Screen::Triage { .. }) {
            debug!("Back ignored while a commit is running");
            return Task::none();
        }
        self.triage_keys.blur();
        self.start_keys.blur();
        self.held = None;

        match self.screen.clone() {
            Screen::Projects => Task::none(),
            Screen::Project { .. } => {
                self.screen = Screen::Projects;
                self.preview = None;
                Task::batch(self.projects.iter().map(stats_task))
            }
            Screen::Triage { project_id } => {
                let Some(session) = self.session.as_mut() else {
                    return self.open_tab(&project_id, 0);
                };
                if session.phase() == Phase::Review {
                    session.leave_review();
                    return self.preview_current();
                }

                let folder_id = session.folder().id.clone();
                info!("Triage session for {} discarded", session.folder().source_path.display());
                self.session = None;

                let tab = self
                    .project(&project_id)
                    .and_then(|project| project.folders.iter().position(|f| f.id == folder_id))
                    .map_or(0, |index| index + 1);
                self.open_tab(&project_id, tab)
            }
            Screen::Summary { project_id, .. } | Screen::Gallery { project_id, .. } => {
                self.open_tab(&project_id, 0)
            }
        }
    }

    fn create_project(&mut self) -> Task<Message> {
        let name = self.new_project_name.trim().to_string();
        if name.is_empty() {
            return Task::none();
        }

        let Some(parent) = FileDialog::new()
            .set_title("Choose where to create the project")
            .pick_folder()
        else {
            return Task::none();
        };

        match self
            .catalog
            .create_project(&name, &parent, self.settings.default_output_layout)
        {
            Ok(project) => {
                self.new_project_name.clear();
                self.reload_projects();
                self.open_tab(&project.id, 0)
            }
            Err(e) => {
                self.report(format!("Failed to create project: {}", e));
                Task::none()
            }
        }
    }

    fn add_folder(&mut self) -> Task<Message> {
        let Some(project_id) = self.current_project_id() else {
            return Task::none();
        };

        let Some(source) = FileDialog::new()
            .set_title("Select a folder of images")
            .pick_folder()
        else {
            return Task::none();
        };

        if let Err(e) = self
            .catalog
            .add_folder(&project_id, &source, self.settings.default_output_mode)
        {
            self.report(format!("Failed to add folder: {}", e));
            return Task::none();
        }

        self.reload_projects();
        self.refresh_project(&project_id)
    }

    /// Switch to a project tab, loading the folder listing if needed
    fn open_tab(&mut self, project_id: &str, tab: usize) -> Task<Message> {
        let Some(project) = self.project(project_id).cloned() else {
            return Task::none();
        };

        let tab = if tab > project.folders.len() { 0 } else { tab };
        self.screen = Screen::Project {
            project_id: project.id.clone(),
            tab,
        };

        let Some(folder) = tab.checked_sub(1).and_then(|index| project.folders.get(index)) else {
            self.preview = None;
            return stats_task(&project);
        };

        if self.folders.needs_load(&folder.id) {
            return self.load_folder(folder);
        }
        self.preview_browse()
    }

    /// Re-read counts and drop stale listings after a project changed
    fn refresh_project(&mut self, project_id: &str) -> Task<Message> {
        let Some(project) = self.project(project_id).cloned() else {
            return Task::none();
        };
        if let Screen::Project { tab, .. } = self.screen {
            if tab > project.folders.len() {
                self.screen = Screen::Project {
                    project_id: project.id.clone(),
                    tab: 0,
                };
            }
        }
        stats_task(&project)
    }

    fn load_folder(&mut self, folder: &Folder) -> Task<Message> {
        let ticket = self.folders.begin_load(&folder.id);
        info!("Loading folder {}", folder.source_path.display());

        Task::perform(
            store::list_images(self.store.clone(), folder.source_path.clone()),
            move |result| Message::FolderListed(ticket.clone(), result.map_err(|e| e.to_string())),
        )
    }

    fn on_folder_listed(
        &mut self,
        ticket: LoadTicket<String>,
        result: Result<Vec<Image>, String>,
    ) -> Task<Message> {
        if let Err(e) = &result {
            error!("Failed to list folder {}: {}", ticket.key, e);
        }
        if !self.folders.finish_load(&ticket, result) {
            return Task::none();
        }

        let size = self.settings.thumbnail_size;
        let thumbnails: Vec<Task<Message>> = self
            .folders
            .get(&ticket.key)
            .map(|entry| {
                entry
                    .images
                    .iter()
                    .map(|image| {
                        let ticket = ticket.clone();
                        let id = image.id.clone();
                        Task::perform(
                            store::load_thumbnail(self.store.clone(), image.path.clone(), size),
                            move |result| {
                                Message::FolderThumbnail(
                                    ticket.clone(),
                                    id.clone(),
                                    result.map_err(|e| e.to_string()),
                                )
                            },
                        )
                    })
                    .collect()
            })
            .unwrap_or_default();

        let showing = self.current_folder().is_some_and(|folder| folder.id == ticket.key);
        let preview = if showing {
            self.preview_browse()
        } else {
            Task::none()
        };
        Task::batch([Task::batch(thumbnails), preview])
    }

    fn start_triage(&mut self) -> Task<Message> {
        if self.committing {
            debug!("Start ignored while a commit is running");
            return Task::none();
        }
        let Screen::Project { project_id, tab } = self.screen.clone() else {
            return Task::none();
        };
        let Some(project) = self.project(&project_id).cloned() else {
            return Task::none();
        };
        let Some(folder) = tab.checked_sub(1).and_then(|index| project.folders.get(index)) else {
            return Task::none();
        };

        let images = match self.folders.get(&folder.id) {
            Some(entry) if entry.status.is_ready() => entry.images.clone(),
            _ => {
                debug!("Start ignored: folder {} not loaded", folder.id);
                return Task::none();
            }
        };
        if images.is_empty() {
            return Task::none();
        }

        self.triage_keys.blur();
        self.session = Some(TriageSession::new(
            project.path.clone(),
            project.output_layout,
            folder.clone(),
            images,
        ));
        self.screen = Screen::Triage { project_id };
        self.preview_current()
    }

    fn classify(&mut self, bucket: Classification) -> Task<Message> {
        match self.session.as_mut() {
            Some(session) if session.phase() == Phase::Classify => session.classify(bucket),
            _ => return Task::none(),
        }
        self.preview_current()
    }

    fn commit(&mut self) -> Task<Message> {
        if self.committing {
            return Task::none();
        }
        let Some(session) = &self.session else {
            return Task::none();
        };
        if session.ledger().is_empty() {
            return Task::none();
        }

        let Some(project_id) = self.current_project_id() else {
            return Task::none();
        };
        let origin = CommitOrigin {
            project_id,
            folder_id: session.folder().id.clone(),
        };

        self.committing = true;
        self.banner = None;
        Task::perform(
            triage::commit::commit(self.executor.clone(), session.plan()),
            move |result| Message::Committed(origin.clone(), result.map_err(|e| e.to_string())),
        )
    }

    fn on_committed(
        &mut self,
        origin: CommitOrigin,
        result: Result<CommitSummary, String>,
    ) -> Task<Message> {
        self.committing = false;

        let summary = match result {
            Ok(summary) => summary,
            Err(e) => {
                // Session stays as it is so the user can retry
                self.report(format!("Commit failed: {}", e));
                return Task::none();
            }
        };

        // Outputs changed on disk whether or not the session is still open
        self.folders.invalidate(&origin.folder_id);
        self.galleries.invalidate_project(&origin.project_id);
        let task = self.project(&origin.project_id).map_or_else(Task::none, stats_task);

        let owned = self
            .session
            .as_ref()
            .is_some_and(|session| session.folder().id == origin.folder_id);
        if !owned {
            info!("Commit for folder {} finished after its session closed", origin.folder_id);
            return task;
        }
        let Some(session) = self.session.take() else {
            return task;
        };

        self.preview = None;
        self.held = None;
        self.screen = Screen::Summary {
            project_id: origin.project_id,
            folder_name: session.folder().name(),
            summary,
        };
        task
    }

    fn open_gallery(&mut self, bucket: Classification) -> Task<Message> {
        let Some(project_id) = self.current_project_id() else {
            return Task::none();
        };
        let Some(project) = self.project(&project_id).cloned() else {
            return Task::none();
        };

        self.screen = Screen::Gallery {
            project_id: project_id.clone(),
            bucket,
        };

        if !self.galleries.needs_load(&project_id, bucket) {
            return self.preview_gallery();
        }

        let ticket = self.galleries.begin_load(&project_id, bucket);
        Task::perform(
            store::list_outputs(self.store.clone(), project, bucket),
            move |result| Message::GalleryListed(ticket.clone(), result.map_err(|e| e.to_string())),
        )
    }

    fn on_gallery_listed(
        &mut self,
        ticket: LoadTicket<GalleryKey>,
        result: Result<Vec<OutputImage>, String>,
    ) -> Task<Message> {
        if let Err(e) = &result {
            error!("Failed to list {} outputs: {}", ticket.key.1.label(), e);
        }
        if !self.galleries.finish_load(&ticket, result) {
            return Task::none();
        }

        let size = self.settings.gallery_thumbnail_size;
        let (project_id, bucket) = ticket.key.clone();
        let thumbnails: Vec<Task<Message>> = self
            .galleries
            .get(&project_id, bucket)
            .map(|entry| {
                entry
                    .images
                    .iter()
                    .map(|output| {
                        let ticket = ticket.clone();
                        let id = output.image.id.clone();
                        Task::perform(
                            store::load_thumbnail(
                                self.store.clone(),
                                output.image.path.clone(),
                                size,
                            ),
                            move |result| {
                                Message::GalleryThumbnail(
                                    ticket.clone(),
                                    id.clone(),
                                    result.map_err(|e| e.to_string()),
                                )
                            },
                        )
                    })
                    .collect()
            })
            .unwrap_or_default();

        let preview = self.preview_gallery();
        Task::batch([Task::batch(thumbnails), preview])
    }

    /// Load the full-size image for `path` unless it is already shown
    fn request_preview(&mut self, path: Option<PathBuf>) -> Task<Message> {
        let Some(path) = path else {
            self.preview = None;
            return Task::none();
        };
        if self.preview.as_ref().is_some_and(|p| p.path == path) {
            return Task::none();
        }

        self.preview = Some(Preview {
            path: path.clone(),
            handle: None,
        });
        Task::perform(
            store::load_full_image(self.store.clone(), path.clone()),
            move |result| Message::PreviewLoaded(path.clone(), result.map_err(|e| e.to_string())),
        )
    }

    fn preview_current(&mut self) -> Task<Message> {
        let path = self
            .session
            .as_ref()
            .filter(|session| session.phase() == Phase::Classify)
            .and_then(|session| session.current())
            .map(|image| image.path.clone());
        self.request_preview(path)
    }

    fn preview_browse(&mut self) -> Task<Message> {
        let path = self
            .current_folder()
            .and_then(|folder| self.folders.get(&folder.id))
            .and_then(|entry| entry.selected_image())
            .map(|image| image.path.clone());
        self.request_preview(path)
    }

    fn preview_gallery(&mut self) -> Task<Message> {
        let path = match &self.screen {
            Screen::Gallery { project_id, bucket } => self
                .galleries
                .get(project_id, *bucket)
                .and_then(|entry| entry.selected_image())
                .map(|output| output.image.path.clone()),
            _ => None,
        };
        self.request_preview(path)
    }

    fn reload_projects(&mut self) {
        match self.catalog.list_projects() {
            Ok(projects) => self.projects = projects,
            Err(e) => self.report(format!("Failed to read projects: {}", e)),
        }
    }

    fn report(&mut self, message: String) {
        error!("{}", message);
        self.banner = Some(message);
    }

    fn project(&self, project_id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == project_id)
    }

    fn current_project_id(&self) -> Option<String> {
        match &self.screen {
            Screen::Projects => None,
            Screen::Project { project_id, .. }
            | Screen::Triage { project_id }
            | Screen::Summary { project_id, .. }
            | Screen::Gallery { project_id, .. } => Some(project_id.clone()),
        }
    }

    /// Folder of the active project tab
    fn current_folder(&self) -> Option<Folder> {
        let Screen::Project { project_id, tab } = &self.screen else {
            return None;
        };
        self.project(project_id)?
            .folders
            .get(tab.checked_sub(1)?)
            .cloned()
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let body: Element<Message> = match &self.screen {
            Screen::Projects => {
                ui::projects::view(&self.projects, &self.stats, &self.new_project_name)
            }
            Screen::Project { project_id, tab } => match self.project(project_id) {
                Some(project) => ui::project::view(
                    project,
                    *tab,
                    self.stats.get(project_id),
                    &self.folders,
                    self.preview.as_ref(),
                    self.start_keys.pressed().is_some(),
                ),
                None => text("Project not found").into(),
            },
            Screen::Triage { .. } => match &self.session {
                Some(session) if session.phase() == Phase::Review => {
                    ui::review::view(session, self.held.as_ref(), self.committing)
                }
                Some(session) => {
                    ui::triage::view(session, self.triage_keys.pressed(), self.preview.as_ref())
                }
                None => text("No triage session").into(),
            },
            Screen::Summary {
                folder_name,
                summary,
                ..
            } => ui::summary::view(folder_name, summary),
            Screen::Gallery { project_id, bucket } => match self.project(project_id) {
                Some(project) => ui::gallery::view(
                    project,
                    *bucket,
                    self.galleries.get(project_id, *bucket),
                    self.preview.as_ref(),
                ),
                None => text("Project not found").into(),
            },
        };

        let content = match &self.banner {
            Some(message) => column![ui::widgets::banner(message), body],
            None => column![body],
        };

        container(content.spacing(12))
            .padding(20)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn subscription(&self) -> Subscription<Message> {
        iced::event::listen_with(ui::keys::listen)
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn stats_task(project: &Project) -> Task<Message> {
    let project_id = project.id.clone();
    Task::perform(store::load_project_stats(project.clone()), move |result| {
        Message::StatsLoaded(project_id.clone(), result.map_err(|e| e.to_string()))
    })
}

fn main() -> iced::Result {
    let (settings, config_error) = match Settings::load() {
        Ok(settings) => (settings, None),
        Err(e) => (Settings::default(), Some(e)),
    };

    logging::init_logging(&settings.log_filter);
    if let Some(e) = config_error {
        warn!("Using default settings: {}", e);
    }

    let catalog = match Catalog::new() {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("Failed to open the project catalog: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(path) = catalog.path() {
        info!("Project catalog at {}", path.display());
    }

    iced::application("Toss", Toss::update, Toss::view)
        .subscription(Toss::subscription)
        .theme(Toss::theme)
        .centered()
        .run_with(move || Toss::new(settings, catalog))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    struct Fixture {
        _dir: tempfile::TempDir,
        app: Toss,
        project: Project,
        a: Folder,
        b: Folder,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Catalog::open_in_memory().unwrap();
        let project = catalog
            .create_project("shoot", dir.path(), OutputLayout::PerFolder)
            .unwrap();
        let a = catalog
            .add_folder(&project.id, &dir.path().join("a"), OutputMode::Copy)
            .unwrap();
        let b = catalog
            .add_folder(&project.id, &dir.path().join("b"), OutputMode::Copy)
            .unwrap();
        let (app, _) = Toss::new(Settings::default(), catalog);

        Fixture {
            _dir: dir,
            app,
            project,
            a,
            b,
        }
    }

    fn open_session(fx: &mut Fixture, folder: &Folder) {
        let images = vec![Image::new(folder.source_path.join("1.png"), 10, None)];
        fx.app.session = Some(TriageSession::new(
            fx.project.path.clone(),
            OutputLayout::PerFolder,
            folder.clone(),
            images,
        ));
        fx.app.screen = Screen::Triage {
            project_id: fx.project.id.clone(),
        };
    }

    fn origin(fx: &Fixture, folder: &Folder) -> CommitOrigin {
        CommitOrigin {
            project_id: fx.project.id.clone(),
            folder_id: folder.id.clone(),
        }
    }

    fn summary() -> CommitSummary {
        CommitSummary {
            keep: 1,
            maybe: 0,
            yeet: 0,
            conflicts: Vec::new(),
        }
    }

    fn session_folder(app: &Toss) -> Option<&Path> {
        app.session
            .as_ref()
            .map(|session| session.folder().source_path.as_path())
    }

    #[test]
    fn test_session_cannot_be_left_while_committing() {
        let mut fx = fixture();
        let a = fx.a.clone();
        open_session(&mut fx, &a);

        let _ = fx.app.update(Message::Classify(Classification::Keep));
        let _ = fx.app.update(Message::EnterReview);
        let _ = fx.app.update(Message::Commit);
        assert!(fx.app.committing);

        let _ = fx.app.update(Message::Back);
        let _ = fx.app.update(Message::LeaveReview);
        let _ = fx.app.update(Message::KeyPressed(Key::Escape, Modifiers::NONE));

        assert!(matches!(fx.app.screen, Screen::Triage { .. }));
        assert_eq!(session_folder(&fx.app), Some(a.source_path.as_path()));
        assert_eq!(fx.app.session.as_ref().map(|s| s.phase()), Some(Phase::Review));
    }

    #[test]
    fn test_commit_result_for_another_folder_keeps_current_session() {
        let mut fx = fixture();
        let (a, b) = (fx.a.clone(), fx.b.clone());

        let ticket = fx.app.folders.begin_load(&a.id);
        fx.app.folders.finish_load(&ticket, Ok(Vec::new()));
        assert!(!fx.app.folders.needs_load(&a.id));

        open_session(&mut fx, &b);
        fx.app.committing = true;
        let origin = origin(&fx, &a);
        let _ = fx.app.update(Message::Committed(origin, Ok(summary())));

        assert!(!fx.app.committing);
        assert!(matches!(fx.app.screen, Screen::Triage { .. }));
        assert_eq!(session_folder(&fx.app), Some(b.source_path.as_path()));
        // The committed folder reloads on its next visit
        assert!(fx.app.folders.needs_load(&a.id));
    }

    #[test]
    fn test_commit_result_shows_summary_for_its_session() {
        let mut fx = fixture();
        let a = fx.a.clone();
        open_session(&mut fx, &a);
        fx.app.committing = true;

        let origin = origin(&fx, &a);
        let _ = fx.app.update(Message::Committed(origin, Ok(summary())));

        assert!(fx.app.session.is_none());
        assert!(matches!(
            &fx.app.screen,
            Screen::Summary { folder_name, summary, .. } if folder_name == "a" && summary.keep == 1
        ));
    }

    #[test]
    fn test_failed_commit_keeps_session_for_retry() {
        let mut fx = fixture();
        let a = fx.a.clone();
        open_session(&mut fx, &a);
        fx.app.committing = true;

        let origin = origin(&fx, &a);
        let _ = fx.app.update(Message::Committed(origin, Err("disk full".to_string())));

        assert!(!fx.app.committing);
        assert_eq!(session_folder(&fx.app), Some(a.source_path.as_path()));
        assert!(fx.app.banner.as_deref().is_some_and(|b| b.contains("disk full")));
    }
}

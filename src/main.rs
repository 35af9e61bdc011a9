use clap::Parser;
use iced::widget::image::Handle;
use iced::widget::{row, stack};
use iced::{event, keyboard, mouse, window, Element, Event, Length, Point, Subscription, Task, Theme};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod gateway;
mod media;
mod state;
mod ui;

use config::{Args, Config};
use error::{FeedbackError, LoadError, MoveError, ThumbnailError, UploadError};
use gateway::Gateway;
use media::ThumbnailCache;
use state::data::{ClusterId, DropTarget, ShotId, Snapshot, UploadResult, ViewMode};
use state::drag::{CommitOutcome, DragController, DropOutcome, MoveCommand};
use state::notice::NoticeBoard;
use state::store::{LoadOutcome, LoadTicket, ViewStore};

/// Main application state
struct ShotCurator {
    /// Connection to the classification service
    gateway: Gateway,
    /// Snapshot, view mode and transient UI state
    store: ViewStore,
    /// Current drag gesture
    drag: DragController,
    thumbnails: ThumbnailCache,
    thumbnail_size: u32,
    notices: NoticeBoard,
    /// Last pointer position seen during a drag
    pointer: Option<Point>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    /// User clicked "Refresh"
    Refresh,
    ViewModeSelected(ViewMode),
    SnapshotLoaded(LoadTicket, Result<Snapshot, LoadError>),
    ToggleCluster(ClusterId),
    /// Pointer pressed on a noise shot
    PickUp(ShotId),
    DragEnter(DropTarget),
    DragLeave(DropTarget),
    PointerMoved(Point),
    PointerReleased,
    /// Escape pressed or pointer left the window mid-drag
    DragCancelled,
    MoveFinished(MoveCommand, Result<(), MoveError>),
    FeedbackLogged(Result<(), FeedbackError>),
    UploadRequested,
    UploadFilePicked(Option<PathBuf>),
    UploadFinished(Result<UploadResult, UploadError>),
    ThumbnailLoaded(String, Result<Handle, ThumbnailError>),
    DismissNotice(u64),
}

impl ShotCurator {
    /// Create the application and kick off the first load
    fn new(config: Config, gateway: Gateway) -> (Self, Task<Message>) {
        let mut app = ShotCurator {
            gateway,
            store: ViewStore::new(config.initial_view),
            drag: DragController::new(config.send_feedback),
            thumbnails: ThumbnailCache::new(),
            thumbnail_size: config.thumbnail_size,
            notices: NoticeBoard::new(config.notice_limit),
            pointer: None,
        };

        let task = app.reload();
        (app, task)
    }

    /// Start a load cycle; a later call supersedes this one
    fn reload(&mut self) -> Task<Message> {
        let ticket = self.store.begin_load();
        let gateway = self.gateway.clone();

        Task::perform(
            async move { gateway.load_snapshot(ticket.mode).await },
            move |result| Message::SnapshotLoaded(ticket, result),
        )
    }

    /// Request thumbnails the surfaces are about to draw
    fn fetch_thumbnails(&mut self) -> Task<Message> {
        let paths = self.thumbnails.claim_missing(self.store.keyframes_in_view());
        if paths.is_empty() {
            return Task::none();
        }
        debug!(count = paths.len(), "Fetching thumbnails");

        let size = self.thumbnail_size;
        Task::batch(paths.into_iter().map(|path| {
            let gateway = self.gateway.clone();
            let key = path.clone();
            Task::perform(media::thumbnail::load_thumbnail(gateway, path, size), move |result| {
                Message::ThumbnailLoaded(key.clone(), result)
            })
        }))
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Refresh => {
                if self.store.is_loading() {
                    return Task::none();
                }
                self.thumbnails.clear_failed();
                self.reload()
            }
            Message::ViewModeSelected(mode) => {
                if self.store.set_view_mode(mode) {
                    info!(mode = %mode, "View mode changed");
                    self.reload()
                } else {
                    Task::none()
                }
            }
            Message::SnapshotLoaded(ticket, result) => match self.store.finish_load(ticket, result) {
                LoadOutcome::Applied => {
                    self.thumbnails.retain_paths(self.store.snapshot().keyframe_paths());
                    self.fetch_thumbnails()
                }
                LoadOutcome::Failed(err) => {
                    self.notices.error(&err);
                    Task::none()
                }
                LoadOutcome::Stale => Task::none(),
            },
            Message::ToggleCluster(cluster_id) => {
                self.store.toggle_expanded(&cluster_id);
                self.fetch_thumbnails()
            }
            Message::PickUp(shot_id) => {
                if self.drag.pick_up(&mut self.store, &shot_id) {
                    self.pointer = None;
                }
                Task::none()
            }
            Message::DragEnter(target) => {
                self.drag.enter(target);
                Task::none()
            }
            Message::DragLeave(target) => {
                self.drag.leave(&target);
                Task::none()
            }
            Message::PointerMoved(position) => {
                if self.drag.is_dragging() {
                    self.pointer = Some(position);
                }
                Task::none()
            }
            Message::PointerReleased => {
                self.pointer = None;
                match self.drag.drop(&mut self.store) {
                    DropOutcome::Ignored | DropOutcome::Cancelled => Task::none(),
                    DropOutcome::Rejected(err) => {
                        self.notices.error(&err);
                        Task::none()
                    }
                    DropOutcome::Commit(command) => {
                        let gateway = self.gateway.clone();
                        let sent = command.clone();
                        Task::perform(
                            async move { gateway.move_to_cluster(&command).await },
                            move |result| Message::MoveFinished(sent.clone(), result),
                        )
                    }
                }
            }
            Message::DragCancelled => {
                self.pointer = None;
                self.drag.cancel(&mut self.store);
                Task::none()
            }
            Message::MoveFinished(command, result) => match self.drag.finish_commit(&self.store, &command, result) {
                CommitOutcome::Resync { mode, feedback } => {
                    debug!(mode = %mode, "Resyncing after move");
                    let reload = self.reload();
                    match feedback {
                        Some(feedback) => {
                            let gateway = self.gateway.clone();
                            let log = Task::perform(
                                async move { gateway.submit_feedback(&feedback).await },
                                Message::FeedbackLogged,
                            );
                            Task::batch([reload, log])
                        }
                        None => reload,
                    }
                }
                CommitOutcome::Failed(err) => {
                    self.notices.error(&err);
                    Task::none()
                }
                CommitOutcome::Ignored => Task::none(),
            },
            Message::FeedbackLogged(result) => {
                // Best effort: never surfaced, never rolls anything back
                if let Err(err) = result {
                    warn!(error = %err, "Feedback signal lost");
                }
                Task::none()
            }
            Message::UploadRequested => {
                if !self.store.begin_upload() {
                    return Task::none();
                }
                Task::perform(pick_video(), Message::UploadFilePicked)
            }
            Message::UploadFilePicked(None) => {
                self.store.finish_upload();
                Task::none()
            }
            Message::UploadFilePicked(Some(path)) => {
                let gateway = self.gateway.clone();
                Task::perform(
                    async move { gateway.upload_asset(&path).await },
                    Message::UploadFinished,
                )
            }
            Message::UploadFinished(result) => {
                self.store.finish_upload();
                match result {
                    Ok(report) => {
                        for shot in &report.shots {
                            debug!(
                                shot_id = %shot.shot_id,
                                cluster_type = ?shot.cluster_type,
                                cluster_id = ?shot.cluster_id,
                                similarity = ?shot.similarity_score,
                                "Ingested shot"
                            );
                        }
                        let unassigned = report.shots.iter().filter(|s| s.cluster_id.is_none()).count();
                        info!(
                            file = %report.filename,
                            shots = report.shots_processed,
                            clusters = report.clusters.len(),
                            "Upload processed"
                        );
                        self.notices.info(format!(
                            "Processed {} shots from {} ({} unassigned)",
                            report.shots_processed, report.filename, unassigned
                        ));
                        self.reload()
                    }
                    Err(err) => {
                        self.notices.error(&err);
                        Task::none()
                    }
                }
            }
            Message::ThumbnailLoaded(path, result) => {
                self.thumbnails.complete(path, result);
                Task::none()
            }
            Message::DismissNotice(id) => {
                self.notices.dismiss(id);
                Task::none()
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let layout = row![
            ui::sidebar::view(&self.store, &self.drag, &self.notices),
            ui::gallery::view(&self.store, &self.drag, &self.thumbnails),
            ui::noise::view(&self.store, &self.thumbnails),
        ]
        .height(Length::Fill);

        match ui::overlay::view(self.store.drag_preview(), self.pointer, &self.thumbnails) {
            Some(preview) => stack![layout, preview]
                .width(Length::Fill)
                .height(Length::Fill)
                .into(),
            None => layout.into(),
        }
    }

    /// Releases are always listened for, so one arriving right after the
    /// press that started a drag is not lost. Movement and cancellation
    /// only matter while a shot is being dragged.
    fn subscription(&self) -> Subscription<Message> {
        let release = event::listen_with(release_event);
        if self.drag.is_dragging() {
            Subscription::batch([release, event::listen_with(drag_event)])
        } else {
            release
        }
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn release_event(event: Event, _status: event::Status, _window: window::Id) -> Option<Message> {
    match event {
        Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
            Some(Message::PointerReleased)
        }
        _ => None,
    }
}

fn drag_event(event: Event, _status: event::Status, _window: window::Id) -> Option<Message> {
    match event {
        Event::Mouse(mouse::Event::CursorMoved { position }) => Some(Message::PointerMoved(position)),
        Event::Mouse(mouse::Event::CursorLeft) => Some(Message::DragCancelled),
        Event::Keyboard(keyboard::Event::KeyPressed {
            key: keyboard::Key::Named(keyboard::key::Named::Escape),
            ..
        }) => Some(Message::DragCancelled),
        _ => None,
    }
}

/// Native picker for the video to upload
async fn pick_video() -> Option<PathBuf> {
    rfd::AsyncFileDialog::new()
        .set_title("Select a video to upload")
        .add_filter("Video", &["mp4", "mov", "mkv", "avi", "webm", "m4v"])
        .pick_file()
        .await
        .map(|file| file.path().to_path_buf())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shot_curator=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::try_from(Args::parse())?;
    let gateway = Gateway::new(config.service_url.clone())?;

    info!(
        service = %gateway.base(),
        view = %config.initial_view,
        feedback = config.send_feedback,
        "Starting Shot Curator"
    );

    iced::application("Shot Curator", ShotCurator::update, ShotCurator::view)
        .subscription(ShotCurator::subscription)
        .theme(ShotCurator::theme)
        .window_size((1440.0, 900.0))
        .centered()
        .run_with(move || ShotCurator::new(config, gateway))?;

    Ok(())
}

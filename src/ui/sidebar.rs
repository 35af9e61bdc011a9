use iced::widget::{button, column, container, row, text, Column};
use iced::{Alignment, Element, Length};

use crate::state::data::{DropTarget, ViewMode};
use crate::state::drag::{DragController, DragPhase};
use crate::state::notice::{NoticeBoard, NoticeLevel};
use crate::state::store::ViewStore;
use crate::Message;

const SIDEBAR_WIDTH: f32 = 280.0;

/// Control panel: upload, view mode, refresh, gesture status, notices
pub fn view<'a>(
    store: &'a ViewStore,
    drag: &'a DragController,
    notices: &'a NoticeBoard,
) -> Element<'a, Message> {
    let title = column![
        text("Shot Curator").size(26),
        text("Clustered shot review").size(13),
    ]
    .spacing(4);

    let uploading = store.is_uploading();
    let upload = section(
        "UPLOAD",
        button(text(if uploading { "Uploading..." } else { "Upload Video" }))
            .width(Length::Fill)
            .padding(10)
            .style(button::primary)
            .on_press_maybe((!uploading).then_some(Message::UploadRequested))
            .into(),
    );

    let modes = Column::with_children(ViewMode::ALL.iter().map(|&mode| {
        let style = if store.view_mode() == mode {
            button::primary
        } else {
            button::secondary
        };
        button(text(mode.label()))
            .width(Length::Fill)
            .padding(10)
            .style(style)
            .on_press(Message::ViewModeSelected(mode))
            .into()
    }))
    .spacing(8);
    let view_mode = section("VIEW MODE", modes.into());

    let loading = store.is_loading();
    let refresh = button(text(if loading { "Refreshing..." } else { "Refresh" }))
        .width(Length::Fill)
        .padding(10)
        .style(button::secondary)
        .on_press_maybe((!loading).then_some(Message::Refresh));

    let content = column![
        title,
        upload,
        view_mode,
        refresh,
        text(gesture_status(drag)).size(12),
        notice_list(notices),
    ]
    .spacing(24)
    .padding(20);

    container(content)
        .width(Length::Fixed(SIDEBAR_WIDTH))
        .height(Length::Fill)
        .style(container::bordered_box)
        .into()
}

fn section<'a>(label: &'a str, body: Element<'a, Message>) -> Element<'a, Message> {
    column![text(label).size(12), body].spacing(10).into()
}

fn gesture_status(drag: &DragController) -> String {
    match drag.phase() {
        DragPhase::Dragging { shot_id, hover } => match hover {
            Some(DropTarget::Cluster(id)) => format!("Drop {} into {}", shot_id, id),
            Some(DropTarget::NoisePool) | None => format!("Dragging {}", shot_id),
        },
        DragPhase::Idle => match drag.pending() {
            [] => "Drag from the noise bucket onto a cluster".to_string(),
            [only] => format!("Moving {} to {}...", only.shot_id, only.target_cluster_id),
            many => format!("Moving {} shots...", many.len()),
        },
    }
}

fn notice_list(notices: &NoticeBoard) -> Element<'_, Message> {
    if notices.is_empty() {
        return text("No notifications").size(11).into();
    }
    Column::with_children(notices.iter().map(|notice| {
        let message = text(notice.message.as_str()).size(12);
        let message = match notice.level {
            NoticeLevel::Error => message.style(text::danger),
            NoticeLevel::Info => message,
        };
        row![
            column![text(notice.at.format("%H:%M:%S").to_string()).size(10), message]
                .spacing(2)
                .width(Length::Fill),
            button(text("×").size(12))
                .style(button::text)
                .on_press(Message::DismissNotice(notice.id)),
        ]
        .spacing(6)
        .align_y(Alignment::Start)
        .into()
    }))
    .spacing(8)
    .into()
}

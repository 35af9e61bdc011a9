use iced::widget::{column, container, mouse_area, scrollable, text, Column};
use iced::{mouse, Alignment, Element, Length};

use crate::media::ThumbnailCache;
use crate::state::data::{DropTarget, NoiseItem};
use crate::state::store::ViewStore;
use crate::Message;

const PANEL_WIDTH: f32 = 320.0;

/// Noise pool panel; every shot in it is a drag source
pub fn view<'a>(store: &'a ViewStore, thumbnails: &'a ThumbnailCache) -> Element<'a, Message> {
    let pool = &store.snapshot().noise_pool;
    let dragged = store.drag_preview().map(|n| n.shot_id.as_str());

    let header = column![
        text("Noise Bucket").size(22),
        text("Unclassified shots").size(13),
        text(pool.len().to_string()).size(28),
    ]
    .spacing(4);

    let body: Element<'a, Message> = if pool.is_empty() {
        let (title, hint) = if store.is_loading() {
            ("Loading...", "")
        } else {
            ("No noise shots", "All shots are classified")
        };
        column![text(title), text(hint).size(12)]
            .spacing(6)
            .width(Length::Fill)
            .align_x(Alignment::Center)
            .into()
    } else {
        Column::with_children(
            pool.iter()
                .map(|item| noise_card(item, dragged == Some(item.shot_id.as_str()), thumbnails)),
        )
        .spacing(12)
        .into()
    };

    let panel = container(
        column![
            header,
            scrollable(body).height(Length::Fill),
            text("Drag shots onto a cluster to train the classifier").size(12),
        ]
        .spacing(16)
        .padding(20),
    )
    .width(Length::Fixed(PANEL_WIDTH))
    .height(Length::Fill)
    .style(container::bordered_box);

    mouse_area(panel)
        .on_enter(Message::DragEnter(DropTarget::NoisePool))
        .on_exit(Message::DragLeave(DropTarget::NoisePool))
        .into()
}

fn noise_card<'a>(
    item: &'a NoiseItem,
    dragged: bool,
    thumbnails: &'a ThumbnailCache,
) -> Element<'a, Message> {
    let mut card = column![
        super::keyframe(thumbnails, &item.keyframe_path, PANEL_WIDTH - 48.0, 140.0),
        text(item.shot_id.as_str()).size(12),
        text(format!(
            "{} characters · {}-d scene vector",
            item.character_vectors.len(),
            item.scene_vector.len()
        ))
        .size(11),
    ]
    .spacing(4);

    if let Some(timestamp) = &item.timestamp {
        card = card.push(text(super::format_timestamp(timestamp)).size(11));
    }
    if dragged {
        card = card.push(text("Dragging...").size(11));
    }

    mouse_area(container(card).padding(6).style(container::rounded_box))
        .on_press(Message::PickUp(item.shot_id.clone()))
        .interaction(mouse::Interaction::Grab)
        .into()
}

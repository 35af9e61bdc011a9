use iced::widget::{column, container, text};
use iced::{Element, Length, Padding, Point};

use crate::media::ThumbnailCache;
use crate::state::data::NoiseItem;
use crate::Message;

/// Offset from the pointer, so the preview never sits under it
const POINTER_OFFSET: f32 = 14.0;

/// Floating thumbnail of the dragged shot, drawn on top of everything
pub fn view<'a>(
    preview: Option<&'a NoiseItem>,
    pointer: Option<Point>,
    thumbnails: &'a ThumbnailCache,
) -> Option<Element<'a, Message>> {
    let item = preview?;
    let pointer = pointer?;

    let card = container(
        column![
            super::keyframe(thumbnails, &item.keyframe_path, 128.0, 72.0),
            text(item.shot_id.as_str()).size(11),
        ]
        .spacing(2),
    )
    .padding(4)
    .style(container::bordered_box);

    Some(
        container(card)
            .padding(Padding {
                top: pointer.y + POINTER_OFFSET,
                right: 0.0,
                bottom: 0.0,
                left: pointer.x + POINTER_OFFSET,
            })
            .width(Length::Fill)
            .height(Length::Fill)
            .into(),
    )
}

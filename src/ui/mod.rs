//! Presentation surfaces
//!
//! Pure functions of the store snapshot; every interaction comes back as
//! a [`crate::Message`].

pub mod gallery;
pub mod noise;
pub mod overlay;
pub mod sidebar;

use chrono::NaiveDateTime;
use iced::widget::{container, image, text};
use iced::{ContentFit, Element, Length};

use crate::media::cache::{ThumbnailCache, ThumbnailState};
use crate::Message;

/// Keyframe thumbnail, or a placeholder while it is missing
pub fn keyframe<'a>(
    thumbnails: &'a ThumbnailCache,
    path: &str,
    width: f32,
    height: f32,
) -> Element<'a, Message> {
    if let Some(handle) = thumbnails.get(path) {
        return image(handle.clone())
            .width(width)
            .height(height)
            .content_fit(ContentFit::Cover)
            .into();
    }

    let label = match thumbnails.state(path) {
        Some(ThumbnailState::Failed) => "No preview",
        _ => "Loading...",
    };
    container(text(label).size(11))
        .center_x(Length::Fixed(width))
        .center_y(Length::Fixed(height))
        .style(container::rounded_box)
        .into()
}

/// Short local rendering of a service timestamp; unparseable values are
/// shown as they came
pub fn format_timestamp(raw: &str) -> String {
    raw.parse::<NaiveDateTime>()
        .map(|t| t.format("%b %d, %H:%M:%S").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp("2024-05-01T10:03:07.123456"), "May 01, 10:03:07");
        assert_eq!(format_timestamp("yesterday"), "yesterday");
    }
}

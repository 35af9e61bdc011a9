use iced::widget::{button, column, container, horizontal_space, mouse_area, row, scrollable, text, Column};
use iced::{Alignment, Background, Border, Element, Length, Theme};
use iced_aw::Wrap;

use crate::media::ThumbnailCache;
use crate::state::data::{Cluster, DropTarget, Item};
use crate::state::drag::DragController;
use crate::state::store::ViewStore;
use crate::Message;

const CARD_WIDTH: f32 = 176.0;
const CARD_HEIGHT: f32 = 99.0;

/// Cluster tree. Collapsed nodes show id and count only; the shot grid
/// is built for expanded nodes alone.
pub fn view<'a>(
    store: &'a ViewStore,
    drag: &'a DragController,
    thumbnails: &'a ThumbnailCache,
) -> Element<'a, Message> {
    let snapshot = store.snapshot();

    let mut heading = row![
        text(snapshot.mode.label()).size(28),
        text(format!(
            "{} shots in {} clusters",
            snapshot.clustered_count(),
            snapshot.clusters.len()
        ))
        .size(13),
    ]
    .spacing(16)
    .align_y(Alignment::Center);
    if let Some(status) = load_status(store) {
        heading = heading.push(text(status).size(14));
    }

    let body: Element<'a, Message> = if snapshot.clusters.is_empty() {
        column![
            text("No clusters yet").size(18),
            text("Upload a video to get started").size(13),
        ]
        .spacing(8)
        .width(Length::Fill)
        .align_x(Alignment::Center)
        .into()
    } else {
        Column::with_children(
            store
                .visible_clusters()
                .map(|(cluster, expanded)| cluster_node(cluster, expanded, drag, thumbnails)),
        )
        .spacing(12)
        .into()
    };

    container(scrollable(column![heading, body].spacing(24).padding(32)))
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

/// Shown beside the heading while a load is running
fn load_status(store: &ViewStore) -> Option<String> {
    let ticket = store.pending_load()?;
    if ticket.mode == store.snapshot().mode {
        Some("Loading clusters...".to_string())
    } else {
        Some(format!("Switching to {}...", ticket.mode.label()))
    }
}

fn cluster_node<'a>(
    cluster: &'a Cluster,
    expanded: bool,
    drag: &DragController,
    thumbnails: &'a ThumbnailCache,
) -> Element<'a, Message> {
    let target = DropTarget::Cluster(cluster.cluster_id.clone());
    let highlighted = drag.hovered() == Some(&target);

    let header = button(
        row![
            text(if expanded { "▼" } else { "▶" }).size(14),
            text(cluster.cluster_id.as_str()).size(16),
            horizontal_space(),
            text(format!("{} shots", cluster.shots.len())).size(13),
        ]
        .spacing(12)
        .align_y(Alignment::Center),
    )
    .width(Length::Fill)
    .style(button::text)
    .on_press(Message::ToggleCluster(cluster.cluster_id.clone()));

    let mut content = column![header].spacing(12);
    if expanded {
        content = content.push(shot_grid(&cluster.shots, thumbnails));
    }

    let node = container(content)
        .padding(8)
        .width(Length::Fill)
        .style(move |theme: &Theme| node_style(theme, highlighted));

    mouse_area(node)
        .on_enter(Message::DragEnter(target.clone()))
        .on_exit(Message::DragLeave(target))
        .into()
}

fn shot_grid<'a>(shots: &'a [Item], thumbnails: &'a ThumbnailCache) -> Element<'a, Message> {
    let cards = shots.iter().map(|shot| shot_card(shot, thumbnails)).collect();
    Wrap::with_elements(cards)
        .spacing(12.0)
        .line_spacing(12.0)
        .into()
}

fn shot_card<'a>(shot: &'a Item, thumbnails: &'a ThumbnailCache) -> Element<'a, Message> {
    let mut card = column![
        super::keyframe(thumbnails, &shot.keyframe_path, CARD_WIDTH, CARD_HEIGHT),
        text(shot.id.as_str()).size(12),
    ]
    .spacing(4)
    .width(CARD_WIDTH);

    if let Some(similarity) = shot.similarity {
        card = card.push(text(format!("Similarity: {:.1}%", similarity * 100.0)).size(12));
    }
    if let Some(timestamp) = &shot.timestamp {
        card = card.push(text(super::format_timestamp(timestamp)).size(11));
    }
    card.into()
}

fn node_style(theme: &Theme, highlighted: bool) -> container::Style {
    let palette = theme.extended_palette();
    let (color, width) = if highlighted {
        (palette.primary.strong.color, 2.0)
    } else {
        (palette.background.strong.color, 1.0)
    };

    container::Style {
        background: Some(Background::Color(palette.background.weak.color)),
        border: Border {
            color,
            width,
            radius: 8.0.into(),
        },
        ..container::Style::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GatewayError, LoadError};
    use crate::state::data::{Snapshot, ViewMode};

    #[test]
    fn test_load_status_clears_after_failed_switch() {
        let mut store = ViewStore::new(ViewMode::Scene);
        let ticket = store.begin_load();
        assert_eq!(load_status(&store).as_deref(), Some("Loading clusters..."));
        store.finish_load(ticket, Ok(Snapshot::default()));
        assert_eq!(load_status(&store), None);

        store.set_view_mode(ViewMode::Character);
        let ticket = store.begin_load();
        assert_eq!(
            load_status(&store),
            Some(format!("Switching to {}...", ViewMode::Character.label()))
        );

        store.finish_load(ticket, Err(LoadError(GatewayError::Network("refused".to_string()))));
        assert_eq!(load_status(&store), None);
    }
}

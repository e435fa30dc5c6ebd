// SPDX-License-Identifier: GPL-3.0-only

//! Camera preview widget
//!
//! Renders the latest RGBA frame as a full-window image with
//! aspect-preserving fill scaling. Before frames arrive, the preview area
//! shows a themed placeholder describing the discovery state.

use crate::app::state::{AppModel, DiscoveryState, Message};
use crate::backends::camera::types::{BackendError, CameraFrame};
use crate::fl;
use cosmic::Element;
use cosmic::iced::{Background, ContentFit, Length};
use cosmic::widget;

/// Pack a camera frame into an image handle, honoring the row stride.
pub fn frame_to_handle(frame: &CameraFrame) -> widget::image::Handle {
    let width = frame.width as usize;
    let height = frame.height as usize;
    let stride = frame.stride as usize;
    let row_bytes = width * 4;

    let pixels = if stride == row_bytes {
        frame.data.to_vec()
    } else {
        let mut packed = Vec::with_capacity(row_bytes * height);
        for y in 0..height {
            let start = y * stride;
            packed.extend_from_slice(&frame.data[start..start + row_bytes]);
        }
        packed
    };

    widget::image::Handle::from_rgba(frame.width, frame.height, pixels)
}

impl AppModel {
    /// Build the camera preview widget
    pub fn build_camera_preview(&self) -> Element<'_, Message> {
        if let Some(handle) = &self.preview_handle {
            // Aspect-preserving fill: the frame covers the whole window,
            // cropping rather than letterboxing.
            return widget::container(
                widget::image(handle.clone())
                    .content_fit(ContentFit::Cover)
                    .width(Length::Fill)
                    .height(Length::Fill),
            )
            .width(Length::Fill)
            .height(Length::Fill)
            .into();
        }

        let placeholder = match &self.discovery {
            DiscoveryState::Pending => fl!("initializing-camera"),
            DiscoveryState::Ready => fl!("camera-starting"),
            DiscoveryState::Failed(BackendError::PermissionDenied(_)) => {
                fl!("camera-permission-denied")
            }
            DiscoveryState::Failed(_) => fl!("no-camera-found"),
        };

        widget::container(
            widget::column()
                .push(widget::text(placeholder).size(20))
                .spacing(10)
                .align_x(cosmic::iced::alignment::Horizontal::Center),
        )
        .width(Length::Fill)
        .height(Length::Fill)
        .align_x(cosmic::iced::alignment::Horizontal::Center)
        .align_y(cosmic::iced::alignment::Vertical::Center)
        .style(|theme| widget::container::Style {
            background: Some(Background::Color(theme.cosmic().bg_color().into())),
            text_color: Some(theme.cosmic().on_bg_color().into()),
            ..Default::default()
        })
        .into()
    }
}

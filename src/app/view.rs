// SPDX-License-Identifier: GPL-3.0-only

//! Main application view
//!
//! One screen: the live preview fills the window and sits beneath the
//! controls, which are stacked on top (shutter button, status line). When
//! the flash is lit the whole screen goes white instead.

use crate::app::state::{AppModel, Message};
use cosmic::Element;
use cosmic::iced::{Background, Color, Length};
use cosmic::widget;

impl AppModel {
    /// Build the main application view
    pub fn view(&self) -> Element<'_, Message> {
        let camera_preview = self.build_camera_preview();

        // Flash mode - only the preview with a white overlay, no UI
        if self.flash_active {
            let flash_overlay = widget::container(widget::Space::new(Length::Fill, Length::Fill))
                .width(Length::Fill)
                .height(Length::Fill)
                .style(|_theme| widget::container::Style {
                    background: Some(Background::Color(Color::WHITE)),
                    ..Default::default()
                });

            return widget::container(
                cosmic::iced::widget::stack![camera_preview, flash_overlay]
                    .width(Length::Fill)
                    .height(Length::Fill),
            )
            .width(Length::Fill)
            .height(Length::Fill)
            .style(|_theme| widget::container::Style {
                background: Some(Background::Color(Color::BLACK)),
                ..Default::default()
            })
            .into();
        }

        // Controls column pinned to the bottom, over the preview
        let mut controls = widget::column()
            .push(widget::Space::new(Length::Fill, Length::Fill));

        if let Some(status) = &self.status {
            controls = controls.push(
                widget::container(widget::text(status.clone()).size(14))
                    .width(Length::Fill)
                    .center_x(Length::Fill)
                    .padding([4, 12])
                    .style(|_theme| widget::container::Style {
                        text_color: Some(Color::WHITE),
                        background: Some(Background::Color(Color::from_rgba(0.0, 0.0, 0.0, 0.45))),
                        ..Default::default()
                    }),
            );
        }

        controls = controls.push(self.build_capture_button());

        widget::container(
            cosmic::iced::widget::stack![camera_preview, controls]
                .width(Length::Fill)
                .height(Length::Fill),
        )
        .width(Length::Fill)
        .height(Length::Fill)
        .style(|_theme| widget::container::Style {
            background: Some(Background::Color(Color::BLACK)),
            ..Default::default()
        })
        .into()
    }
}

use egui::Context;
use std::cell::RefCell;
use std::rc::Rc;

use crate::device::XrDeviceHandle;
use crate::model::{ControllerAction, KeyMap, OverlayState};

/// Build the complete overlay UI and return egui output. Draw order is the
/// fixed top-to-bottom composition: header, key-map menu (if open), FOV
/// menu (if open), controls hint bar.
pub fn build_ui(
    egui_ctx: &Context,
    raw_input: egui::RawInput,
    overlay: &Rc<RefCell<OverlayState>>,
    device: &Rc<dyn XrDeviceHandle>,
) -> egui::FullOutput {
    egui_ctx.run(raw_input, |ctx| {
        let mut state = overlay.borrow_mut();
        draw_header(ctx, &mut state);
        if state.key_map_open {
            draw_key_map_menu(ctx, &mut state);
        }
        if state.fov_menu_open {
            draw_fov_menu(ctx, device);
        }
        draw_controls(ctx, &state);
    })
}

fn panel_frame() -> egui::Frame {
    egui::Frame::NONE
        .fill(egui::Color32::from_black_alpha(168))
        .inner_margin(6.0)
}

fn display_key(key: &str) -> String {
    match key {
        " " => "Space".to_string(),
        k if k.chars().count() == 1 => k.to_uppercase(),
        k => k.to_string(),
    }
}

fn draw_header(ctx: &Context, state: &mut OverlayState) {
    egui::TopBottomPanel::top("devui_header")
        .frame(panel_frame())
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("XR Dev UI").strong());
                ui.separator();
                if ui.selectable_label(state.key_map_open, "Key Map").clicked() {
                    state.toggle_key_map_menu();
                }
                if ui.selectable_label(state.fov_menu_open, "FOV").clicked() {
                    state.toggle_fov_menu();
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let status = if state.pointer_locked {
                        "Mouse captured — Esc to release"
                    } else {
                        "Click the scene to capture the mouse"
                    };
                    ui.label(egui::RichText::new(status).small());
                });
            });
        });
}

fn draw_key_map_menu(ctx: &Context, state: &mut OverlayState) {
    egui::Window::new("Key Map")
        .anchor(egui::Align2::CENTER_TOP, [0.0, 48.0])
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui| {
            egui::Grid::new("keymap_grid")
                .num_columns(2)
                .spacing([24.0, 4.0])
                .show(ui, |ui| {
                    for action in ControllerAction::ALL {
                        ui.label(egui::RichText::new(action.label()).small());
                        let caption = if state.rebinding == Some(action) {
                            "press a key...".to_string()
                        } else {
                            state
                                .key_map
                                .key_for(action)
                                .map(display_key)
                                .unwrap_or_else(|| "unbound".to_string())
                        };
                        if ui.button(caption).clicked() {
                            state.rebinding = Some(action);
                        }
                        ui.end_row();
                    }
                });
            ui.separator();
            if ui.button("Reset to defaults").clicked() {
                state.key_map = KeyMap::default();
                state.rebinding = None;
            }
        });
}

fn draw_fov_menu(ctx: &Context, device: &Rc<dyn XrDeviceHandle>) {
    egui::Window::new("FOV")
        .anchor(egui::Align2::RIGHT_TOP, [-8.0, 48.0])
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui| {
            let mut fov_deg = device.fov_y().to_degrees().clamp(30.0, 120.0);
            ui.label(egui::RichText::new("Vertical FOV").small());
            if ui
                .add(egui::Slider::new(&mut fov_deg, 30.0..=120.0).step_by(5.0))
                .changed()
            {
                device.set_fov_y(fov_deg.to_radians());
            }
            ui.label(egui::RichText::new("IPD is held at 0 while the overlay is mounted").small());
        });
}

fn draw_controls(ctx: &Context, state: &OverlayState) {
    egui::TopBottomPanel::bottom("devui_controls")
        .frame(panel_frame())
        .show(ctx, |ui| {
            ui.horizontal_wrapped(|ui| {
                for (action, key) in state.key_map.entries() {
                    ui.label(
                        egui::RichText::new(format!("{} {}", display_key(key), action.label()))
                            .small(),
                    );
                    ui.separator();
                }
                let hint = if state.pointer_locked {
                    "Mouse look active"
                } else {
                    "Mouse look off"
                };
                ui.label(egui::RichText::new(hint).small());
            });
        });
}

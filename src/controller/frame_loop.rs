use std::cell::RefCell;
use std::rc::Rc;

use web_sys::Window;
use wgpu::{Device, Surface};

use crate::controller::input::InputLayer;
use crate::controller::lock::{DomLockHub, LockSubscription};
use crate::device::XrDeviceHandle;
use crate::model::OverlayState;
use crate::ui;
use crate::view::RenderState;

/// Per-frame overlay update: expires simulated button presses, tracks the
/// viewport size, feeds egui and hands the tessellated output to the
/// render state.
pub struct OverlayLoop {
    pub overlay: Rc<RefCell<OverlayState>>,
    pub input_layer: Rc<RefCell<InputLayer>>,
    pub device: Rc<dyn XrDeviceHandle>,
    pub egui_ctx: egui::Context,
    pub egui_events: Rc<RefCell<Vec<egui::Event>>>,
    /// Held so the lock listeners live exactly as long as the loop; drop
    /// (hot reload, forced unmount) detaches them symmetrically.
    pub lock_subscription: LockSubscription<DomLockHub>,
}

impl OverlayLoop {
    pub fn update(
        &mut self,
        device: &Device,
        window: &Window,
        surface: &Surface,
        render_state: &mut RenderState,
    ) {
        let now = window.performance().map(|p| p.now()).unwrap_or(0.0);

        // Simulated presses whose window elapsed get released before the
        // next frame is drawn.
        self.input_layer.borrow_mut().update(now);

        self.handle_resize(window, device, surface, render_state);

        // Build egui input from queued events
        let dpr = window.device_pixel_ratio() as f32;
        let mut raw_input = egui::RawInput::default();
        raw_input.time = Some(now / 1000.0);
        raw_input.screen_rect = Some(egui::Rect::from_min_size(
            egui::Pos2::new(0.0, 0.0),
            egui::vec2(
                render_state.width as f32 / dpr,
                render_state.height as f32 / dpr,
            ),
        ));
        raw_input.events.extend(self.egui_events.borrow_mut().drain(..));

        self.egui_ctx.set_pixels_per_point(dpr);

        let mut full_output = ui::build_ui(&self.egui_ctx, raw_input, &self.overlay, &self.device);

        let primitives = self
            .egui_ctx
            .tessellate(std::mem::take(&mut full_output.shapes), dpr);
        render_state.egui_primitives = Some(primitives);
        render_state.egui_full_output = Some(full_output);
        render_state.egui_dpr = dpr;
    }

    fn handle_resize(
        &self,
        window: &Window,
        device: &Device,
        surface: &Surface,
        render_state: &mut RenderState,
    ) {
        if let (Ok(w), Ok(h)) = (window.inner_width(), window.inner_height()) {
            let nw = w.as_f64().unwrap_or(800.0) as u32;
            let nh = h.as_f64().unwrap_or(600.0) as u32;
            if nw != render_state.width || nh != render_state.height {
                render_state.width = nw;
                render_state.height = nh;
                surface.configure(device, &render_state.surface_configuration());
            }
        }
    }
}

use wgpu::{
    Color, CommandEncoderDescriptor, CompositeAlphaMode, Device, LoadOp, Operations, PresentMode,
    Queue, RenderPassColorAttachment, RenderPassDescriptor, StoreOp, Surface,
    SurfaceConfiguration, SurfaceError, TextureFormat, TextureUsages, TextureViewDescriptor,
};

/// Overlay render state. The HUD canvas draws no geometry of its own:
/// every frame is a transparent clear plus one egui pass, composited over
/// the emulator's scene canvas underneath.
pub struct RenderState {
    pub format: TextureFormat,
    pub alpha_mode: CompositeAlphaMode,
    pub width: u32,
    pub height: u32,

    // UI
    pub egui_renderer: egui_wgpu::Renderer,
    pub egui_primitives: Option<Vec<egui::ClippedPrimitive>>,
    pub egui_full_output: Option<egui::FullOutput>,
    pub egui_dpr: f32,
}

impl RenderState {
    pub fn surface_configuration(&self) -> SurfaceConfiguration {
        SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format: self.format,
            width: self.width,
            height: self.height,
            present_mode: PresentMode::Fifo,
            alpha_mode: self.alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        }
    }

    pub fn draw_frame(&mut self, device: &Device, queue: &Queue, surface: &Surface) {
        let (egui_primitives, egui_full_output) =
            match (self.egui_primitives.take(), self.egui_full_output.take()) {
                (Some(prim), Some(output)) => (prim, output),
                _ => return, // No UI to render
            };

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.width, self.height],
            pixels_per_point: self.egui_dpr,
        };

        let frame = match surface.get_current_texture() {
            Ok(frame) => frame,
            Err(SurfaceError::Lost) => {
                surface.configure(device, &self.surface_configuration());
                surface
                    .get_current_texture()
                    .expect("Failed to acquire frame after reconfigure")
            }
            Err(e) => panic!("Surface error: {e:?}"),
        };

        let view = frame.texture.create_view(&TextureViewDescriptor::default());
        let mut encoder = device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("overlay_encoder"),
        });

        // Upload egui textures
        for (id, image_delta) in &egui_full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        // Update egui buffers
        self.egui_renderer.update_buffers(
            device,
            queue,
            &mut encoder,
            &egui_primitives,
            &screen_descriptor,
        );

        // Transparent clear + egui overlay in a single pass; the scene
        // below stays visible wherever no widget is drawn.
        {
            let egui_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("overlay_egui_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(Color::TRANSPARENT),
                        store: StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.egui_renderer.render(
                &mut egui_pass.forget_lifetime(),
                &egui_primitives,
                &screen_descriptor,
            );
        }

        // Free egui textures
        for id in &egui_full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        queue.submit(std::iter::once(encoder.finish()));
        frame.present();
    }
}

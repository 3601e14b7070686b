// Re-export all public modules so host applications can reach the core types
pub mod logging;
pub mod device;
pub mod ui;

// MVC Architecture
pub mod model;
pub mod view;
pub mod controller;

pub use device::XrDeviceHandle;
pub use model::{DevUiConfig, DevUiOptions};

// Common imports (the mount façade and its DOM plumbing are wasm-only;
// the model/controller core above compiles and tests natively)
#[cfg(target_arch = "wasm32")]
use std::cell::RefCell;
#[cfg(target_arch = "wasm32")]
use std::rc::Rc;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::closure::Closure;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{JsCast, JsValue};
#[cfg(target_arch = "wasm32")]
use web_sys::{Document, Event, HtmlCanvasElement, HtmlElement, KeyboardEvent, MouseEvent, Window};

#[cfg(target_arch = "wasm32")]
use controller::lock::LockSubscription;
#[cfg(target_arch = "wasm32")]
use controller::{DocumentLockProbe, DomLockHub, OverlayLoop};
#[cfg(target_arch = "wasm32")]
use controller::{InputEvent, InputLayer};
#[cfg(target_arch = "wasm32")]
use model::OverlayState;
#[cfg(target_arch = "wasm32")]
use view::{GpuContext, RenderState};

/// Handle returned by the mount façade. Retains the device and the input
/// layer for later inspection. There is no teardown operation; the mount
/// lives as long as the page session.
#[cfg(target_arch = "wasm32")]
pub struct DevUi {
    device: Rc<dyn XrDeviceHandle>,
    input_layer: Rc<RefCell<InputLayer>>,
}

#[cfg(target_arch = "wasm32")]
impl DevUi {
    /// Mount the overlay over the device's canvas container.
    ///
    /// Appends two nodes to the container: the positioning container
    /// (pointer-event-transparent, holds the HUD canvas) and the input
    /// layer's capture element one stacking level below it. Options pass
    /// through unmodified; the overlay controller resolves them.
    pub fn new(device: Rc<dyn XrDeviceHandle>, options: DevUiOptions) -> Result<Self, JsValue> {
        logging::init();

        let window = web_sys::window().ok_or(js_error("no global `window`"))?;
        let document = window.document().ok_or(js_error("no document on window"))?;

        // The overlay assumes a fixed, centered stereo view.
        device.set_ipd(0.0);

        let canvas_container = device.canvas_container();

        let overlay_container = create_div(&document)?;
        style_viewport_layer(&overlay_container, "3")?;
        {
            let style = overlay_container.style();
            style.set_property("display", "flex")?;
            style.set_property("justify-content", "center")?;
            style.set_property("align-items", "center")?;
            style.set_property("overflow", "hidden")?;
            style.set_property("pointer-events", "none")?;
        }
        canvas_container.append_child(&overlay_container)?;

        let overlay = Rc::new(RefCell::new(OverlayState::new(options)));
        let press_duration_ms = overlay.borrow().config().button_press_duration_ms;

        let input_layer = Rc::new(RefCell::new(InputLayer::new(
            device.clone(),
            press_duration_ms,
            &document,
        )?));
        {
            let layer = input_layer.borrow();
            style_viewport_layer(layer.dom_element(), "2")?;
            canvas_container.append_child(layer.dom_element())?;
        }

        // Rendering root: a transparent HUD canvas inside the positioning
        // container, driven by requestAnimationFrame once the GPU is up.
        let canvas = document
            .create_element("canvas")?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| js_error("failed to create overlay canvas"))?;
        let width = window.inner_width()?.as_f64().unwrap_or(800.0) as u32;
        let height = window.inner_height()?.as_f64().unwrap_or(600.0) as u32;
        canvas.set_width(width);
        canvas.set_height(height);
        {
            let style = canvas.style();
            style.set_property("width", "100%")?;
            style.set_property("height", "100%")?;
            style.set_property("pointer-events", "none")?;
        }
        overlay_container.append_child(&canvas)?;

        // One shared egui context: the listeners need it to decide whether
        // a click belongs to a widget or should capture the pointer.
        let egui_ctx = egui::Context::default();
        let egui_events: Rc<RefCell<Vec<egui::Event>>> = Rc::new(RefCell::new(Vec::new()));

        setup_input_listeners(
            &document,
            &window,
            input_layer.clone(),
            overlay.clone(),
            egui_events.clone(),
            egui_ctx.clone(),
        )?;

        // Lock-status subscription: every notification re-derives the flag
        // from the platform's current lock target.
        let lock_subscription = {
            let probe = DocumentLockProbe::new(document.clone());
            let overlay = overlay.clone();
            let notify: Rc<dyn Fn()> = Rc::new(move || {
                overlay
                    .borrow_mut()
                    .set_pointer_locked(probe.lock_target_present());
            });
            LockSubscription::subscribe(DomLockHub::new(document.clone(), notify))
        };

        wasm_bindgen_futures::spawn_local(start_render_root(
            window,
            canvas,
            device.clone(),
            overlay,
            input_layer.clone(),
            egui_events,
            egui_ctx,
            lock_subscription,
        ));

        tracing::info!(press_duration_ms, "devui mounted");
        Ok(Self { device, input_layer })
    }

    pub fn device(&self) -> &Rc<dyn XrDeviceHandle> {
        &self.device
    }

    pub fn input_layer(&self) -> &Rc<RefCell<InputLayer>> {
        &self.input_layer
    }
}

/// Bring up the GPU context and egui renderer for the HUD canvas, then
/// start the self-rescheduling frame loop.
#[cfg(target_arch = "wasm32")]
async fn start_render_root(
    window: Window,
    canvas: HtmlCanvasElement,
    device: Rc<dyn XrDeviceHandle>,
    overlay: Rc<RefCell<OverlayState>>,
    input_layer: Rc<RefCell<InputLayer>>,
    egui_events: Rc<RefCell<Vec<egui::Event>>>,
    egui_ctx: egui::Context,
    lock_subscription: LockSubscription<DomLockHub>,
) {
    let gpu = match GpuContext::new(&canvas, canvas.width().max(1), canvas.height().max(1)).await {
        Ok(gpu) => gpu,
        Err(e) => {
            tracing::error!("overlay GPU init failed: {e:?}");
            return;
        }
    };

    let egui_renderer = egui_wgpu::Renderer::new(
        gpu.device.as_ref(),
        gpu.format,
        egui_wgpu::RendererOptions::default(),
    );

    let mut render_state = RenderState {
        format: gpu.format,
        alpha_mode: gpu.config.alpha_mode,
        width: gpu.config.width,
        height: gpu.config.height,
        egui_renderer,
        egui_primitives: None,
        egui_full_output: None,
        egui_dpr: 1.0,
    };

    let mut overlay_loop = OverlayLoop {
        overlay,
        input_layer,
        device,
        egui_ctx,
        egui_events,
        lock_subscription,
    };

    // Continuous redraw using requestAnimationFrame
    let f = RafCallback::new(window.clone(), {
        let window_for_loop = window.clone();
        move || {
            overlay_loop.update(
                gpu.device.as_ref(),
                &window_for_loop,
                &gpu.surface,
                &mut render_state,
            );
            render_state.draw_frame(gpu.device.as_ref(), gpu.queue.as_ref(), &gpu.surface);
        }
    });
    f.start();
}

/// Setup all input event listeners feeding the capture layer and egui
#[cfg(target_arch = "wasm32")]
fn setup_input_listeners(
    document: &Document,
    window: &Window,
    input_layer: Rc<RefCell<InputLayer>>,
    overlay: Rc<RefCell<OverlayState>>,
    egui_events: Rc<RefCell<Vec<egui::Event>>>,
    egui_ctx: egui::Context,
) -> Result<(), JsValue> {
    let now_ms = {
        let window = window.clone();
        move || window.performance().map(|p| p.now()).unwrap_or(0.0)
    };

    // Keyboard down
    {
        let input_layer = input_layer.clone();
        let overlay = overlay.clone();
        let document_for_exit = document.clone();
        let now_ms = now_ms.clone();
        let keydown = Closure::wrap(Box::new(move |e: KeyboardEvent| {
            let key = e.key();

            if key == "Escape" {
                // Cancels an armed rebind first, releases the lock otherwise.
                if overlay.borrow_mut().rebinding.take().is_some() {
                    e.prevent_default();
                } else {
                    document_for_exit.exit_pointer_lock();
                }
                return;
            }

            // An armed rebind consumes the key before any routing.
            if overlay.borrow_mut().consume_rebind(&key) {
                e.prevent_default();
                return;
            }

            let (key_map, locked, mapped) = {
                let state = overlay.borrow();
                let mapped = state.key_map.action_for(&key).is_some();
                (state.key_map.clone(), state.pointer_locked, mapped)
            };
            if mapped {
                e.prevent_default();
            }
            input_layer.borrow_mut().process_event(
                &InputEvent::KeyDown(key),
                &key_map,
                locked,
                now_ms(),
            );
        }) as Box<dyn FnMut(KeyboardEvent)>);
        document.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;
        keydown.forget();
    }

    // Keyboard up
    {
        let input_layer = input_layer.clone();
        let overlay = overlay.clone();
        let now_ms = now_ms.clone();
        let keyup = Closure::wrap(Box::new(move |e: KeyboardEvent| {
            let (key_map, locked) = {
                let state = overlay.borrow();
                (state.key_map.clone(), state.pointer_locked)
            };
            input_layer.borrow_mut().process_event(
                &InputEvent::KeyUp(e.key()),
                &key_map,
                locked,
                now_ms(),
            );
        }) as Box<dyn FnMut(KeyboardEvent)>);
        document.add_event_listener_with_callback("keyup", keyup.as_ref().unchecked_ref())?;
        keyup.forget();
    }

    // Focus loss - release everything
    {
        let input_layer = input_layer.clone();
        let overlay = overlay.clone();
        let now_ms = now_ms.clone();
        let blur = Closure::wrap(Box::new(move |_e: Event| {
            let (key_map, locked) = {
                let state = overlay.borrow();
                (state.key_map.clone(), state.pointer_locked)
            };
            input_layer.borrow_mut().process_event(
                &InputEvent::FocusLost,
                &key_map,
                locked,
                now_ms(),
            );
        }) as Box<dyn FnMut(Event)>);
        window.add_event_listener_with_callback("blur", blur.as_ref().unchecked_ref())?;
        blur.forget();
    }

    // Tab switch - release everything
    {
        let input_layer = input_layer.clone();
        let overlay = overlay.clone();
        let now_ms = now_ms.clone();
        let visibility = Closure::wrap(Box::new(move |_e: Event| {
            let (key_map, locked) = {
                let state = overlay.borrow();
                (state.key_map.clone(), state.pointer_locked)
            };
            input_layer.borrow_mut().process_event(
                &InputEvent::FocusLost,
                &key_map,
                locked,
                now_ms(),
            );
        }) as Box<dyn FnMut(Event)>);
        document.add_event_listener_with_callback(
            "visibilitychange",
            visibility.as_ref().unchecked_ref(),
        )?;
        visibility.forget();
    }

    // Mouse move: locked movement drives the device, unlocked movement
    // belongs to the overlay widgets.
    {
        let input_layer = input_layer.clone();
        let overlay = overlay.clone();
        let egui_events = egui_events.clone();
        let now_ms = now_ms.clone();
        let mousemove = Closure::wrap(Box::new(move |e: MouseEvent| {
            let locked = overlay.borrow().pointer_locked;
            if locked {
                let key_map = overlay.borrow().key_map.clone();
                input_layer.borrow_mut().process_event(
                    &InputEvent::MouseMove {
                        dx: e.movement_x() as f32,
                        dy: e.movement_y() as f32,
                    },
                    &key_map,
                    true,
                    now_ms(),
                );
            } else {
                egui_events.borrow_mut().push(egui::Event::PointerMoved(egui::pos2(
                    e.client_x() as f32,
                    e.client_y() as f32,
                )));
            }
        }) as Box<dyn FnMut(MouseEvent)>);
        document.add_event_listener_with_callback("mousemove", mousemove.as_ref().unchecked_ref())?;
        mousemove.forget();
    }

    // Mouse down on the capture element: clicks over a widget go to egui,
    // anywhere else they request the pointer lock.
    {
        let layer_element = input_layer.borrow().dom_element().clone();
        let egui_events = egui_events.clone();
        let egui_ctx_down = egui_ctx.clone();
        let element_for_lock = layer_element.clone();
        let mousedown = Closure::wrap(Box::new(move |e: MouseEvent| {
            if egui_ctx_down.wants_pointer_input() {
                egui_events.borrow_mut().push(egui::Event::PointerButton {
                    pos: egui::pos2(e.client_x() as f32, e.client_y() as f32),
                    button: egui::PointerButton::Primary,
                    pressed: true,
                    modifiers: egui::Modifiers::default(),
                });
            } else {
                element_for_lock.request_pointer_lock();
            }
            e.prevent_default();
        }) as Box<dyn FnMut(MouseEvent)>);
        layer_element
            .add_event_listener_with_callback("mousedown", mousedown.as_ref().unchecked_ref())?;
        mousedown.forget();
    }

    // Mouse up - finish egui clicks
    {
        let egui_events = egui_events.clone();
        let mouseup = Closure::wrap(Box::new(move |e: MouseEvent| {
            egui_events.borrow_mut().push(egui::Event::PointerButton {
                pos: egui::pos2(e.client_x() as f32, e.client_y() as f32),
                button: egui::PointerButton::Primary,
                pressed: false,
                modifiers: egui::Modifiers::default(),
            });
        }) as Box<dyn FnMut(MouseEvent)>);
        document.add_event_listener_with_callback("mouseup", mouseup.as_ref().unchecked_ref())?;
        mouseup.forget();
    }

    // Context menu prevention over the capture layer
    {
        let layer_element = input_layer.borrow().dom_element().clone();
        let contextmenu = Closure::wrap(Box::new(move |e: MouseEvent| {
            e.prevent_default();
        }) as Box<dyn FnMut(MouseEvent)>);
        layer_element
            .add_event_listener_with_callback("contextmenu", contextmenu.as_ref().unchecked_ref())?;
        contextmenu.forget();
    }

    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn create_div(document: &Document) -> Result<HtmlElement, JsValue> {
    document
        .create_element("div")?
        .dyn_into::<HtmlElement>()
        .map_err(|_| js_error("created element is not an HtmlElement"))
}

/// Full-viewport fixed positioning shared by the overlay container and the
/// capture layer; only the stacking order differs.
#[cfg(target_arch = "wasm32")]
fn style_viewport_layer(element: &HtmlElement, z_index: &str) -> Result<(), JsValue> {
    let style = element.style();
    style.set_property("position", "fixed")?;
    style.set_property("width", "100%")?;
    style.set_property("height", "100%")?;
    style.set_property("top", "0")?;
    style.set_property("left", "0")?;
    style.set_property("z-index", z_index)?;
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn js_error<E: Into<String>>(msg: E) -> JsValue {
    JsValue::from_str(&msg.into())
}

#[cfg(target_arch = "wasm32")]
struct RafCallback {
    inner: Rc<RefCell<Box<dyn FnMut()>>>,
    window: Window,
}

#[cfg(target_arch = "wasm32")]
impl RafCallback {
    fn new(window: Window, f: impl FnMut() + 'static) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Box::new(f))),
            window,
        }
    }

    fn start(self) {
        let inner = self.inner.clone();
        let window = self.window.clone();

        let callback = Rc::new(RefCell::new(None::<Closure<dyn FnMut()>>));
        let callback_clone = callback.clone();

        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            inner.borrow_mut().as_mut()();

            // Recursively schedule next frame
            let cb_ref = callback_clone.borrow();
            window
                .request_animation_frame(cb_ref.as_ref().unwrap().as_ref().unchecked_ref())
                .expect("RAF failed");
        }) as Box<dyn FnMut()>));

        self.window
            .request_animation_frame(
                callback.borrow().as_ref().unwrap().as_ref().unchecked_ref(),
            )
            .expect("RAF start failed");

        // Leak the closure to keep it alive
        std::mem::forget(callback);
    }
}

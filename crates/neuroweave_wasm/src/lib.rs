//! Browser binding: mounts the engine on a `<canvas>` and drives it from
//! `requestAnimationFrame`.
//!
//! ```js
//! import init, { init_hooks, NeuralBackground } from "./neuroweave_wasm.js";
//! await init();
//! init_hooks();
//! const bg = NeuralBackground.mount("backdrop", JSON.stringify({ node_count: 120 }));
//! // later
//! bg.unmount();
//! ```

pub mod canvas;

use std::cell::RefCell;
use std::rc::Rc;

use neuroweave_core::{FrameOutcome, NeuralConfig, NeuralEngine, NeuralError, Viewport};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    CanvasRenderingContext2d, Event, EventTarget, HtmlCanvasElement, MouseEvent, TouchEvent, Window,
};

use crate::canvas::Canvas2dSurface;

#[wasm_bindgen]
pub fn init_hooks() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
}

/// Parses the mount-time JSON; an empty string means defaults.
pub fn parse_config(config_json: &str) -> Result<NeuralConfig, NeuralError> {
    if config_json.trim().is_empty() {
        return Ok(NeuralConfig::default());
    }
    NeuralConfig::from_json_str(config_json)
}

fn js_error(message: impl std::fmt::Display) -> JsValue {
    js_sys::Error::new(&message.to_string()).into()
}

struct Runtime {
    engine: NeuralEngine,
    surface: Canvas2dSurface,
    canvas: HtmlCanvasElement,
    window: Window,
}

impl Runtime {
    fn measure(&self) -> Viewport {
        let rect = self.canvas.get_bounding_client_rect();
        Viewport::new(rect.width(), rect.height(), self.window.device_pixel_ratio())
    }

    /// Sizes the backing store and re-applies the DPR transform.
    fn apply(&self, viewport: Viewport) {
        self.canvas.set_width(viewport.pixel_width());
        self.canvas.set_height(viewport.pixel_height());
        if let Err(e) = self.surface.set_scale(viewport.device_pixel_ratio) {
            log::warn!("set_transform failed: {:?}", e);
        }
    }

    fn local(&self, client_x: i32, client_y: i32) -> (f64, f64) {
        let rect = self.canvas.get_bounding_client_rect();
        (client_x as f64 - rect.left(), client_y as f64 - rect.top())
    }
}

struct Listener {
    target: EventTarget,
    event: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn attach(
        target: &EventTarget,
        event: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, JsValue> {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            event,
            closure,
        })
    }

    fn detach(&self) {
        if let Err(e) = self
            .target
            .remove_event_listener_with_callback(self.event, self.closure.as_ref().unchecked_ref())
        {
            log::warn!("failed to remove {} listener: {:?}", self.event, e);
        }
    }
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// A mounted background. Dropping it (or calling `free()` from JS) unmounts.
#[wasm_bindgen]
pub struct NeuralBackground {
    runtime: Rc<RefCell<Runtime>>,
    listeners: Vec<Listener>,
    frame_handle: Rc<RefCell<Option<i32>>>,
    tick: FrameCallback,
}

#[wasm_bindgen]
impl NeuralBackground {
    /// Attaches to `<canvas id=canvas_id>` and starts animating.
    pub fn mount(canvas_id: &str, config_json: &str) -> Result<NeuralBackground, JsValue> {
        let config = parse_config(config_json).map_err(js_error)?;

        let window = web_sys::window().ok_or_else(|| js_error("no window"))?;
        let document = window.document().ok_or_else(|| js_error("no document"))?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| js_error(format!("missing #{canvas_id}")))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| js_error(format!("#{canvas_id} is not a canvas")))?;
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| js_error("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| js_error("unexpected context type"))?;

        let rect = canvas.get_bounding_client_rect();
        let viewport = Viewport::new(rect.width(), rect.height(), window.device_pixel_ratio());
        let mut engine = NeuralEngine::new(config, viewport);
        engine.start();

        let runtime = Runtime {
            engine,
            surface: Canvas2dSurface::new(ctx),
            canvas,
            window: window.clone(),
        };
        runtime.apply(viewport);
        log::info!(
            "neuroweave mounted on #{}: {}x{} @{}x, {} nodes",
            canvas_id,
            viewport.width,
            viewport.height,
            viewport.device_pixel_ratio,
            runtime.engine.field().len()
        );

        let mut background = NeuralBackground {
            runtime: Rc::new(RefCell::new(runtime)),
            listeners: Vec::new(),
            frame_handle: Rc::new(RefCell::new(None)),
            tick: Rc::new(RefCell::new(None)),
        };
        if let Err(e) = background.attach_listeners(&window, &document) {
            background.unmount();
            return Err(e);
        }
        background.start_loop(&window)?;
        Ok(background)
    }

    /// Cancels the pending frame and detaches every listener. Idempotent.
    pub fn unmount(&mut self) {
        if let Some(handle) = self.frame_handle.borrow_mut().take() {
            let window = self.runtime.borrow().window.clone();
            window.cancel_animation_frame(handle).ok();
        }
        // breaks the closure's self-reference
        self.tick.borrow_mut().take();

        for listener in self.listeners.drain(..) {
            listener.detach();
        }
        if let Ok(mut runtime) = self.runtime.try_borrow_mut() {
            if runtime.engine.is_running() {
                runtime.engine.stop();
                log::info!("neuroweave unmounted");
            }
        }
    }

    #[wasm_bindgen(getter)]
    pub fn stats(&self) -> String {
        let stats = self.runtime.borrow().engine.stats();
        format!(
            "frame={} nodes={} edges={} pulses={} ideas={}",
            stats.frame, stats.nodes, stats.edges, stats.pulses, stats.idea_pulses
        )
    }
}

impl NeuralBackground {
    fn attach_listeners(
        &mut self,
        window: &Window,
        document: &web_sys::Document,
    ) -> Result<(), JsValue> {
        let rt = self.runtime.clone();
        self.listeners.push(Listener::attach(window, "mousemove", move |event| {
            if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
                let mut runtime = rt.borrow_mut();
                let (x, y) = runtime.local(mouse.client_x(), mouse.client_y());
                runtime.engine.pointer_move(x, y);
            }
        })?);

        // mouseleave does not fire on window; the root element sees the pointer exit
        let root: EventTarget = match document.document_element() {
            Some(element) => element.into(),
            None => document.clone().into(),
        };
        let rt = self.runtime.clone();
        self.listeners.push(Listener::attach(&root, "mouseleave", move |_| {
            rt.borrow_mut().engine.pointer_leave();
        })?);

        let rt = self.runtime.clone();
        self.listeners.push(Listener::attach(window, "touchmove", move |event| {
            let Some(touch) = event
                .dyn_ref::<TouchEvent>()
                .and_then(|t| t.touches().get(0))
            else {
                return;
            };
            let mut runtime = rt.borrow_mut();
            let (x, y) = runtime.local(touch.client_x(), touch.client_y());
            runtime.engine.touch_move(x, y);
        })?);

        let rt = self.runtime.clone();
        self.listeners.push(Listener::attach(window, "touchend", move |_| {
            rt.borrow_mut().engine.touch_end();
        })?);

        let rt = self.runtime.clone();
        self.listeners.push(Listener::attach(window, "resize", move |_| {
            let mut runtime = rt.borrow_mut();
            let viewport = runtime.measure();
            runtime.apply(viewport);
            runtime.engine.resize(viewport);
        })?);

        Ok(())
    }

    fn start_loop(&self, window: &Window) -> Result<(), JsValue> {
        let runtime = self.runtime.clone();
        let handle = self.frame_handle.clone();
        let next = self.tick.clone();
        let win = window.clone();

        *self.tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            let outcome = {
                let mut guard = runtime.borrow_mut();
                let rt = &mut *guard;
                rt.engine.frame(&mut rt.surface)
            };
            if outcome == FrameOutcome::Stopped {
                handle.borrow_mut().take();
                return;
            }
            if let Some(callback) = next.borrow().as_ref() {
                match win.request_animation_frame(callback.as_ref().unchecked_ref()) {
                    Ok(id) => *handle.borrow_mut() = Some(id),
                    Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
                }
            }
        }) as Box<dyn FnMut()>));

        if let Some(callback) = self.tick.borrow().as_ref() {
            let id = window.request_animation_frame(callback.as_ref().unchecked_ref())?;
            *self.frame_handle.borrow_mut() = Some(id);
        }
        Ok(())
    }
}

impl Drop for NeuralBackground {
    fn drop(&mut self) {
        self.unmount();
    }
}

//! Browser controller
//!
//! `FortuneFx` is the object the host page holds. It owns the canvas, the
//! GPU context and the animation session while running, and drives the
//! frame loop with `requestAnimationFrame`.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use rand::rngs::StdRng;
use serde::Serialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, future_to_promise};
use web_sys::{Element, HtmlCanvasElement};

use super::surface_size;
use crate::audio::AudioManager;
use crate::consts::{FRAME_DT, START_TIMEOUT_MS};
use crate::error::FxError;
use crate::fx::random::secure_rng;
use crate::fx::{AnimationSession, Lifecycle, LifecyclePhase, OptionsPatch, StartRequest, StartTicket};
use crate::renderer::FxRenderState;
use crate::settings::{QualityPreset, Settings};
use crate::wheel::{SpinPlan, TickTracker, WheelItem, default_items, parse_items};

/// Install logging and the panic hook once per module instance
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Fortune FX loaded");
}

/// Resources that exist only while running
struct Running {
    session: AnimationSession<StdRng>,
    render: FxRenderState,
    canvas: HtmlCanvasElement,
    raf_id: Option<i32>,
    resize_listener: Option<Closure<dyn FnMut()>>,
}

struct Controller {
    container_id: String,
    settings: Settings,
    lifecycle: Lifecycle<Running>,
    /// Shared by every `start()` call while starting
    pending: Option<js_sys::Promise>,
}

/// Celebration overlay for a wheel container
#[wasm_bindgen]
pub struct FortuneFx {
    inner: Rc<RefCell<Controller>>,
}

#[wasm_bindgen]
impl FortuneFx {
    /// Create a controller for the element with id `container_id`. Nothing
    /// is touched until `start()`.
    #[wasm_bindgen(constructor)]
    pub fn new(container_id: &str) -> FortuneFx {
        Self {
            inner: Rc::new(RefCell::new(Controller {
                container_id: container_id.to_string(),
                settings: Settings::load(),
                lifecycle: Lifecycle::new(),
                pending: None,
            })),
        }
    }

    /// Merge sub-effect toggles; missing values are left as they are
    pub fn configure(&self, lights: Option<bool>, particles: Option<bool>, camera: Option<bool>) {
        self.apply_patch(OptionsPatch {
            lights,
            particles,
            camera,
        });
    }

    /// Merge sub-effect toggles from a JSON object such as `{"camera": false}`
    #[wasm_bindgen(js_name = configureJson)]
    pub fn configure_json(&self, json: &str) -> Result<(), JsValue> {
        let patch = OptionsPatch::from_json(json).map_err(FxError::from)?;
        self.apply_patch(patch);
        Ok(())
    }

    /// Change the emitter population preset ("low", "medium", "high")
    #[wasm_bindgen(js_name = setQuality)]
    pub fn set_quality(&self, name: &str) -> Result<(), JsValue> {
        let preset = QualityPreset::from_str(name)
            .ok_or_else(|| JsError::new(&format!("unknown quality preset: {}", name)))?;
        let mut ctl = self.inner.borrow_mut();
        ctl.settings.quality = preset;
        ctl.settings.save();
        let counts = ctl.settings.emitter_counts();
        if let Some(running) = ctl.lifecycle.running_mut() {
            running.session.set_counts(counts);
        }
        Ok(())
    }

    #[wasm_bindgen(js_name = setReducedMotion)]
    pub fn set_reduced_motion(&self, reduced: bool) {
        let mut ctl = self.inner.borrow_mut();
        ctl.settings.reduced_motion = reduced;
        ctl.settings.save();
        let options = ctl.settings.effective_options();
        if let Some(running) = ctl.lifecycle.running_mut() {
            running.session.set_options(options);
        }
    }

    /// "stopped", "starting" or "running"
    pub fn state(&self) -> String {
        match self.inner.borrow().lifecycle.phase() {
            LifecyclePhase::Stopped => "stopped",
            LifecyclePhase::Starting => "starting",
            LifecyclePhase::Running => "running",
        }
        .to_string()
    }

    /// Acquire the rendering context and begin animating. Calls made while
    /// starting share one promise; calls while running resolve immediately.
    pub fn start(&self) -> js_sys::Promise {
        let mut ctl = self.inner.borrow_mut();
        match ctl.lifecycle.request_start() {
            StartRequest::AlreadyRunning => js_sys::Promise::resolve(&JsValue::UNDEFINED),
            StartRequest::InFlight => ctl
                .pending
                .clone()
                .unwrap_or_else(|| js_sys::Promise::resolve(&JsValue::UNDEFINED)),
            StartRequest::Begin(ticket) => {
                log::info!("Starting");
                let inner = self.inner.clone();
                let promise = future_to_promise(async move {
                    start_session(inner, ticket)
                        .await
                        .map(|_| JsValue::UNDEFINED)
                        .map_err(JsValue::from)
                });
                ctl.pending = Some(promise.clone());
                promise
            }
        }
    }

    /// Halt the frame loop and release the canvas and GPU context
    pub fn stop(&self) {
        let mut ctl = self.inner.borrow_mut();
        ctl.pending = None;
        let was = ctl.lifecycle.phase();
        if let Some(running) = ctl.lifecycle.stop() {
            teardown(running);
        }
        if was != LifecyclePhase::Stopped {
            log::info!("Stopped (was {:?})", was);
        }
    }

    /// Wheel started spinning
    pub fn tension(&self) {
        if let Some(running) = self.inner.borrow_mut().lifecycle.running_mut() {
            running.session.tension();
        }
    }

    /// Wheel stopped on a result
    pub fn celebrate(&self) {
        if let Some(running) = self.inner.borrow_mut().lifecycle.running_mut() {
            running.session.celebrate();
        }
    }

    /// Re-read the container size
    pub fn resize(&self) {
        resize_running(&self.inner, None);
    }
}

impl FortuneFx {
    fn apply_patch(&self, patch: OptionsPatch) {
        let mut ctl = self.inner.borrow_mut();
        ctl.settings.options.merge(patch);
        ctl.settings.save();
        let options = ctl.settings.effective_options();
        if let Some(running) = ctl.lifecycle.running_mut() {
            running.session.set_options(options);
        }
    }
}

impl Drop for FortuneFx {
    fn drop(&mut self) {
        self.stop();
    }
}

// ============================================================================
// START / STOP
// ============================================================================

async fn start_session(inner: Rc<RefCell<Controller>>, ticket: StartTicket) -> Result<(), FxError> {
    if !inner.borrow().lifecycle.is_current(ticket) {
        return Ok(());
    }
    let prepared = {
        let ctl = inner.borrow();
        create_canvas(&ctl.container_id, ctl.settings.max_pixel_ratio)
    };
    let (canvas, width, height) = match prepared {
        Ok(p) => p,
        Err(e) => {
            abandon_start(&inner, ticket);
            log::error!("Start failed: {}", e);
            return Err(e);
        }
    };

    let capacity = {
        let counts = inner.borrow().settings.emitter_counts();
        counts.burst + counts.confetti
    };
    let acquired = acquire_with_timeout(canvas.clone(), width, height, capacity).await;

    let mut ctl = inner.borrow_mut();
    if !ctl.lifecycle.is_current(ticket) {
        // Stopped while acquiring; drop what we got
        log::info!("Start finished after stop; releasing resources");
        canvas.remove();
        return Ok(());
    }
    ctl.pending = None;

    let built = acquired.and_then(|render| {
        let rng = secure_rng()?;
        // The device may allow less than the container asked for
        let (width, height) = render.size;
        canvas.set_width(width);
        canvas.set_height(height);
        let session = AnimationSession::new(
            ctl.settings.effective_options(),
            ctl.settings.emitter_counts(),
            width,
            height,
            rng,
        );
        Ok((render, session))
    });
    let (render, session) = match built {
        Ok(parts) => parts,
        Err(e) => {
            ctl.lifecycle.fail_start(ticket);
            canvas.remove();
            log::error!("Start failed: {}", e);
            return Err(e);
        }
    };

    let (width, height) = render.size;
    let running = Running {
        session,
        render,
        canvas,
        raf_id: None,
        resize_listener: Some(resize_listener(Rc::downgrade(&inner), ticket)),
    };
    if let Err(running) = ctl.lifecycle.complete_start(ticket, running) {
        teardown(running);
        return Ok(());
    }
    drop(ctl);

    log::info!("Running at {}x{}", width, height);
    schedule_frame(inner, ticket);
    Ok(())
}

fn abandon_start(inner: &Rc<RefCell<Controller>>, ticket: StartTicket) {
    let mut ctl = inner.borrow_mut();
    if ctl.lifecycle.fail_start(ticket) {
        ctl.pending = None;
    }
}

/// Insert an overlay canvas into the container
fn create_canvas(container_id: &str, max_ratio: f64) -> Result<(HtmlCanvasElement, u32, u32), FxError> {
    let window = web_sys::window().ok_or(FxError::NoWindow)?;
    let document = window.document().ok_or(FxError::NoWindow)?;
    let container = document
        .get_element_by_id(container_id)
        .ok_or_else(|| FxError::Container(format!("no element with id '{}'", container_id)))?;

    let canvas: HtmlCanvasElement = document
        .create_element("canvas")
        .map_err(dom_err)?
        .dyn_into()
        .map_err(|_| FxError::Dom("created element is not a canvas".into()))?;

    let style = canvas.style();
    for (key, value) in [
        ("position", "absolute"),
        ("inset", "0"),
        ("width", "100%"),
        ("height", "100%"),
        ("pointer-events", "none"),
    ] {
        style.set_property(key, value).map_err(dom_err)?;
    }

    let (width, height) = container_size(&container, window.device_pixel_ratio(), max_ratio);
    canvas.set_width(width);
    canvas.set_height(height);
    container.append_child(&canvas).map_err(dom_err)?;

    Ok((canvas, width, height))
}

fn container_size(container: &Element, device_ratio: f64, max_ratio: f64) -> (u32, u32) {
    surface_size(
        container.client_width() as f64,
        container.client_height() as f64,
        device_ratio,
        max_ratio,
    )
}

fn dom_err(value: JsValue) -> FxError {
    FxError::Dom(format!("{:?}", value))
}

async fn acquire(canvas: HtmlCanvasElement, width: u32, height: u32, capacity: usize) -> Result<FxRenderState, FxError> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
        ..Default::default()
    });

    let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas))?;

    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        })
        .await?;

    log::info!("Using adapter: {:?}", adapter.get_info().name);

    FxRenderState::new(surface, &adapter, width, height, capacity).await
}

/// Race the acquisition against a timer. A late acquisition is dropped.
async fn acquire_with_timeout(
    canvas: HtmlCanvasElement,
    width: u32,
    height: u32,
    capacity: usize,
) -> Result<FxRenderState, FxError> {
    let window = web_sys::window().ok_or(FxError::NoWindow)?;
    let slot: Rc<RefCell<Option<Result<FxRenderState, FxError>>>> = Rc::new(RefCell::new(None));

    let acquisition = {
        let slot = slot.clone();
        future_to_promise(async move {
            let result = acquire(canvas, width, height, capacity).await;
            *slot.borrow_mut() = Some(result);
            Ok(JsValue::UNDEFINED)
        })
    };

    let timer_id = Rc::new(Cell::new(None));
    let timeout = {
        let timer_id = timer_id.clone();
        let window = window.clone();
        js_sys::Promise::new(&mut |_resolve, reject| {
            let on_timeout = Closure::once_into_js(move || {
                let _ = reject.call0(&JsValue::NULL);
            });
            match window.set_timeout_with_callback_and_timeout_and_arguments_0(
                on_timeout.unchecked_ref(),
                START_TIMEOUT_MS as i32,
            ) {
                Ok(id) => timer_id.set(Some(id)),
                Err(e) => log::warn!("Could not arm start timeout: {:?}", e),
            }
        })
    };

    let race = js_sys::Promise::race(&js_sys::Array::of2(&acquisition, &timeout));
    let outcome = JsFuture::from(race).await;
    if let Some(id) = timer_id.get() {
        window.clear_timeout_with_handle(id);
    }

    match outcome {
        Ok(_) => slot
            .borrow_mut()
            .take()
            .unwrap_or(Err(FxError::Timeout(START_TIMEOUT_MS))),
        Err(_) => {
            log::warn!("Rendering context not ready after {} ms", START_TIMEOUT_MS);
            Err(FxError::Timeout(START_TIMEOUT_MS))
        }
    }
}

/// Undo everything `start()` set up
fn teardown(mut running: Running) {
    if let Some(window) = web_sys::window() {
        if let Some(id) = running.raf_id.take() {
            let _ = window.cancel_animation_frame(id);
        }
        if let Some(listener) = running.resize_listener.take() {
            let _ = window
                .remove_event_listener_with_callback("resize", listener.as_ref().unchecked_ref());
        }
    }
    running.canvas.remove();
}

// ============================================================================
// FRAME LOOP
// ============================================================================

fn schedule_frame(inner: Rc<RefCell<Controller>>, ticket: StartTicket) {
    let Some(window) = web_sys::window() else { return };
    // A cancelled callback is never freed, so it must not keep the controller alive
    let handle = Rc::downgrade(&inner);
    let callback = Closure::once_into_js(move |time: f64| {
        if let Some(inner) = handle.upgrade() {
            frame(inner, ticket, time);
        }
    });
    match window.request_animation_frame(callback.unchecked_ref()) {
        Ok(id) => {
            if let Some(running) = inner.borrow_mut().lifecycle.running_for(ticket) {
                running.raf_id = Some(id);
            }
        }
        Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
    }
}

fn frame(inner: Rc<RefCell<Controller>>, ticket: StartTicket, time: f64) {
    {
        let mut ctl = inner.borrow_mut();
        let Some(running) = ctl.lifecycle.running_for(ticket) else { return };
        running.raf_id = None;

        running.session.advance(FRAME_DT, time);
        match running.render.render(&running.session, time) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                running.render.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of memory!");
            }
            Err(e) => log::warn!("Frame skipped: {:?}", e),
        }
    }

    schedule_frame(inner, ticket);
}

fn resize_listener(inner: Weak<RefCell<Controller>>, ticket: StartTicket) -> Closure<dyn FnMut()> {
    let closure = Closure::<dyn FnMut()>::new(move || {
        if let Some(inner) = inner.upgrade() {
            resize_running(&inner, Some(ticket));
        }
    });
    if let Some(window) = web_sys::window() {
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
    }
    closure
}

/// Resize the running surface. `ticket` restricts the call to one run.
fn resize_running(inner: &Rc<RefCell<Controller>>, ticket: Option<StartTicket>) {
    let Some(window) = web_sys::window() else { return };
    let mut ctl = inner.borrow_mut();
    let max_ratio = ctl.settings.max_pixel_ratio;
    let running = match ticket {
        Some(ticket) => ctl.lifecycle.running_for(ticket),
        None => ctl.lifecycle.running_mut(),
    };
    let Some(running) = running else { return };
    let Some(container) = running.canvas.parent_element() else { return };

    let (width, height) = running
        .render
        .fit(container_size(&container, window.device_pixel_ratio(), max_ratio));
    if (width, height) == running.render.size {
        return;
    }
    running.canvas.set_width(width);
    running.canvas.set_height(height);
    running.render.resize(width, height);
    running.session.resize(width, height);
    log::debug!("Resized to {}x{}", width, height);
}

// ============================================================================
// WHEEL EXPORTS
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpinResponse<'a> {
    #[serde(flatten)]
    plan: SpinPlan,
    winner_name: &'a str,
    settled_deg: f64,
}

/// Draw a winner and plan the spin. Returns JSON, or `null` when nothing
/// is drawable.
#[wasm_bindgen(js_name = planSpin)]
pub fn plan_spin(items_json: &str, current_deg: f64) -> Result<String, JsValue> {
    let items = parse_items(items_json)?;
    let mut rng = secure_rng()?;
    let Some(plan) = crate::wheel::plan_spin(&items, current_deg, &mut rng) else {
        return Ok("null".to_string());
    };
    let response = SpinResponse {
        plan,
        winner_name: &items[plan.winner].name,
        settled_deg: plan.settled_deg(),
    };
    serde_json::to_string(&response).map_err(|e| FxError::from(e).into())
}

#[wasm_bindgen(js_name = defaultItemsJson)]
pub fn default_items_json() -> String {
    serde_json::to_string(&default_items()).unwrap_or_else(|_| "[]".to_string())
}

/// Plays the boundary tick while the wheel turns
#[wasm_bindgen]
pub struct SpinTicker {
    tracker: TickTracker,
    audio: AudioManager,
    rng: StdRng,
}

#[wasm_bindgen]
impl SpinTicker {
    #[wasm_bindgen(constructor)]
    pub fn new(items_json: &str) -> Result<SpinTicker, JsValue> {
        let items: Vec<WheelItem> = parse_items(items_json)?;
        Ok(Self {
            tracker: TickTracker::for_items(&items),
            audio: AudioManager::new(),
            rng: secure_rng()?,
        })
    }

    /// Feed the current wheel rotation; returns whether a tick sounded
    pub fn update(&mut self, angle_deg: f64) -> bool {
        let tick = self.tracker.update(angle_deg);
        if tick {
            self.audio.play_tick(&mut self.rng);
        }
        tick
    }

    #[wasm_bindgen(js_name = setMuted)]
    pub fn set_muted(&mut self, muted: bool) {
        self.audio.set_muted(muted);
    }

    #[wasm_bindgen(js_name = isMuted)]
    pub fn is_muted(&self) -> bool {
        self.audio.is_muted()
    }

    #[wasm_bindgen(js_name = setVolume)]
    pub fn set_volume(&mut self, volume: f32) {
        self.audio.set_master_volume(volume);
    }
}

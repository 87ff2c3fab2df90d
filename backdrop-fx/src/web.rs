//! Browser wiring: canvas lookup, window listeners and the frame loop
//!
//! The scheduler is shared through `Rc<RefCell<_>>` between the resize
//! handler, the pointer handler and the animation callback. All three run on
//! the page's single event thread, so borrows never overlap.

use std::cell::RefCell;
use std::rc::Rc;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlCanvasElement, MouseEvent, Performance, Window};

use crate::canvas2d::Canvas2DSurface;
use crate::config::{BackdropConfig, BannerLine};
use crate::particles::ParticleField;
use crate::pulse::PulseGraph;
use crate::scheduler::{FrameClock, Scheduler};
use crate::surface::Surface;

type WebScheduler = Scheduler<PerformanceClock, Canvas2DSurface>;

/// `performance.now()`; reads 0 where the API is missing
pub struct PerformanceClock {
    performance: Option<Performance>,
}

impl PerformanceClock {
    pub fn new(window: &Window) -> Self {
        Self {
            performance: window.performance(),
        }
    }
}

impl FrameClock for PerformanceClock {
    fn now_ms(&self) -> f64 {
        self.performance.as_ref().map(|p| p.now()).unwrap_or(0.0)
    }
}

/// Mount both effects on their canvases and start animating.
///
/// A missing canvas leaves its effect out; with neither present this is a
/// no-op.
pub fn mount(config: BackdropConfig) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;

    print_banner(&config.banner);

    let seed = config
        .seed
        .unwrap_or_else(|| (js_sys::Math::random() * u64::MAX as f64) as u64);

    let scheduler = assemble(
        &config,
        seed,
        viewport_size(&window),
        PerformanceClock::new(&window),
        |id| find_canvas(&document, id),
    );
    if scheduler.layers().is_empty() {
        tracing::debug!("no backdrop canvases on page");
        return Ok(());
    }

    let scheduler = Rc::new(RefCell::new(scheduler));
    listen_for_resize(&window, Rc::clone(&scheduler))?;
    listen_for_pointer(&window, Rc::clone(&scheduler))?;

    scheduler.borrow_mut().start();
    run_frame_loop(&window, scheduler)
}

/// Build a scheduler with one layer per canvas that `find` resolves.
///
/// The particle field goes on `field_canvas_id` seeded with `seed`, the pulse
/// graph on `pulse_canvas_id` seeded with `seed + 1`. The scheduler is not
/// started.
fn assemble<C, S>(
    config: &BackdropConfig,
    seed: u64,
    (width, height): (u32, u32),
    clock: C,
    mut find: impl FnMut(&str) -> Option<S>,
) -> Scheduler<C, S>
where
    C: FrameClock,
    S: Surface,
{
    let mut scheduler = Scheduler::new(clock);

    if let Some(mut surface) = find(&config.field_canvas_id) {
        surface.resize(width, height);
        let field = ParticleField::new(config.field.clone(), SmallRng::seed_from_u64(seed));
        scheduler.add_layer(Box::new(field), surface);
    }

    if let Some(mut surface) = find(&config.pulse_canvas_id) {
        surface.resize(width, height);
        let graph = PulseGraph::new(
            config.pulse.clone(),
            SmallRng::seed_from_u64(seed.wrapping_add(1)),
        );
        scheduler.add_layer(Box::new(graph), surface);
    }

    scheduler
}

fn print_banner(lines: &[BannerLine]) {
    for line in lines {
        web_sys::console::log_2(
            &JsValue::from_str(&format!("%c{}", line.text)),
            &JsValue::from_str(&line.style),
        );
    }
}

fn viewport_size(window: &Window) -> (u32, u32) {
    let width = window
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    let height = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    (width as u32, height as u32)
}

fn find_canvas(document: &Document, id: &str) -> Option<Canvas2DSurface> {
    let Some(element) = document.get_element_by_id(id) else {
        tracing::debug!(id, "canvas not found, effect disabled");
        return None;
    };
    let canvas = match element.dyn_into::<HtmlCanvasElement>() {
        Ok(canvas) => canvas,
        Err(_) => {
            tracing::debug!(id, "element is not a canvas, effect disabled");
            return None;
        }
    };
    match Canvas2DSurface::new(canvas) {
        Ok(surface) => Some(surface),
        Err(error) => {
            tracing::debug!(id, %error, "canvas unusable, effect disabled");
            None
        }
    }
}

fn listen_for_resize(
    window: &Window,
    scheduler: Rc<RefCell<WebScheduler>>,
) -> Result<(), JsValue> {
    let win = window.clone();
    let on_resize = Closure::wrap(Box::new(move || {
        let (width, height) = viewport_size(&win);
        scheduler.borrow_mut().resize(width, height);
    }) as Box<dyn FnMut()>);

    window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())?;
    // Listener lives as long as the page
    on_resize.forget();
    Ok(())
}

fn listen_for_pointer(
    window: &Window,
    scheduler: Rc<RefCell<WebScheduler>>,
) -> Result<(), JsValue> {
    let on_move = Closure::wrap(Box::new(move |event: MouseEvent| {
        scheduler
            .borrow_mut()
            .set_pointer(event.client_x() as f32, event.client_y() as f32);
    }) as Box<dyn FnMut(MouseEvent)>);

    window.add_event_listener_with_callback("mousemove", on_move.as_ref().unchecked_ref())?;
    on_move.forget();
    Ok(())
}

/// Tick once per display refresh, forever
fn run_frame_loop(window: &Window, scheduler: Rc<RefCell<WebScheduler>>) -> Result<(), JsValue> {
    let callback: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let next = Rc::clone(&callback);
    let win = window.clone();

    *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        scheduler.borrow_mut().tick();

        if let Some(cb) = next.borrow().as_ref() {
            if let Err(e) = win.request_animation_frame(cb.as_ref().unchecked_ref()) {
                tracing::warn!(error = ?e, "failed to schedule next frame");
            }
        }
    }) as Box<dyn FnMut()>));

    let first = callback.borrow();
    if let Some(cb) = first.as_ref() {
        window.request_animation_frame(cb.as_ref().unchecked_ref())?;
    }
    Ok(())
}

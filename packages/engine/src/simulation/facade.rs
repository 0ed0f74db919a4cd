use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement, PointerEvent, ResizeObserver, ResizeObserverEntry,
    Window,
};

use crate::core::cursor;
use crate::domain::tags::brand_tags;
use crate::rigid_body::Vec2;
use crate::rigid_body_system::NativeBackend;

use super::{DrawCommand, HostSurface, LifecyclePhase, ListenerKind, TagCloudConfig, TagCloudCore, Viewport};

/// Body class that hides the native cursor while a cloud is live
const CURSOR_CLASS: &str = "custom-cursor-active";
/// `touch-action:none` so touch drags reach the pointer handlers instead of scrolling
const CANVAS_STYLE: &str = "position:absolute;inset:0;width:100%;height:100%;display:block;touch-action:none;";

struct DomHost {
    window: Window,
    container: HtmlElement,
}

impl HostSurface for DomHost {
    fn measure(&self) -> Viewport {
        Viewport::new(self.container.client_width() as f32, self.container.client_height() as f32)
    }

    fn window_width(&self) -> f32 {
        self.window
            .inner_width()
            .ok()
            .and_then(|w| w.as_f64())
            .unwrap_or(0.0) as f32
    }

    fn device_pixel_ratio(&self) -> f32 {
        self.window.device_pixel_ratio() as f32
    }
}

type Core = TagCloudCore<NativeBackend, DomHost>;
type FrameCallback = Closure<dyn FnMut(f64)>;

struct Shared {
    core: Core,
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
}

/// DOM resources owned by a mounted cloud.
struct Mounted {
    shared: Rc<RefCell<Shared>>,
    window: Window,
    raf_id: Rc<Cell<Option<i32>>>,
    frame_cb: Rc<RefCell<Option<FrameCallback>>>,
    observer: ResizeObserver,
    _resize_cb: Closure<dyn FnMut(js_sys::Array)>,
    pointer_cbs: Vec<(&'static str, Closure<dyn FnMut(PointerEvent)>)>,
}

impl Mounted {
    fn unmount(self) {
        if let Some(id) = self.raf_id.take() {
            let _ = self.window.cancel_animation_frame(id);
        }
        self.observer.disconnect();

        let mut shared = self.shared.borrow_mut();
        for (name, cb) in &self.pointer_cbs {
            let _ = shared
                .canvas
                .remove_event_listener_with_callback(name, cb.as_ref().unchecked_ref());
        }
        shared.core.teardown();
        shared.canvas.remove();
        drop(shared);

        // Break the frame closure's reference to itself.
        self.frame_cb.borrow_mut().take();
    }
}

fn now(window: &Window) -> f64 {
    window.performance().map(|p| p.now()).unwrap_or(0.0)
}

fn install_cursor_hook(window: &Window) {
    let Some(body) = window.document().and_then(|d| d.body()) else {
        return;
    };
    cursor::set_cursor_hook(move |hidden| {
        let _ = body.class_list().toggle_with_force(CURSOR_CLASS, hidden);
    });
}

fn request_frame(window: &Window, frame_cb: &Rc<RefCell<Option<FrameCallback>>>, raf_id: &Cell<Option<i32>>) {
    if let Some(cb) = frame_cb.borrow().as_ref() {
        raf_id.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
    }
}

fn rounded_rect(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) -> Result<(), JsValue> {
    let r = r.min(w / 2.0).min(h / 2.0).max(0.0);
    ctx.begin_path();
    ctx.move_to(x + r, y);
    ctx.arc_to(x + w, y, x + w, y + h, r)?;
    ctx.arc_to(x + w, y + h, x, y + h, r)?;
    ctx.arc_to(x, y + h, x, y, r)?;
    ctx.arc_to(x, y, x + w, y, r)?;
    ctx.close_path();
    Ok(())
}

/// Play a draw list onto a 2D context.
fn replay(canvas: &HtmlCanvasElement, ctx: &CanvasRenderingContext2d, commands: &[DrawCommand]) -> Result<(), JsValue> {
    for cmd in commands {
        match cmd {
            DrawCommand::Clear { width, height, pixel_ratio } => {
                let pw = (width * pixel_ratio).round() as u32;
                let ph = (height * pixel_ratio).round() as u32;
                if canvas.width() != pw {
                    canvas.set_width(pw);
                }
                if canvas.height() != ph {
                    canvas.set_height(ph);
                }
                let r = *pixel_ratio as f64;
                ctx.set_transform(r, 0.0, 0.0, r, 0.0, 0.0)?;
                ctx.clear_rect(0.0, 0.0, *width as f64, *height as f64);
            }
            DrawCommand::Save => ctx.save(),
            DrawCommand::Restore => ctx.restore(),
            DrawCommand::Translate { x, y } => ctx.translate(*x as f64, *y as f64)?,
            DrawCommand::Rotate(angle) => ctx.rotate(*angle as f64)?,
            DrawCommand::SetFont(font) => ctx.set_font(font),
            DrawCommand::SetTextAlign(align) => ctx.set_text_align(align.as_str()),
            DrawCommand::SetTextBaseline(baseline) => ctx.set_text_baseline(baseline.as_str()),
            DrawCommand::SetFillStyle(style) => ctx.set_fill_style_str(style),
            DrawCommand::SetStrokeStyle(style) => ctx.set_stroke_style_str(style),
            DrawCommand::SetLineWidth(width) => ctx.set_line_width(*width as f64),
            DrawCommand::RoundedRect { x, y, width, height, radius } => rounded_rect(
                ctx,
                *x as f64,
                *y as f64,
                *width as f64,
                *height as f64,
                *radius as f64,
            )?,
            DrawCommand::Fill => ctx.fill(),
            DrawCommand::Stroke => ctx.stroke(),
            DrawCommand::FillText { text, x, y } => ctx.fill_text(text, *x as f64, *y as f64)?,
        }
    }
    Ok(())
}

/// Browser handle for one tag cloud inside a container element.
#[wasm_bindgen]
pub struct TagCloud {
    mounted: Option<Mounted>,
}

#[wasm_bindgen]
impl TagCloud {
    /// Mount a cloud into `container`. An empty `labels` list uses the brand
    /// tags. `config_json` may be a partial config; missing fields keep their
    /// defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(container: HtmlElement, labels: Vec<String>, config_json: Option<String>) -> Result<TagCloud, JsValue> {
        let config = match config_json {
            Some(json) => TagCloudConfig::from_json(&json).map_err(|e| JsValue::from_str(&e.to_string()))?,
            None => TagCloudConfig::default(),
        };
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window.document().ok_or_else(|| JsValue::from_str("no document"))?;

        let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
        canvas.set_attribute("style", CANVAS_STYLE)?;
        container.append_child(&canvas)?;
        let context: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into()?;

        install_cursor_hook(&window);

        let labels = if labels.is_empty() { brand_tags() } else { labels };
        let seed = (js_sys::Math::random() * u32::MAX as f64) as u32;
        let host = DomHost {
            window: window.clone(),
            container: container.clone(),
        };
        let mut core = TagCloudCore::with_seed(NativeBackend::new(), host, config, labels, seed);
        core.mount(now(&window));

        let shared = Rc::new(RefCell::new(Shared { core, canvas: canvas.clone(), context }));

        let resize_cb = {
            let shared = shared.clone();
            Closure::<dyn FnMut(js_sys::Array)>::wrap(Box::new(move |entries: js_sys::Array| {
                let Some(entry) = entries.iter().last() else {
                    return;
                };
                let Ok(entry) = entry.dyn_into::<ResizeObserverEntry>() else {
                    return;
                };
                let rect = entry.content_rect();
                if let Ok(mut shared) = shared.try_borrow_mut() {
                    shared.core.resize(rect.width() as f32, rect.height() as f32);
                }
            }))
        };
        let observer = ResizeObserver::new(resize_cb.as_ref().unchecked_ref())?;
        observer.observe(&container);

        let mut pointer_cbs = Vec::new();
        for kind in ListenerKind::ALL.into_iter().filter(|k| *k != ListenerKind::Resize) {
            let name = kind.event_name();
            let shared = shared.clone();
            // Pointer events also carry touch and pen input.
            let cb = Closure::<dyn FnMut(PointerEvent)>::wrap(Box::new(move |e: PointerEvent| {
                let Ok(mut shared) = shared.try_borrow_mut() else {
                    return;
                };
                let point = Vec2::new(e.offset_x() as f32, e.offset_y() as f32);
                match kind {
                    ListenerKind::PointerDown => shared.core.pointer_down(point),
                    ListenerKind::PointerMove => shared.core.pointer_move(point),
                    ListenerKind::PointerUp => shared.core.pointer_up(point),
                    _ => shared.core.pointer_leave(),
                }
            }));
            canvas.add_event_listener_with_callback(name, cb.as_ref().unchecked_ref())?;
            pointer_cbs.push((name, cb));
        }

        let raf_id = Rc::new(Cell::new(None));
        let frame_cb: Rc<RefCell<Option<FrameCallback>>> = Rc::new(RefCell::new(None));
        {
            let shared = shared.clone();
            let window_loop = window.clone();
            let raf_loop = raf_id.clone();
            let cb_loop = frame_cb.clone();
            *frame_cb.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp: f64| {
                let keep_going = match shared.try_borrow_mut() {
                    Ok(mut shared) => {
                        let commands = shared.core.frame(timestamp);
                        if let Err(err) = replay(&shared.canvas, &shared.context, &commands) {
                            log::warn!("tag cloud draw failed: {err:?}");
                        }
                        !matches!(
                            shared.core.phase(),
                            LifecyclePhase::Destroyed | LifecyclePhase::Unavailable
                        )
                    }
                    // Busy with an event handler; try again next frame.
                    Err(_) => true,
                };
                if keep_going {
                    request_frame(&window_loop, &cb_loop, &raf_loop);
                } else {
                    raf_loop.set(None);
                }
            }) as Box<dyn FnMut(f64)>));
        }
        request_frame(&window, &frame_cb, &raf_id);

        Ok(TagCloud {
            mounted: Some(Mounted {
                shared,
                window,
                raf_id,
                frame_cb,
                observer,
                _resize_cb: resize_cb,
                pointer_cbs,
            }),
        })
    }

    /// Current lifecycle phase, for debugging
    pub fn phase(&self) -> String {
        match &self.mounted {
            Some(m) => format!("{:?}", m.shared.borrow().core.phase()),
            None => format!("{:?}", LifecyclePhase::Destroyed),
        }
    }

    pub fn tag_count(&self) -> usize {
        self.mounted
            .as_ref()
            .map_or(0, |m| m.shared.borrow().core.dynamic_count())
    }

    /// Tear down the current world and start over in the same container.
    pub fn reinitialize(&mut self) {
        let Some(m) = self.mounted.as_ref() else {
            return;
        };
        let now = now(&m.window);
        m.shared.borrow_mut().core.reinitialize(now);
        // The loop stops on its own once a cloud gives up.
        if m.raf_id.get().is_none() {
            request_frame(&m.window, &m.frame_cb, &m.raf_id);
        }
    }

    /// Remove everything this cloud added to the page. Safe to call twice.
    pub fn unmount(&mut self) {
        if let Some(mounted) = self.mounted.take() {
            mounted.unmount();
        }
    }
}

impl Drop for TagCloud {
    fn drop(&mut self) {
        self.unmount();
    }
}

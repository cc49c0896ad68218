//! WebXR platform glue
//!
//! Session negotiation, per-frame pose/hit-test sampling and the DOM
//! presenter. Requires `--cfg=web_sys_unstable_apis`.

use std::cell::Cell;
use std::rc::Rc;

use glam::{Mat4, Vec3};
use js_sys::{Array, Float32Array, Function, Object, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Document, HtmlCanvasElement, WebGlRenderingContext, XrFrame, XrHitTestOptionsInit,
    XrHitTestResult, XrHitTestSource, XrReferenceSpace, XrReferenceSpaceType, XrRenderStateInit,
    XrSession, XrSessionInit, XrSessionMode, XrView, XrViewerPose, XrWebGlLayer,
};

use super::PoseSource;
use crate::audio::AudioManager;
use crate::cues::SoundEffect;
use crate::error::SessionError;
use crate::presentation::{FrameSnapshot, HudState, Presenter};
use crate::settings::Settings;
use crate::sim::{FramePose, HitTestResult, Viewport};

/// Everything negotiated with the XR runtime for one session
pub struct XrContext {
    pub session: XrSession,
    pub gl: WebGlRenderingContext,
    pub local_space: XrReferenceSpace,
    pub hit_test_source: XrHitTestSource,
}

fn js_err(e: JsValue) -> String {
    e.as_string()
        .or_else(|| {
            e.dyn_ref::<js_sys::Error>()
                .map(|err| String::from(err.message()))
        })
        .unwrap_or_else(|| format!("{e:?}"))
}

fn set_prop(target: &JsValue, key: &str, value: &JsValue) -> Result<(), String> {
    Reflect::set(target, &JsValue::from_str(key), value)
        .map(|_| ())
        .map_err(js_err)
}

/// True if the browser can run an `immersive-ar` session
pub async fn is_ar_supported() -> bool {
    let Some(window) = web_sys::window() else {
        return false;
    };
    let navigator = window.navigator();
    // navigator.xr is missing entirely on most desktop browsers
    if !Reflect::has(&navigator, &JsValue::from_str("xr")).unwrap_or(false) {
        return false;
    }
    let promise = navigator.xr().is_session_supported(XrSessionMode::ImmersiveAr);
    JsFuture::from(promise)
        .await
        .map(|v| v.as_bool().unwrap_or(false))
        .unwrap_or(false)
}

/// Request the AR session, attach a WebGL layer and create the local
/// reference space plus a viewer-origin hit-test source.
pub async fn start_session(document: &Document) -> Result<XrContext, SessionError> {
    if !is_ar_supported().await {
        return Err(SessionError::Unsupported);
    }
    let window = web_sys::window().ok_or(SessionError::Unsupported)?;
    let xr = window.navigator().xr();

    let init = XrSessionInit::new();
    let features = Array::of2(
        &JsValue::from_str("hit-test"),
        &JsValue::from_str("dom-overlay"),
    );
    let overlay = Object::new();
    let body = document
        .body()
        .ok_or_else(|| SessionError::Graphics("document has no body".into()))?;
    set_prop(&overlay, "root", &body).map_err(SessionError::Options)?;
    set_prop(&init, "requiredFeatures", &features).map_err(SessionError::Options)?;
    set_prop(&init, "domOverlay", &overlay).map_err(SessionError::Options)?;

    let session: XrSession = JsFuture::from(
        xr.request_session_with_options(XrSessionMode::ImmersiveAr, &init),
    )
    .await
    .map_err(|e| SessionError::Denied(js_err(e)))?
    .unchecked_into();

    let gl = create_xr_canvas(document, &session)?;

    let local_space: XrReferenceSpace =
        JsFuture::from(session.request_reference_space(XrReferenceSpaceType::Local))
            .await
            .map_err(|_| SessionError::ReferenceSpace("local".into()))?
            .unchecked_into();
    let viewer_space: XrReferenceSpace =
        JsFuture::from(session.request_reference_space(XrReferenceSpaceType::Viewer))
            .await
            .map_err(|_| SessionError::ReferenceSpace("viewer".into()))?
            .unchecked_into();

    let options = XrHitTestOptionsInit::new(&viewer_space);
    let hit_test_source: XrHitTestSource =
        JsFuture::from(session.request_hit_test_source(&options))
            .await
            .map_err(|e| SessionError::HitTestSource(js_err(e)))?
            .unchecked_into();

    log::info!("XR session started");
    Ok(XrContext {
        session,
        gl,
        local_space,
        hit_test_source,
    })
}

/// Canvas + XR-compatible WebGL context bound as the session's base layer
fn create_xr_canvas(document: &Document, session: &XrSession) -> Result<WebGlRenderingContext, SessionError> {
    let graphics = |e: JsValue| SessionError::Graphics(js_err(e));

    let canvas: HtmlCanvasElement = document
        .create_element("canvas")
        .map_err(graphics)?
        .unchecked_into();
    if let Some(body) = document.body() {
        body.append_child(&canvas).map_err(graphics)?;
    }

    let attrs = Object::new();
    set_prop(&attrs, "xrCompatible", &JsValue::TRUE).map_err(SessionError::Graphics)?;
    let gl: WebGlRenderingContext = canvas
        .get_context_with_context_options("webgl", &attrs)
        .map_err(graphics)?
        .ok_or_else(|| SessionError::Graphics("WebGL unavailable".into()))?
        .unchecked_into();

    let layer = XrWebGlLayer::new_with_web_gl_rendering_context(session, &gl).map_err(graphics)?;
    let render_state = XrRenderStateInit::new();
    set_prop(&render_state, "baseLayer", &layer).map_err(SessionError::Graphics)?;
    session.update_render_state_with_state(&render_state);

    Ok(gl)
}

fn mat4_from(values: &[f32]) -> Option<Mat4> {
    (values.len() == 16).then(|| Mat4::from_cols_slice(values))
}

/// Pose source over a single `XRFrame`
pub struct XrFrameSource<'a> {
    pub frame: &'a XrFrame,
    pub ctx: &'a XrContext,
    /// Latest device-orientation gamma, shared with the event listener
    pub tilt: &'a Cell<Option<f32>>,
}

impl XrFrameSource<'_> {
    fn viewer_pose(&self) -> Option<XrViewerPose> {
        self.frame.get_viewer_pose(&self.ctx.local_space)
    }

    /// Bind the XR framebuffer and clear it so the camera feed shows through
    pub fn prepare_framebuffer(&self) {
        let gl = &self.ctx.gl;
        if let Some(layer) = self.ctx.session.render_state().base_layer() {
            gl.bind_framebuffer(WebGlRenderingContext::FRAMEBUFFER, layer.framebuffer().as_ref());
        }
        gl.clear_color(0.0, 0.0, 0.0, 0.0);
        gl.clear(WebGlRenderingContext::COLOR_BUFFER_BIT | WebGlRenderingContext::DEPTH_BUFFER_BIT);
    }
}

impl PoseSource for XrFrameSource<'_> {
    fn frame_pose(&mut self) -> Option<FramePose> {
        // Null while the runtime is still establishing tracking
        let pose = self.viewer_pose()?;
        // Mobile AR has exactly one view
        let view: XrView = pose.views().get(0).dyn_into().ok()?;

        let transform = mat4_from(&view.transform().matrix())?;
        let projection = mat4_from(&view.projection_matrix())?;
        let viewport = self
            .ctx
            .session
            .render_state()
            .base_layer()
            .and_then(|layer| layer.get_viewport(&view))
            .map(|vp| Viewport {
                x: vp.x(),
                y: vp.y(),
                width: vp.width(),
                height: vp.height(),
            })
            .unwrap_or_default();

        Some(FramePose {
            transform,
            projection,
            viewport,
        })
    }

    fn hit_test_results(&mut self) -> Vec<HitTestResult> {
        self.frame
            .get_hit_test_results(&self.ctx.hit_test_source)
            .iter()
            .filter_map(|r| r.dyn_into::<XrHitTestResult>().ok())
            .filter_map(|r| r.get_pose(&self.ctx.local_space))
            .filter_map(|pose| mat4_from(&pose.transform().matrix()))
            .map(|m| {
                let (_, orientation, pos) = m.to_scale_rotation_translation();
                HitTestResult { pos, orientation }
            })
            .collect()
    }

    fn tilt_gamma_deg(&mut self) -> Option<f32> {
        self.tilt.get()
    }
}

/// Track `deviceorientation` gamma into a shared cell
pub fn listen_for_tilt(tilt: Rc<Cell<Option<f32>>>) {
    let Some(window) = web_sys::window() else { return };
    let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::DeviceOrientationEvent| {
        tilt.set(event.gamma().map(|g| g as f32));
    });
    let _ = window
        .add_event_listener_with_callback("deviceorientation", closure.as_ref().unchecked_ref());
    closure.forget();
}

/// DOM overlay + audio presenter
pub struct DomPresenter {
    document: Document,
    hud: HudState,
    audio: AudioManager,
    settings: Settings,
    page_hidden: bool,
    /// Page renderer, called as `render(instances, view, projection)`
    render: Option<Function>,
}

impl DomPresenter {
    pub fn new(document: Document, settings: Settings, render: Option<Function>) -> Self {
        let audio = AudioManager::new(&settings);
        let presenter = Self {
            document,
            hud: HudState::default(),
            audio,
            settings,
            page_hidden: false,
            render,
        };
        presenter.show_mute_state();
        presenter
    }

    /// Silence audio while the page is hidden, if the player asked for it
    pub fn set_page_hidden(&mut self, hidden: bool) {
        self.page_hidden = hidden;
        self.apply_audio();
        log::debug!("Page hidden: {hidden}");
    }

    /// Flip the mute preference and persist it
    pub fn toggle_muted(&mut self) {
        let muted = self.settings.toggle_muted();
        self.settings.save();
        self.apply_audio();
        self.show_mute_state();
        log::info!("Muted: {muted}");
    }

    fn apply_audio(&mut self) {
        let effective = self.settings.effective(self.page_hidden);
        self.audio.apply_settings(&effective);
    }

    fn show_mute_state(&self) {
        if let Some(button) = self.document.get_element_by_id("mute-toggle") {
            let _ = button
                .class_list()
                .toggle_with_force("muted", self.settings.muted);
            button.set_text_content(Some(if self.settings.muted { "Unmute" } else { "Mute" }));
        }
    }

    /// Hand camera matrices and entity instances to the page renderer
    fn draw(&self, snapshot: &FrameSnapshot<'_>) {
        let Some(render) = &self.render else { return };
        let Some(frame) = snapshot.render_frame() else { return };

        let instances = Float32Array::from(frame.instance_floats());
        let view = Float32Array::from(&frame.view[..]);
        let projection = Float32Array::from(&frame.projection[..]);
        if let Err(e) = render.call3(&JsValue::NULL, &instances, &view, &projection) {
            log::error!("Render callback failed: {}", js_err(e));
        }
    }

    fn add_body_class(&self, class: &str) {
        if let Some(body) = self.document.body() {
            let _ = body.class_list().add_1(class);
        }
    }

    /// Enter AR mode: hides the 2D landing page
    pub fn on_session_started(&mut self) {
        self.add_body_class("ar");
        self.audio.resume();
    }
}

impl Presenter for DomPresenter {
    fn on_frame_update(&mut self, snapshot: &FrameSnapshot<'_>) {
        let hud = HudState::from_snapshot(snapshot);
        let changes = hud.changes_since(&self.hud);
        if !changes.is_empty() {
            if let (Some(text), true) = (changes.score_text, self.settings.show_score) {
                if let Some(el) = self.document.get_element_by_id("score-value") {
                    el.set_text_content(Some(text));
                }
            }
            for class in &changes.add_classes {
                self.add_body_class(class);
            }
        }
        self.hud = hud;
        self.draw(snapshot);

        if let Some(reticle) = self.document.get_element_by_id("reticle") {
            let _ = reticle
                .class_list()
                .toggle_with_force("hidden", !snapshot.reticle_visible);
        }
    }

    fn on_stabilized(&mut self) {
        self.audio.play(SoundEffect::LockOn);
    }

    fn on_game_started(&mut self) {
        self.audio.play(SoundEffect::GameStart);
        self.audio.start_ambient();
    }

    fn on_hit(&mut self, _pos: Vec3) {
        self.audio.play(SoundEffect::Explosion);
    }

    fn on_asteroid_reached_player(&mut self) {
        self.audio.play(SoundEffect::Impact);
    }

    fn on_session_error(&mut self, error: &SessionError) {
        log::error!("{error}");
        self.add_body_class("unsupported");
        if let Some(el) = self.document.get_element_by_id("error-message") {
            el.set_text_content(Some(&error.to_string()));
        }
    }

    fn on_session_ended(&mut self) {
        self.audio.stop_ambient();
        if let Some(body) = self.document.body() {
            let _ = body.class_list().remove_1("ar");
        }
    }
}

//! Application event loop.
//!
//! [`run`] opens a window (the `canvas` element on the web), sets up the GPU
//! context, mounts the [`SynthwaveScene`] and drives it from winit's
//! `RedrawRequested`:
//!
//! 1. Tick the frame clock
//! 2. Write the elapsed time into animated materials
//! 3. Sync GPU buffers with the scene graph
//! 4. Draw the scene and the post-processing chain, present
//!
//! Asset loads queued by the scene run off the render path (tokio tasks
//! natively, `spawn_local` on the web) and come back as
//! [`FlowEvent::AssetLoaded`] user events.

use std::{fmt::Debug, sync::Arc};

use anyhow::Context as _;
use futures::{StreamExt, stream::FuturesUnordered};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::Window,
};

use crate::{
    animation::FrameClock,
    config::SceneConfig,
    context::Context,
    render::Renderer,
    scene::{AssetRequest, LoadedAsset, SynthwaveScene, assets},
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub(crate) struct AppState {
    ctx: Context,
    renderer: Renderer,
    scene: SynthwaveScene,
    clock: FrameClock,
}

impl AppState {
    async fn new(window: Arc<Window>, config: SceneConfig) -> anyhow::Result<Self> {
        let ctx = Context::new(window).await?;
        let [width, height] = ctx.size();
        let renderer = Renderer::new(&ctx.device, ctx.config.format, ctx.size(), ctx.line_mode, &config)?;
        let scene = SynthwaveScene::mount(width, height, config);
        Ok(Self {
            ctx,
            renderer,
            scene,
            clock: FrameClock::new(),
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if !self.ctx.resize(width, height) {
            return;
        }
        if let Err(e) = self.renderer.resize(&self.ctx.device, self.ctx.size()) {
            log::error!("Unable to resize render targets: {e:#}");
        }
        self.scene.resize(width, height);
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let frame = self.clock.tick();
        self.scene.advance(frame.elapsed);
        self.renderer
            .prepare(&self.ctx.device, &self.ctx.queue, &self.scene);

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.renderer
            .render(&self.ctx.device, &self.ctx.queue, &view, frame.elapsed);
        output.present();

        if frame.frame_index % 600 == 0 {
            log::debug!(
                "frame {} at {:.1}s, {} meshes, dt {:.1}ms",
                frame.frame_index,
                frame.elapsed,
                self.renderer.mesh_count(),
                frame.dt * 1000.0
            );
        }
        Ok(())
    }
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<FlowEvent>,
    state: Option<AppState>,
    // Taken once the window exists.
    config: Option<SceneConfig>,
}

impl App {
    fn new(event_loop: &EventLoop<FlowEvent>, config: SceneConfig) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new().context("starting the tokio runtime")?;
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            state: None,
            config: Some(config),
        })
    }

    /// Hands every queued asset load to the async side. Loads run
    /// concurrently and each completion is posted as soon as it is ready.
    fn spawn_loads(&self, requests: Vec<AssetRequest>) {
        if requests.is_empty() {
            return;
        }
        log::debug!("loading {} assets", requests.len());
        let mut pending: FuturesUnordered<_> = requests.into_iter().map(assets::load).collect();
        let proxy = self.proxy.clone();
        let fut = async move {
            while let Some(loaded) = pending.next().await {
                if let Err(e) = proxy.send_event(FlowEvent::AssetLoaded(loaded)) {
                    log::warn!("event loop closed before an asset arrived: {e}");
                    return;
                }
            }
        };

        #[cfg(not(target_arch = "wasm32"))]
        self.async_runtime.spawn(fut);

        #[cfg(target_arch = "wasm32")]
        wasm_bindgen_futures::spawn_local(fut);
    }

    fn start(&mut self, mut state: AppState) {
        let size = state.ctx.window.inner_size();
        state.resize(size.width, size.height);
        let requests = state.scene.take_requests();
        state.ctx.window.request_redraw();
        self.state = Some(state);
        self.spawn_loads(requests);
    }
}

pub(crate) enum FlowEvent {
    #[allow(dead_code)]
    Initialized(AppState),
    AssetLoaded(LoadedAsset),
    #[allow(dead_code)]
    Exit,
}

impl Debug for FlowEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized(_) => f.write_str("Initialized"),
            Self::AssetLoaded(loaded) => f
                .debug_struct("AssetLoaded")
                .field("path", &loaded.path)
                .field("ok", &loaded.result.is_ok())
                .finish(),
            Self::Exit => f.write_str("Exit"),
        }
    }
}

impl ApplicationHandler<FlowEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(config) = self.config.take() else {
            // Already initialised; winit resumes again after a suspend.
            return;
        };

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title("synthwave");

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let canvas = web_sys::window()
                .and_then(|window| window.document())
                .and_then(|document| document.get_element_by_id(CANVAS_ID));
            match canvas {
                Some(canvas) => {
                    window_attributes = window_attributes.with_canvas(Some(canvas.unchecked_into()));
                }
                None => log::warn!("no #{CANVAS_ID} element, winit creates its own canvas"),
            }
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Unable to create a window: {e}");
                event_loop.exit();
                return;
            }
        };

        let init_future = AppState::new(window, config);

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.async_runtime.block_on(init_future) {
                Ok(state) => self.start(state),
                Err(e) => {
                    log::error!("Unable to initialise the renderer: {e:#}");
                    event_loop.exit();
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match init_future.await {
                    Ok(state) => {
                        if proxy.send_event(FlowEvent::Initialized(state)).is_err() {
                            log::error!("event loop closed during initialisation");
                        }
                    }
                    Err(e) => {
                        log::error!("Unable to initialise the renderer: {e:#}");
                        let _ = proxy.send_event(FlowEvent::Exit);
                    }
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: FlowEvent) {
        match event {
            FlowEvent::Initialized(state) => {
                // This is the message from our wasm `spawn_local`
                self.start(state);
            }
            FlowEvent::AssetLoaded(loaded) => {
                if let Some(state) = &mut self.state {
                    if state.scene.resolve(loaded) {
                        state.ctx.window.request_redraw();
                    }
                }
            }
            FlowEvent::Exit => event_loop.exit(),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::RedrawRequested => {
                match state.render() {
                    Ok(()) => {}
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = state.ctx.window.inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of GPU memory, exiting");
                        event_loop.exit();
                        return;
                    }
                    Err(e) => {
                        log::error!("Unable to render {}", e);
                    }
                }
                state.ctx.window.request_redraw();
            }
            _ => {}
        }
    }
}

/// Runs the scene with the default configuration until the window closes.
pub fn run() -> anyhow::Result<()> {
    run_with_config(SceneConfig::default())
}

pub fn run_with_config(config: SceneConfig) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }

    let event_loop: EventLoop<FlowEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, config)?;

    log::info!("starting the event loop");
    event_loop.run_app(&mut app)?;

    Ok(())
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    run().map_err(|e| JsValue::from_str(&format!("{e:#}")))
}

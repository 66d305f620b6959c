use env_logger::Env;

fn main() {
    let env = Env::default()
        .filter_or("COBALT_LOG", "info")
        .write_style_or("COBALT_LOG_STYLE", "auto");
    env_logger::init_from_env(env);

    run();
}

#[cfg(not(windows))]
fn run() {
    eprintln!("cobalt renders through D3D12 and only runs on Windows.");
    std::process::exit(1);
}

#[cfg(windows)]
fn run() {
    use cobalt::error::Result;
    use cobalt::frame::{SizeEvent, SizeKind};
    use cobalt::graphics::renderer::Renderer;
    use cobalt::timer::FrameTimer;
    use cobalt::{FrameApp, InitParams};

    use log::error;

    use winit::dpi::LogicalSize;
    use winit::event::{Event, WindowEvent};
    use winit::event_loop::{ControlFlow, EventLoop};
    use winit::window::WindowBuilder;

    /// Minimal content collaborator: the frame loop clears the back and
    /// depth buffers; there is nothing else to record.
    struct ClearScreen;

    impl FrameApp for ClearScreen {
        fn update(&mut self, _timer: &FrameTimer) {}

        fn draw(&mut self, _renderer: &mut Renderer) -> Result<()> {
            Ok(())
        }
    }

    let params = InitParams::new("cobalt".to_string(), 1400, 800);
    let title = params.window_title.clone();

    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title(&params.window_title)
        .with_inner_size(LogicalSize::new(
            f64::from(params.window_width),
            f64::from(params.window_height),
        ))
        .with_min_inner_size(LogicalSize::new(200.0, 200.0))
        .build(&event_loop)
        .expect("failed to create window");

    let mut renderer = match Renderer::new(&window, &params) {
        Ok(renderer) => renderer,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };
    let mut app = ClearScreen;
    let mut timer = FrameTimer::new();
    timer.reset();

    let mut frame_count: u32 = 0;
    let mut elapsed: f64 = 0.0;

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;
        match event {
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } => {
                *control_flow = ControlFlow::Exit;
            }
            Event::WindowEvent {
                event: WindowEvent::Resized(size),
                ..
            } => {
                // winit reports minimize as a zero-sized client area.
                let kind = if size.width == 0 || size.height == 0 {
                    SizeKind::Minimized
                } else {
                    SizeKind::Restored
                };
                if kind == SizeKind::Minimized {
                    timer.stop();
                } else {
                    timer.start();
                }
                if let Err(e) = renderer.handle_size_event(SizeEvent::Resized {
                    width: size.width,
                    height: size.height,
                    kind,
                }) {
                    error!("{}", e);
                    *control_flow = ControlFlow::Exit;
                }
            }
            Event::MainEventsCleared => {
                timer.tick();
                if renderer.is_paused() {
                    return;
                }

                frame_count += 1;
                if timer.total_time() - elapsed >= 1.0 {
                    let frame_time = 1000.0 / f64::from(frame_count);
                    window.set_title(&format!(
                        "{} [FPS {} - {:.2}ms]",
                        title, frame_count, frame_time
                    ));
                    frame_count = 0;
                    elapsed += 1.0;
                }

                app.update(&timer);

                let frame = renderer
                    .prepare()
                    .and_then(|_| {
                        renderer.clear();
                        app.draw(&mut renderer)
                    })
                    .and_then(|_| renderer.present());
                if let Err(e) = frame {
                    error!("{}", e);
                    *control_flow = ControlFlow::Exit;
                }
            }
            _ => {}
        }
    });
}

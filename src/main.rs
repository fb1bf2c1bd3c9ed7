use anyhow::{Context, Result};
use clap::Parser;

use blitwin::backends::{HeadlessBackend, WgpuContext, WinitBackend};
use blitwin::cli::Cli;
use blitwin::core::{Backbuffer, Clock, FpsCounter};
use blitwin::traits::{Backend, NativeWindow};
use blitwin::{Action, ClientApi, KeyCode, ResizeEvent, Runtime, WindowConfig};

type HardwareContext<B> = <<B as Backend>::Window as NativeWindow>::Context;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = cli.window_config().context("failed to load window config")?;

    if cli.headless {
        run(Runtime::new(HeadlessBackend::new()), &cli, &config, |_, _| {})
    } else {
        let backend = WinitBackend::new().context("failed to start the event loop")?;
        run(Runtime::new(backend), &cli, &config, |context: &mut WgpuContext, t| {
            context.clear(wgpu::Color {
                r: 0.5 + 0.5 * t.sin(),
                g: 0.3,
                b: 0.5 + 0.5 * t.cos(),
                a: 1.0,
            });
        })
    }
}

fn run<B, F>(mut runtime: Runtime<B>, cli: &Cli, config: &WindowConfig, mut draw_hardware: F) -> Result<()>
where
    B: Backend,
    F: FnMut(&mut HardwareContext<B>, f64),
{
    let mut session = runtime
        .create_session(config)
        .context("failed to create window session")?;

    if let Some(icon) = &cli.icon {
        if let Err(e) = session.set_icon(icon) {
            log::warn!("icon {} not applied: {}", icon.display(), e);
        }
    }

    runtime.set_swap_interval(cli.swap_interval);

    session.set_key_callback(Some(Box::new(|code: KeyCode, action: Action| {
        log::debug!("key {:?} {:?}", code, action);
    })));
    session.set_drop_callback(Some(Box::new(|paths: &[std::path::PathBuf]| {
        for path in paths {
            log::info!("dropped {}", path.display());
        }
    })));
    session.set_resize_callback(Some(Box::new(|event: ResizeEvent| {
        log::info!(
            "resized to {}x{} (backbuffer {:?})",
            event.size.width,
            event.size.height,
            event.backbuffer
        );
    })));

    let software = config.hints.client_api == ClientApi::NoApi;
    if software {
        session.set_backbuffer_follows_resize(!cli.fixed_backbuffer);
        // 0x0 takes the current client size
        if session.create_backbuffer(0, 0).is_none() {
            anyhow::bail!("failed to allocate the backbuffer");
        }
    }

    let mut clock = Clock::new();
    let mut fps = FpsCounter::new();
    let mut frame: u64 = 0;

    while !session.should_close() {
        session.poll_events(&mut runtime);
        if session.key_down(KeyCode::Escape) {
            session.set_should_close(true);
        }

        let t = runtime.time();
        if software {
            if let Some(buffer) = session.backbuffer_mut() {
                draw_gradient(buffer, t);
            }
            session.present_backbuffer();
            runtime.wait_for_next_slot(session.refresh_rate());
        } else {
            if let Some(context) = session.graphics_mut() {
                draw_hardware(context, t);
            }
            session.swap_buffers(&runtime);
        }

        if let Some(rate) = fps.record(clock.tick()) {
            session.set_title(&format!("{} - {:.0} fps", config.title, rate));
            log::info!("{:.1} fps", rate);
        }

        frame += 1;
        if cli.frames.is_some_and(|limit| frame >= limit) {
            break;
        }
    }

    session.destroy();
    Ok(())
}

/// Scrolling XOR pattern
fn draw_gradient<S>(buffer: &mut Backbuffer<S>, t: f64) {
    let offset = (t * 60.0) as u32;
    let width = buffer.width();
    for y in 0..buffer.height() {
        if let Some(row) = buffer.row_mut(y) {
            for (x, pixel) in (0..width).zip(row.iter_mut()) {
                let r = (x + offset) & 0xFF;
                let g = (y + offset / 2) & 0xFF;
                let b = (x ^ y) & 0xFF;
                *pixel = 0xFF00_0000 | (r << 16) | (g << 8) | b;
            }
        }
    }
}

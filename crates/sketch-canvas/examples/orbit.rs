// Off-screen sketch: a ring of rotating rounded squares, saved every
// tenth frame as PNG. Pass `--pdf` to write a two-page document instead.
//
//     RUST_LOG=debug cargo run -p sketch-canvas --example orbit

use sketch_canvas::{
    Backend, Canvas, CanvasConfig, CanvasError, CornerRadii, Result, SurfaceError,
};

const FRAMES: u64 = 30;

fn draw(canvas: &mut Canvas, t: f64) -> Result<()> {
    let (cx, cy) = (canvas.width() as f64 / 2.0, canvas.height() as f64 / 2.0);
    canvas.background(0.08, 0.08, 0.1, 1.0)?;
    canvas.stroke(1.0, 1.0, 1.0, 0.6);
    canvas.stroke_weight(2.0);

    for i in 0..12 {
        let angle = i as f64 * 30.0 + t * 3.0;
        canvas.push()?;
        canvas.translate(cx, cy)?;
        canvas.rotate(angle)?;
        canvas.fill(i as f32 / 12.0, 0.4, 1.0 - i as f32 / 12.0, 1.0);
        canvas.rect(120.0, -15.0, 30.0, 30.0, CornerRadii::uniform(8.0))?;
        canvas.pop()?;
    }

    canvas.no_stroke();
    canvas.fill(1.0, 0.85, 0.2, 1.0);
    canvas.circle(cx, cy, 60.0 + 10.0 * (t / 5.0).sin())?;
    canvas.text_size(24.0);
    match canvas.text("orbit", cx - 30.0, cy + 200.0) {
        Err(CanvasError::Surface(SurfaceError::Font(e))) => log::warn!("label skipped: {e}"),
        other => other?,
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    if std::env::args().any(|a| a == "--pdf") {
        let config = CanvasConfig::new(400, 400)
            .with_backend(Backend::Document)
            .with_output("orbit.pdf");
        let mut canvas = Canvas::new(config)?;
        draw(&mut canvas, 0.0)?;
        canvas.add_page(None, None)?;
        draw(&mut canvas, 15.0)?;
        return canvas.save_pdf();
    }

    let mut canvas = Canvas::new(CanvasConfig::new(400, 400))?;
    for frame in 0..FRAMES {
        draw(&mut canvas, frame as f64)?;
        if frame % 10 == 0 {
            let path = canvas.save_frame(Some("orbit.png"))?;
            log::info!("wrote {}", path.display());
        }
        if canvas.animate()?.is_stop() {
            break;
        }
    }
    Ok(())
}

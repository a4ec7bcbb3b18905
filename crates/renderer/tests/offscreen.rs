use renderer::{ContextError, OffscreenRenderer, RendererConfig, TRIANGLE_POINTS};

const SIZE: u32 = 64;
const PURPLE: [u8; 4] = [128, 0, 128, 255];
const BLACK: [u8; 4] = [0, 0, 0, 255];

/// Returns `None` when the machine has no usable adapter; any other failure panics.
fn offscreen() -> Option<OffscreenRenderer> {
    match OffscreenRenderer::new(&RendererConfig::default(), (SIZE, SIZE)) {
        Ok(renderer) => Some(renderer),
        Err(err) if err.downcast_ref::<ContextError>().is_some() => {
            eprintln!("skipping GPU test: {err:#}");
            None
        }
        Err(err) => panic!("failed to build offscreen renderer: {err:#}"),
    }
}

fn assert_close(actual: [u8; 4], expected: [u8; 4]) {
    for (channel, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        assert!(
            a.abs_diff(*e) <= 1,
            "channel {channel}: got {actual:?}, expected {expected:?}"
        );
    }
}

#[test]
fn vertex_buffer_reads_back_the_uploaded_points() {
    let Some(renderer) = offscreen() else {
        return;
    };
    let data = renderer.vertex_data().unwrap();
    assert_eq!(data, TRIANGLE_POINTS.to_vec());
}

#[test]
fn triangle_interior_is_purple_and_exterior_is_clear_color() {
    let Some(renderer) = offscreen() else {
        return;
    };
    let frame = renderer.render_frame().unwrap();
    assert_eq!(frame.width, SIZE);
    assert_eq!(frame.height, SIZE);
    assert_eq!(frame.pixels.len(), (SIZE * SIZE * 4) as usize);

    assert_close(frame.pixel(SIZE / 2, SIZE / 2).unwrap(), PURPLE);
    for (x, y) in [(0, 0), (SIZE - 1, 0), (0, SIZE - 1), (SIZE - 1, SIZE - 1)] {
        assert_eq!(frame.pixel(x, y).unwrap(), BLACK, "corner ({x}, {y})");
    }
    // Above the apex (clip y = 0.5 sits at row SIZE / 4).
    assert_eq!(frame.pixel(SIZE / 2, SIZE / 8).unwrap(), BLACK);
}

#[test]
fn consecutive_frames_are_pixel_identical() {
    let Some(renderer) = offscreen() else {
        return;
    };
    let first = renderer.render_frame().unwrap();
    for _ in 0..3 {
        assert_eq!(renderer.render_frame().unwrap(), first);
    }
    assert_eq!(renderer.plan().draw.vertices, 0..3);
}

#[test]
fn adapter_summary_has_two_labelled_lines() {
    let Some(renderer) = offscreen() else {
        return;
    };
    let [name, version] = renderer.adapter_profile().summary_lines();
    assert!(name.starts_with("Renderer: "));
    assert!(version.starts_with("Graphics API version supported: "));
}

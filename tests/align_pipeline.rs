use thermalign::{align, warp_perspective, Homography, Raster};

/// Blocky texture with strong corners every 8 pixels.
fn textured_gray(width: usize, height: usize) -> Raster {
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            data.push(((((x / 8) * 13) ^ ((y / 8) * 7) ^ ((x / 8) * (y / 8))) & 0xFF) as u8);
        }
    }
    Raster::from_vec(data, width, height, 1).unwrap()
}

fn textured_rgb(width: usize, height: usize) -> Raster {
    let gray = textured_gray(width, height);
    let mut data = Vec::with_capacity(width * height * 3);
    for &v in gray.data() {
        data.extend_from_slice(&[v, v ^ 0x3F, 255 - v]);
    }
    Raster::from_vec(data, width, height, 3).unwrap()
}

fn noise(width: usize, height: usize, channels: usize, mut state: u64) -> Raster {
    let mut data = Vec::with_capacity(width * height * channels);
    for _ in 0..width * height * channels {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        data.push((state >> 56) as u8);
    }
    Raster::from_vec(data, width, height, channels).unwrap()
}

fn mean_abs_error(a: &Raster, b: &Raster, margin: usize) -> f64 {
    assert_eq!(a.width(), b.width());
    assert_eq!(a.height(), b.height());
    assert_eq!(a.channels(), b.channels());
    let mut total = 0.0f64;
    let mut count = 0usize;
    for y in margin..a.height() - margin {
        for x in margin..a.width() - margin {
            for c in 0..a.channels() {
                let pa = a.sample(x, y, c).unwrap() as f64;
                let pb = b.sample(x, y, c).unwrap() as f64;
                total += (pa - pb).abs();
                count += 1;
            }
        }
    }
    total / count as f64
}

#[test]
fn output_always_takes_rgb_dimensions() {
    let cases = [
        (textured_gray(160, 120), textured_gray(200, 150)),
        (Raster::filled(160, 120, 3, 90).unwrap(), textured_rgb(96, 128)),
        (noise(64, 64, 1, 11), noise(120, 48, 3, 29)),
    ];
    for (thermal, rgb) in &cases {
        let out = align(thermal, rgb).unwrap();
        assert_eq!(out.width(), rgb.width());
        assert_eq!(out.height(), rgb.height());
        assert_eq!(out.channels(), thermal.channels());
    }
}

#[test]
fn translated_scene_is_recovered() {
    let rgb = textured_gray(320, 240);
    // The thermal view sees the scene shifted by (7, 4) pixels.
    let shift = Homography::from_array([[1.0, 0.0, 7.0], [0.0, 1.0, 4.0], [0.0, 0.0, 1.0]])
        .unwrap();
    let thermal = warp_perspective(&rgb, &shift, 320, 240).unwrap().unwrap();

    let out = align(&thermal, &rgb).unwrap();
    let err = mean_abs_error(&out, &rgb, 16);
    assert!(err < 8.0, "mean interior error too high: {err}");
}

#[test]
fn mild_projective_warp_is_recovered() {
    let rgb = textured_rgb(320, 240);
    let warp = Homography::from_array([
        [1.01, 0.004, 5.0],
        [-0.003, 0.995, 3.0],
        [2e-5, 1e-5, 1.0],
    ])
    .unwrap();
    let thermal = warp_perspective(&rgb, &warp, 320, 240).unwrap().unwrap();

    let out = align(&thermal, &rgb).unwrap();
    let err = mean_abs_error(&out, &rgb, 24);
    assert!(err < 20.0, "mean interior error too high: {err}");

    // The uniform-resize fallback would leave the scene displaced; make
    // sure the geometric path did better than that.
    let fallback_err = mean_abs_error(&thermal, &rgb, 24);
    assert!(err < fallback_err / 2.0);
}

#[test]
fn pathological_inputs_never_error() {
    let solid = Raster::filled(64, 48, 1, 200).unwrap();
    let cases = [
        (solid.clone(), solid.clone()),
        (noise(64, 64, 3, 5), noise(64, 64, 3, 7)),
        (noise(31, 97, 1, 13), textured_rgb(97, 31)),
        (textured_gray(80, 80), Raster::filled(160, 40, 3, 0).unwrap()),
    ];
    for (thermal, rgb) in &cases {
        let out = align(thermal, rgb).unwrap();
        assert_eq!(out.width(), rgb.width());
        assert_eq!(out.height(), rgb.height());
        assert_eq!(out.data().len(), rgb.width() * rgb.height() * thermal.channels());
    }
}

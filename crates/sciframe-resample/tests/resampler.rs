use pretty_assertions::assert_eq;
use sciframe_resample::{
    BoundaryOp, Kernel, ResampleError, Resampler, ResamplerConfig, Sample, Status,
};

fn real(values: &[f64]) -> Vec<Sample> {
    values.iter().map(|&v| Sample::new(v, 0.0)).collect()
}

fn run(
    src: &[Vec<Sample>],
    dst_x: usize,
    dst_y: usize,
    config: ResamplerConfig,
) -> Vec<Vec<Sample>> {
    let src_x = src[0].len();
    let mut r = Resampler::new(src_x, src.len(), dst_x, dst_y, config).unwrap();
    let mut out = Vec::new();
    for line in src {
        if !r.put_line(line) {
            assert_eq!(r.status(), Status::ScanBufferFull);
            while let Some(dst) = r.get_line() {
                out.push(dst.to_vec());
            }
            assert!(r.put_line(line));
        }
        while let Some(dst) = r.get_line() {
            out.push(dst.to_vec());
        }
    }
    out
}

#[test]
fn identity_resampling_is_exact() {
    let src: Vec<Vec<Sample>> = (0..5)
        .map(|y| real(&[y as f64, 10.0 + y as f64, -3.5 * y as f64]))
        .collect();
    let out = run(&src, 3, 5, ResamplerConfig::default());
    assert_eq!(out, src);
}

#[test]
fn constant_input_stays_constant() {
    let src: Vec<Vec<Sample>> = (0..9).map(|_| real(&[4.0; 6])).collect();
    for (dst_x, dst_y) in [(3, 4), (11, 17), (6, 2)] {
        let out = run(&src, dst_x, dst_y, ResamplerConfig::default());
        assert_eq!(out.len(), dst_y);
        for line in &out {
            assert_eq!(line.len(), dst_x);
            for s in line {
                assert!((s.re - 4.0).abs() < 1e-9, "{dst_x}x{dst_y}: {s}");
                assert_eq!(s.im, 0.0);
            }
        }
    }
}

#[test]
fn imaginary_parts_are_resampled_independently() {
    let src: Vec<Vec<Sample>> = (0..4).map(|_| vec![Sample::new(1.0, -2.0); 4]).collect();
    let out = run(&src, 7, 7, ResamplerConfig::default());
    for s in out.iter().flatten() {
        assert!((s.re - 1.0).abs() < 1e-9);
        assert!((s.im + 2.0).abs() < 1e-9);
    }
}

#[test]
fn full_scan_buffer_requires_draining_before_retry() {
    let config = ResamplerConfig {
        scan_buffer_lines: 1,
        ..ResamplerConfig::default()
    };
    let mut r = Resampler::new(2, 3, 2, 3, config).unwrap();
    assert_eq!(r.scan_buffer_lines(), 1);

    let line0 = real(&[1.0, 2.0]);
    let line1 = real(&[3.0, 4.0]);
    assert!(r.put_line(&line0));
    assert!(!r.put_line(&line1));
    assert_eq!(r.status(), Status::ScanBufferFull);

    assert_eq!(r.get_line().map(<[Sample]>::to_vec), Some(line0));
    assert!(r.get_line().is_none());

    assert!(r.put_line(&line1));
    assert_eq!(r.status(), Status::Okay);
    assert_eq!(r.get_line().map(<[Sample]>::to_vec), Some(line1));
}

#[test]
fn scan_buffer_is_raised_to_kernel_window() {
    let config = ResamplerConfig {
        scan_buffer_lines: 1,
        ..ResamplerConfig::default()
    };
    let r = Resampler::new(4, 40, 4, 10, config).unwrap();
    assert!(r.scan_buffer_lines() > 1);

    let src: Vec<Vec<Sample>> = (0..40).map(|y| real(&[y as f64; 4])).collect();
    let out = run(&src, 4, 10, config);
    assert_eq!(out.len(), 10);
}

#[test]
fn no_output_before_input() {
    let mut r = Resampler::new(3, 3, 6, 6, ResamplerConfig::default()).unwrap();
    assert!(r.get_line().is_none());
}

#[test]
fn extra_and_malformed_lines_are_rejected() {
    let mut r = Resampler::new(2, 1, 2, 1, ResamplerConfig::default()).unwrap();
    assert!(!r.put_line(&real(&[1.0])));
    assert_eq!(r.status(), Status::BadLineLength);
    assert!(r.put_line(&real(&[1.0, 2.0])));
    assert!(!r.put_line(&real(&[1.0, 2.0])));
    assert_eq!(r.status(), Status::SourceExhausted);
}

#[test]
fn zero_dimensions_are_rejected() {
    let err = Resampler::new(0, 4, 3, 3, ResamplerConfig::default()).unwrap_err();
    assert_eq!(
        err,
        ResampleError::InvalidDimensions {
            src_x: 0,
            src_y: 4,
            dst_x: 3,
            dst_y: 3
        }
    );

    let config = ResamplerConfig {
        kernel: Kernel::Lanczos { lobes: 0 },
        boundary: BoundaryOp::Reflect,
        ..ResamplerConfig::default()
    };
    assert_eq!(
        Resampler::new(2, 2, 2, 2, config).unwrap_err(),
        ResampleError::InvalidKernel
    );
}

#[test]
fn linear_ramp_survives_upsampling_in_the_interior() {
    let ramp: Vec<f64> = (0..32).map(f64::from).collect();
    let src = vec![real(&ramp)];
    let out = run(&src, 64, 1, ResamplerConfig::default());
    let line = &out[0];
    // Output sample i is centered on source coordinate (i + 0.5) / 2 - 0.5.
    for (i, s) in line.iter().enumerate().skip(16).take(32) {
        let expected = (i as f64 + 0.5) / 2.0 - 0.5;
        assert!((s.re - expected).abs() < 5e-2, "sample {i}: {} vs {expected}", s.re);
    }
}

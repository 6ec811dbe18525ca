use pretty_assertions::assert_eq;
use sciframe_table::{
    is_missing, AppDir, SmoothFilter, SmoothOptions, Table, TableError, Value, VectorIndex,
};

const N: f64 = f64::NAN;

fn table(rows: &[&[f64]]) -> Table {
    let mut t = Table::new();
    for (i, row) in rows.iter().enumerate() {
        for (j, &x) in row.iter().enumerate() {
            if !x.is_nan() {
                t.write_data(i, j, Value::new(x, 0.0)).unwrap();
            }
        }
    }
    t
}

fn column(t: &Table, j: usize, rows: usize) -> Vec<f64> {
    (0..rows).map(|i| t.read_mem(i, j).re).collect()
}

fn window(filter: SmoothFilter, rows: usize, cols: usize) -> SmoothOptions {
    SmoothOptions {
        filter,
        rows,
        cols,
        ..SmoothOptions::default()
    }
}

fn all() -> VectorIndex {
    VectorIndex::all()
}

#[test]
fn spike_spreads_over_the_window() {
    let mut t = table(&[&[0.0], &[0.0], &[0.0], &[3.0], &[0.0], &[0.0], &[0.0]]);
    t.set_save_status(true);

    t.smooth(&all(), &all(), &window(SmoothFilter::WeightedLinear, 3, 1), AppDir::Cols)
        .unwrap();

    assert_eq!(column(&t, 0, 7), vec![0.0, 0.0, 0.75, 1.5, 0.75, 0.0, 0.0]);
    assert!(!t.save_status());
}

#[test]
fn column_ends_repeat_the_edge_cells() {
    let mut t = table(&[&[0.0], &[3.0], &[6.0], &[9.0]]);
    t.smooth(&all(), &all(), &window(SmoothFilter::Average, 3, 1), AppDir::Cols)
        .unwrap();
    assert_eq!(column(&t, 0, 4), vec![1.0, 3.0, 6.0, 8.0]);
}

#[test]
fn missing_cells_stay_missing_and_are_skipped() {
    let mut t = table(&[&[0.0], &[N], &[6.0], &[6.0]]);
    t.smooth(&all(), &all(), &window(SmoothFilter::Average, 3, 1), AppDir::Cols)
        .unwrap();
    assert_eq!(t.read_mem(0, 0), Value::new(0.0, 0.0));
    assert!(is_missing(t.read_mem(1, 0)));
    assert_eq!(t.read_mem(2, 0), Value::new(6.0, 0.0));
    assert_eq!(t.read_mem(3, 0), Value::new(6.0, 0.0));
}

#[test]
fn few_rows_smooth_along_the_rows() {
    let mut t = table(&[&[0.0, 0.0, 3.0, 0.0, 0.0], &[5.0, 5.0, 5.0, 5.0, 5.0]]);
    // Both rows are selected but too few for 2-D; the window runs along each row.
    t.smooth(&all(), &all(), &window(SmoothFilter::Average, 1, 3), AppDir::All)
        .unwrap();
    let first: Vec<f64> = (0..5).map(|j| t.read_mem(0, j).re).collect();
    assert_eq!(first, vec![0.0, 1.0, 1.0, 1.0, 0.0]);
    assert!((0..5).all(|j| t.read_mem(1, j) == Value::new(5.0, 0.0)));
}

#[test]
fn gaussian_window_keeps_the_mass_of_an_interior_spike() {
    let mut t = Table::new();
    for i in 0..9 {
        t.write_data(i, 0, Value::new(if i == 4 { 1.0 } else { 0.0 }, 0.0))
            .unwrap();
    }
    let options = SmoothOptions {
        filter: SmoothFilter::Gaussian,
        rows: 5,
        cols: 1,
        alpha: 1.0,
    };
    t.smooth(&all(), &all(), &options, AppDir::Cols).unwrap();

    let c = column(&t, 0, 9);
    assert!((c.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    assert!((c[3] - c[5]).abs() < 1e-15);
    assert!(c[4] < 1.0 && c[4] > c[3] && c[3] > c[2] && c[2] > 0.0);
    assert_eq!(c[1], 0.0);
}

#[test]
fn two_dimensional_smoothing_fills_then_flattens() {
    let mut rows = vec![vec![2.0; 5]; 5];
    rows[2][2] = N;
    let refs: Vec<&[f64]> = rows.iter().map(Vec::as_slice).collect();
    let mut t = table(&refs);

    t.smooth(&all(), &all(), &window(SmoothFilter::WeightedLinear, 3, 3), AppDir::All)
        .unwrap();

    for i in 0..5 {
        for j in 0..5 {
            let x = t.read_mem(i, j);
            assert!((x.re - 2.0).abs() < 1e-12, "({i}, {j}) = {x}");
        }
    }
}

#[test]
fn two_dimensional_average_spreads_a_spike() {
    let mut t = Table::new();
    for i in 0..5 {
        for j in 0..5 {
            let x = if (i, j) == (2, 2) { 9.0 } else { 0.0 };
            t.write_data(i, j, Value::new(x, 0.0)).unwrap();
        }
    }

    t.smooth(&all(), &all(), &window(SmoothFilter::Average, 3, 3), AppDir::All)
        .unwrap();

    for i in 0..5 {
        for j in 0..5 {
            let inside = (1..=3).contains(&i) && (1..=3).contains(&j);
            let expected = if inside { 1.0 } else { 0.0 };
            assert!((t.read_mem(i, j).re - expected).abs() < 1e-12, "({i}, {j})");
        }
    }
}

#[test]
fn grid_smooths_axis_columns_first() {
    let mut t = Table::new();
    for i in 0..4 {
        t.write_data(i, 0, Value::new(i as f64, 0.0)).unwrap();
        t.write_data(i, 1, Value::new(i as f64, 0.0)).unwrap();
        for j in 2..6 {
            t.write_data(i, j, Value::new(1.0, 0.0)).unwrap();
        }
    }

    t.smooth(&all(), &all(), &window(SmoothFilter::Average, 3, 1), AppDir::Grid)
        .unwrap();

    let x = column(&t, 0, 4);
    assert!((x[0] - 1.0 / 3.0).abs() < 1e-12);
    assert_eq!((x[1], x[2]), (1.0, 2.0));
    assert!((x[3] - 8.0 / 3.0).abs() < 1e-12);
    for i in 0..4 {
        for j in 2..6 {
            assert!((t.read_mem(i, j).re - 1.0).abs() < 1e-12, "({i}, {j})");
        }
    }
}

#[test]
fn invalid_requests_are_rejected() {
    let mut empty = Table::new();
    assert!(matches!(
        empty.smooth(&all(), &all(), &SmoothOptions::default(), AppDir::Cols),
        Err(TableError::SmoothConfig(_))
    ));

    let mut t = table(&[&[1.0], &[2.0], &[3.0], &[4.0]]);
    assert!(matches!(
        t.smooth(&all(), &all(), &window(SmoothFilter::Average, 5, 1), AppDir::Cols),
        Err(TableError::SmoothConfig(_))
    ));
    let flat = SmoothOptions {
        filter: SmoothFilter::Gaussian,
        alpha: 0.0,
        ..SmoothOptions::default()
    };
    assert!(matches!(
        t.smooth(&all(), &all(), &flat, AppDir::Cols),
        Err(TableError::SmoothConfig(_))
    ));
    assert!(matches!(
        t.smooth(&VectorIndex::range(3, 1), &all(), &SmoothOptions::default(), AppDir::Cols),
        Err(TableError::InvalidSelection { .. })
    ));
    assert_eq!(column(&t, 0, 4), vec![1.0, 2.0, 3.0, 4.0]);
}

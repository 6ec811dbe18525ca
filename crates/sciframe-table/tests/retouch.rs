use pretty_assertions::assert_eq;
use sciframe_table::{is_missing, AppDir, Table, TableError, Value, VectorIndex};

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

fn row(t: &Table, i: usize, cols: usize) -> Vec<f64> {
    (0..cols).map(|j| t.read_mem(i, j).re).collect()
}

fn all() -> VectorIndex {
    VectorIndex::all()
}

#[test]
fn single_gap_in_a_column_is_interpolated() {
    let mut t = table(&[&[1.0], &[N], &[3.0]]);
    t.set_save_status(true);
    assert!(t.retouch(&all(), &all(), AppDir::Cols).unwrap());
    assert_eq!(column(&t, 0, 3), vec![1.0, 2.0, 3.0]);
    assert!(!t.save_status());
}

#[test]
fn rows_are_filled_along_their_columns() {
    let mut t = table(&[&[1.0, N, N, N, 5.0], &[N, 2.0, N, N, N]]);
    assert!(t.retouch(&all(), &all(), AppDir::Lines).unwrap());
    assert_eq!(row(&t, 0, 5), vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    assert_eq!(row(&t, 1, 5), vec![2.0; 5]);
}

#[test]
fn complete_block_reports_no_change() {
    let mut t = table(&[&[1.0, 2.0], &[3.0, 4.0]]);
    t.set_save_status(true);
    assert!(!t.retouch(&all(), &all(), AppDir::Cols).unwrap());
    assert!(t.save_status());
}

#[test]
fn two_dimensional_fill_reproduces_a_plane() {
    let mut rows: Vec<Vec<f64>> = (0..5)
        .map(|i| (0..5).map(|j| (i + j) as f64).collect())
        .collect();
    rows[2][2] = N;
    let refs: Vec<&[f64]> = rows.iter().map(Vec::as_slice).collect();
    let mut t = table(&refs);

    assert!(t.retouch(&all(), &all(), AppDir::All).unwrap());
    assert_eq!(t.read_mem(2, 2), Value::new(4.0, 0.0));
}

#[test]
fn two_dimensional_fill_reaches_the_corners() {
    let mut rows: Vec<Vec<f64>> = vec![vec![7.0; 5]; 5];
    rows[0][0] = N;
    rows[4][4] = N;
    let refs: Vec<&[f64]> = rows.iter().map(Vec::as_slice).collect();
    let mut t = table(&refs);

    assert!(t.retouch(&all(), &all(), AppDir::All).unwrap());
    assert_eq!(t.read_mem(0, 0), Value::new(7.0, 0.0));
    assert_eq!(t.read_mem(4, 4), Value::new(7.0, 0.0));
}

#[test]
fn two_dimensional_request_on_few_rows_falls_back_to_rows() {
    let mut t = table(&[&[1.0, N, 3.0, 4.0, 5.0], &[N, 2.0, 2.0, 2.0, N]]);
    assert!(t.retouch(&all(), &all(), AppDir::All).unwrap());
    assert_eq!(row(&t, 0, 5), vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    assert_eq!(row(&t, 1, 5), vec![2.0; 5]);
}

#[test]
fn grid_fills_axis_columns_first() {
    let mut t = table(&[
        &[0.0, 0.0, 1.0, 1.0, 1.0, 1.0],
        &[1.0, N, 1.0, N, 1.0, 1.0],
        &[N, 2.0, 1.0, 1.0, 1.0, 1.0],
        &[3.0, 3.0, 1.0, 1.0, 1.0, 1.0],
    ]);
    assert!(t.retouch(&all(), &all(), AppDir::Grid).unwrap());
    assert_eq!(column(&t, 0, 4), vec![0.0, 1.0, 2.0, 3.0]);
    assert_eq!(column(&t, 1, 4), vec![0.0, 1.0, 2.0, 3.0]);
    assert_eq!(t.read_mem(1, 3), Value::new(1.0, 0.0));
}

#[test]
fn open_row_selection_stops_at_the_longest_selected_column() {
    let mut t = table(&[&[1.0, 0.0], &[N, 0.0], &[3.0, 0.0]]);
    for i in 3..10 {
        t.write_data(i, 1, Value::new(0.0, 0.0)).unwrap();
    }

    assert!(t.retouch(&all(), &VectorIndex::single(0), AppDir::Cols).unwrap());
    assert_eq!(t.column(0).unwrap().len(), 3);

    assert!(t
        .retouch(&VectorIndex::range(0, 9), &VectorIndex::single(0), AppDir::Cols)
        .unwrap());
    assert_eq!(t.column(0).unwrap().len(), 10);
    assert_eq!(t.read_mem(9, 0), Value::new(3.0, 0.0));
}

#[test]
fn all_missing_selection_is_left_alone() {
    let mut t = table(&[&[1.0, N], &[2.0, N], &[3.0, 5.0]]);
    assert!(!t
        .retouch(&VectorIndex::range(0, 1), &VectorIndex::single(1), AppDir::Cols)
        .unwrap());
    assert!(is_missing(t.read_mem(0, 1)));
}

#[test]
fn empty_table_and_bad_selections() {
    let mut empty = Table::new();
    assert!(!empty.retouch(&all(), &all(), AppDir::All).unwrap());

    let mut t = table(&[&[1.0]]);
    assert!(matches!(
        t.retouch(&VectorIndex::list(Vec::new()), &all(), AppDir::Cols),
        Err(TableError::InvalidSelection { .. })
    ));
}

#![allow(missing_docs)]
//! Host-level tests for the serpentine coordinate mapping.

use std::collections::HashSet;

use ticker_board::color::{BLACK, GREEN, RED};
use ticker_board::surface::Surface;
use ticker_board::surface::layout::{Serpentine, serpentine_index, serpentine_position};

#[test]
fn mapping_is_a_bijection() {
    for (rows, cols) in [(1, 1), (1, 7), (5, 1), (4, 5), (8, 32)] {
        let mut seen = HashSet::new();
        for row in 0..rows as i32 {
            for col in 0..cols as i32 {
                let index = serpentine_index(row, col, rows, cols).expect("in range");
                assert!(index < rows * cols);
                assert!(seen.insert(index), "{rows}x{cols}: index {index} repeated");
                assert_eq!(
                    serpentine_position(index, rows, cols),
                    Some((row as usize, col as usize))
                );
            }
        }
        assert_eq!(seen.len(), rows * cols);
    }
}

#[test]
fn even_rows_run_forward_and_odd_rows_backward() {
    const ROWS: usize = 4;
    const COLS: usize = 5;
    for row in 0..ROWS as i32 {
        let run: Vec<usize> = (0..COLS as i32)
            .map(|col| Serpentine::<ROWS, COLS>::index(row, col).expect("in range"))
            .collect();
        let forward = run.windows(2).all(|pair| pair[0] < pair[1]);
        let backward = run.windows(2).all(|pair| pair[0] > pair[1]);
        if row % 2 == 0 {
            assert!(forward, "row {row}: {run:?}");
        } else {
            assert!(backward, "row {row}: {run:?}");
        }
    }
}

#[test]
fn rows_join_at_the_junction() {
    assert_eq!(serpentine_index(0, 4, 4, 5), Some(4));
    assert_eq!(serpentine_index(1, 4, 4, 5), Some(5));
    assert_eq!(serpentine_index(1, 0, 4, 5), Some(9));
    assert_eq!(serpentine_index(2, 0, 4, 5), Some(10));
    assert_eq!(serpentine_index(1, 0, 8, 32), Some(63));
    assert_eq!(serpentine_index(7, 0, 8, 32), Some(255));
}

#[test]
fn out_of_range_is_rejected() {
    for (row, col) in [(-1, 0), (0, -1), (4, 0), (0, 5), (i32::MIN, i32::MAX)] {
        assert_eq!(serpentine_index(row, col, 4, 5), None, "({row}, {col})");
    }
    assert_eq!(serpentine_position(20, 4, 5), None);
    assert_eq!(Serpentine::<4, 5>::LEN, 20);
}

#[test]
fn positions_walk_the_strip_in_order() {
    let positions: Vec<_> = Serpentine::<2, 3>::positions().collect();
    assert_eq!(positions, [(0, 0), (0, 1), (0, 2), (1, 2), (1, 1), (1, 0)]);
}

#[test]
fn surface_stores_pixels_in_strip_order() {
    let mut surface = Surface::<2, 3>::new();
    assert!(surface.set_pixel(1, 0, RED, 1.0));
    assert!(surface.set_pixel(0, 2, GREEN, 1.0));
    assert_eq!(surface.strip(), &[BLACK, BLACK, GREEN, BLACK, BLACK, RED]);
    assert_eq!(surface.pixel(1, 0), Some(RED));
}

#[test]
fn surface_ignores_off_panel_pixels() {
    let mut surface = Surface::<2, 3>::new();
    for (row, col) in [(-1, 0), (0, -1), (2, 0), (0, 3)] {
        assert!(!surface.set_pixel(row, col, RED, 1.0));
        assert_eq!(surface.pixel(row, col), None);
    }
    assert!(surface.strip().iter().all(|&led| led == BLACK));
}

#![allow(unused_macros)]

// This max macro was borrowed
// from the max_min_macros crate by Emanuel Claesson

macro_rules! max {
    ($x: expr) => ($x);
    ($x: expr, $($xs: expr), +) => {
        {
            Unit::max($x, max!($($xs), +))
        }
    }
}

// ----------------------
// Testing related Macros
// ----------------------

macro_rules! assert_close {
    ($x:expr, $y:expr, $epsilon:expr) => {
        {
            let (x, y, epsilon) = ($x, $y, $epsilon);
            assert!(
                (x - y).abs() <= epsilon,
                "Assertion failed: `abs(left - right) <= epsilon`, with `left` = {:?}, `right` = {:?}, `epsilon` = {:?}",
                x,
                y,
                epsilon
            );
        }
    };
}

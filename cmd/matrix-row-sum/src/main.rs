//! Sums every row of a matrix in parallel, one deferred task per row.
//!
//! Each row is handed to the pool as an independent future via
//! `async_task`; the main thread then awaits every future in order and
//! prints the per-row totals. A plain `pool.defer` with a channel would
//! do just as well here, but this is the simplest demonstration of
//! `async_task`/`await_result` without any `map` chaining.

use taskpool::{async_task, Future, Pool};

fn build_matrix(rows: usize, cols: usize) -> Vec<Vec<i64>> {
    (0..rows)
        .map(|r| (0..cols).map(|c| (r * cols + c) as i64).collect())
        .collect()
}

fn main() {
    let matrix = build_matrix(6, 5);
    let pool = Pool::new(4).expect("failed to start pool");

    let futures: Vec<Future<i64>> = matrix
        .iter()
        .cloned()
        .map(|row| async_task(&pool, move || row.iter().sum()).expect("pool accepting work"))
        .collect();

    for (i, future) in futures.into_iter().enumerate() {
        let sum = future.await_result().expect("future resolved exactly once");
        println!("row {i}: sum = {sum}");
    }

    pool.destroy();
}

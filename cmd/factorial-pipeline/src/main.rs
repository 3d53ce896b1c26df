//! Computes `n!` as three interleaved `map` chains running concurrently
//! on a 3-worker pool.
//!
//! Factors 1..=n are partitioned into three classes by `(k - 1) % 3`.
//! Each class gets its own seed future (`pref_prod = 1`, `mult` = the
//! class's first factor) and a chain of `factorial_step` calls — one per
//! factor in that class — each multiplying `pref_prod` by the current
//! `mult` and then advancing `mult` by 3 for the next hop. Awaiting all
//! three chain tails and multiplying their `pref_prod` values together
//! yields `n!`.

use std::io::Read;

use taskpool::{async_task, Future, Pool};

const CHAINS: usize = 3;

#[derive(Clone, Copy)]
struct Data {
    pref_prod: u64,
    mult: u64,
}

fn factorial_step(d: Data) -> Data {
    Data {
        pref_prod: d.pref_prod * d.mult,
        mult: d.mult + 3,
    }
}

fn factorial(pool: &Pool, n: usize) -> u64 {
    if n == 0 {
        return 1;
    }

    // Every factor 1..=n belongs to exactly one chain, grouped by
    // (k - 1) % CHAINS. `hops[c]` counts how many times chain `c` needs
    // `factorial_step` applied to fold in every factor assigned to it.
    let mut hops = [0usize; CHAINS];
    for k in 1..=n {
        hops[(k - 1) % CHAINS] += 1;
    }

    let mut results = Vec::with_capacity(CHAINS.min(n));
    for (c, &hop_count) in hops.iter().enumerate().take(CHAINS.min(n)) {
        let seed = Data {
            pref_prod: 1,
            mult: (c + 1) as u64,
        };
        let mut chain: Future<Data> = async_task(pool, move || seed).expect("pool accepting work");
        for _ in 0..hop_count {
            chain = chain.map(pool, factorial_step).expect("pool accepting work");
        }
        results.push(chain);
    }

    results
        .into_iter()
        .map(|f| f.await_result().expect("future resolved exactly once").pref_prod)
        .product()
}

fn read_n() -> usize {
    if let Some(arg) = std::env::args().nth(1) {
        return arg.trim().parse().expect("argument must be a non-negative integer");
    }
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .expect("failed to read n from stdin");
    input.trim().parse().expect("stdin must contain a non-negative integer")
}

fn main() {
    let n = read_n();
    let pool = Pool::new(CHAINS).expect("failed to start pool");
    let result = factorial(&pool, n);
    pool.destroy();
    println!("{result}");
}

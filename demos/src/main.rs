use std::env;
use std::thread::sleep;
use std::time::Duration;

use rand::Rng;
use threading::{DestroyMode, ThreadPool};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod timing;

use timing::ScopedTimer;

/// Reverses `arr` into `res` via front-inserts, then reverses back — an
/// intentionally quadratic shuffle used only to burn CPU for demo timing.
fn hard_test_1(size: usize) -> bool {
    let arr: Vec<usize> = (1..=size).collect();
    let mut res = Vec::with_capacity(size);
    for value in &arr {
        res.insert(0, *value);
    }
    let mut rebuilt = Vec::with_capacity(size);
    for value in &res {
        rebuilt.insert(0, *value);
    }
    rebuilt == arr
}

/// Counts primes up to `size` by trial division against every smaller
/// number, not just up to its square root — deliberately slow, matching the
/// "hard" demo workload it is named after rather than a real sieve.
fn hard_test_2(size: usize) -> usize {
    let mut primes = 0;
    let mut num = 1;
    while num <= size {
        let mut i = 2;
        while i <= num {
            if num % i == 0 {
                break;
            }
            i += 1;
        }
        if i == num {
            primes += 1;
        }
        num += 1;
    }
    primes
}

fn print_task(id: usize) {
    let seconds = rand::rng().random_range(1..=5);
    sleep(Duration::from_secs(seconds));
    info!(task = id, slept_secs = seconds, "print_task finished");
}

fn print_task2() {
    let seconds = rand::rng().random_range(1..=5);
    sleep(Duration::from_secs(seconds));
    info!(slept_secs = seconds, "print_task2 finished");
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn worker_count_from_env() -> usize {
    env::var("DEMO_WORKERS")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(0)
}

fn main() {
    setup_logging();

    let avg_rounds = 3;
    let task_count = 10;
    let test_size = 1000;

    let pool = ThreadPool::new(worker_count_from_env(), DestroyMode::Smooth);
    info!(workers = pool.worker_count(), "thread pool started");

    let mut total_nanos: u128 = 0;
    for round in 0..avg_rounds {
        let timer = ScopedTimer::silent("round");
        for i in 0..task_count {
            pool.add_async_task_fn(move |_| {
                hard_test_1(test_size);
            })
            .unwrap();
            pool.add_async_task_fn(move |_| print_task2()).unwrap();
            pool.add_async_task_fn(move |_| print_task(i)).unwrap();

            let future = pool.add_sync_task_fn(move || hard_test_2(test_size)).unwrap();
            println!("\t[{i}] = {}", future.get().unwrap());
        }
        pool.wait();
        let elapsed = timer.elapsed_nanos();
        info!(round, elapsed_nanos = elapsed as u64, "round finished");
        total_nanos += elapsed;
    }

    println!("--------------------------------------");
    println!("test1:\t\t\t{} ns", total_nanos / avg_rounds as u128);
}

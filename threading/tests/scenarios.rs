use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::sleep;
use std::time::{Duration, Instant};

use threading::{DestroyMode, Task, ThreadPool};

#[test]
fn async_submit_and_drain() {
    let pool = ThreadPool::new(2, DestroyMode::Smooth);
    let log = Arc::new(Mutex::new(Vec::new()));
    let log_clone = log.clone();
    pool.add_async_task_fn(move |_| {
        log_clone.lock().unwrap().push(format!("a + b = {}", 10 + 20));
    })
    .unwrap();
    pool.wait();
    assert_eq!(log.lock().unwrap().as_slice(), ["a + b = 30"]);
}

#[test]
fn sync_with_future_observes_elapsed_time() {
    let pool = ThreadPool::new(2, DestroyMode::Smooth);
    let started = Instant::now();
    let future = pool
        .add_sync_task_fn(|| {
            sleep(Duration::from_millis(10));
            6 * 10
        })
        .unwrap();
    assert_eq!(future.get().unwrap(), 60);
    assert!(started.elapsed() >= Duration::from_millis(10));
}

#[test]
fn loop_with_counter_runs_body_exactly_ten_times() {
    let pool = ThreadPool::new(1, DestroyMode::Smooth);
    let body_runs = Arc::new(AtomicUsize::new(0));
    let predicate_evals = Arc::new(AtomicUsize::new(0));
    let body_runs_clone = body_runs.clone();
    let predicate_evals_clone = predicate_evals.clone();

    let mut task = Task::new();
    task.vars.append(0i32);
    task.vars.append(10i32);
    task.set_condition(move |t| {
        predicate_evals_clone.fetch_add(1, Ordering::SeqCst);
        *t.vars.get::<i32>(0).unwrap() < *t.vars.get::<i32>(1).unwrap()
    });
    task.set_loop_job(move |t| {
        body_runs_clone.fetch_add(1, Ordering::SeqCst);
        let counter = t.vars.get_mut::<i32>(0).unwrap();
        *counter += 1;
    });

    pool.add_async_task(task).unwrap();
    pool.wait();

    assert_eq!(body_runs.load(Ordering::SeqCst), 10);
    assert_eq!(predicate_evals.load(Ordering::SeqCst), 11);
}

#[test]
fn submit_from_body_nests_sync_tasks() {
    let pool = Arc::new(ThreadPool::new(2, DestroyMode::Smooth));
    let pool_clone = pool.clone();

    let outer = pool
        .add_sync_task_fn(move || {
            let mut val = 10;
            val *= 10; // 100

            let first_nested = pool_clone.add_sync_task_fn(move || val * 5).unwrap();
            val = first_nested.get().unwrap(); // 500

            let second_nested = pool_clone.add_sync_task_fn(move || val * 10).unwrap();
            let observed = second_nested.get().unwrap(); // 5000

            (val, observed)
        })
        .unwrap();

    assert_eq!(outer.get().unwrap(), (500, 5000));
}

#[test]
fn sharp_shutdown_drops_the_nine_queued_tasks() {
    let ran = Arc::new(AtomicUsize::new(0));
    {
        let pool = ThreadPool::new(1, DestroyMode::Sharp);
        pool.add_async_task_fn(|_| sleep(Duration::from_millis(100)))
            .unwrap();
        for _ in 0..9 {
            let ran_clone = ran.clone();
            pool.add_async_task_fn(move |_| {
                ran_clone.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }
        // pool dropped here; destroy_mode = Sharp
    }
    assert_eq!(ran.load(Ordering::SeqCst), 0);
}

#[test]
fn smooth_shutdown_drains_all_ten_tasks() {
    let ran = Arc::new(AtomicUsize::new(0));
    {
        let pool = ThreadPool::new(1, DestroyMode::Smooth);
        pool.add_async_task_fn(|_| sleep(Duration::from_millis(20)))
            .unwrap();
        for _ in 0..9 {
            let ran_clone = ran.clone();
            pool.add_async_task_fn(move |_| {
                ran_clone.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }
        // pool dropped here; destroy_mode = Smooth
    }
    assert_eq!(ran.load(Ordering::SeqCst), 9);
}

#[test]
fn pause_then_wait_then_continue_drains_the_remainder() {
    let pool = ThreadPool::new(2, DestroyMode::Smooth);
    let completed = Arc::new(AtomicUsize::new(0));
    for _ in 0..5 {
        let completed_clone = completed.clone();
        pool.add_async_task_fn(move |_| {
            sleep(Duration::from_millis(50));
            completed_clone.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    }

    pool.pause();
    pool.wait();
    assert!(completed.load(Ordering::SeqCst) <= 2);

    pool.continue_();
    pool.wait();
    assert_eq!(completed.load(Ordering::SeqCst), 5);
}

#[test]
fn single_worker_executes_submissions_in_fifo_order() {
    let pool = ThreadPool::new(1, DestroyMode::Smooth);
    let order = Arc::new(Mutex::new(Vec::new()));
    for i in 0..20 {
        let order_clone = order.clone();
        pool.add_async_task_fn(move |_| {
            order_clone.lock().unwrap().push(i);
        })
        .unwrap();
    }
    pool.wait();
    let observed: Vec<i32> = order.lock().unwrap().clone();
    let expected: Vec<i32> = (0..20).collect();
    assert_eq!(observed, expected);
}

#[test]
fn reset_resizes_the_worker_set_and_keeps_it_usable() {
    let mut pool = ThreadPool::new(2, DestroyMode::Smooth);
    pool.reset(Some(4), None);
    assert_eq!(pool.worker_count(), 4);

    let future = pool.add_sync_task_fn(|| 2 + 2).unwrap();
    assert_eq!(future.get().unwrap(), 4);
}

//! Fixed-range worker pool used only to run remote-backup sends off the
//! calling thread.
//!
//! Grounded in `original_source`'s `ThreadPool`: a manager thread wakes once
//! a second and either retires idle workers (when more than half of
//! `current` are idle and `current > min`) or spawns one more (when nobody
//! is idle and `current < max`). The task queue itself is a
//! [`crossbeam::queue::SegQueue`], the same structure `shadow_logger.rs`
//! uses for its command queue.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam::queue::SegQueue;
use once_cell::sync::Lazy;

use crate::config::Config;
use crate::error::PoolClosedError;

type Task = Box<dyn FnOnce() + Send + 'static>;

struct Shared {
    tasks: SegQueue<Task>,
    queue_cv: Condvar,
    queue_lock: Mutex<()>,
    min: AtomicUsize,
    max: AtomicUsize,
    idle: AtomicUsize,
    current: AtomicUsize,
    pending_exit: AtomicUsize,
    stop: AtomicBool,
    exited_ids: Mutex<Vec<std::thread::ThreadId>>,
    workers: Mutex<Vec<(std::thread::ThreadId, JoinHandle<()>)>>,
}

/// A result slot shared between a submitted task and its caller, standing in
/// for the source's `std::future`.
struct OneShot<T> {
    slot: Mutex<Option<T>>,
    cv: Condvar,
}

impl<T> OneShot<T> {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            slot: Mutex::new(None),
            cv: Condvar::new(),
        })
    }

    fn set(&self, value: T) {
        *self.slot.lock().unwrap() = Some(value);
        self.cv.notify_all();
    }

    fn wait(&self) -> T {
        let mut guard = self.slot.lock().unwrap();
        loop {
            if let Some(value) = guard.take() {
                return value;
            }
            guard = self.cv.wait(guard).unwrap();
        }
    }
}

/// A future-like handle for a submitted task's result. Call [`Future::wait`]
/// to block the submitting thread until the task runs.
pub struct Future<T> {
    inner: Arc<OneShot<T>>,
}

impl<T> Future<T> {
    pub fn wait(self) -> T {
        self.inner.wait()
    }
}

/// Fixed-range thread pool with a manager thread that grows and shrinks the
/// worker count between `min_threads` and `max_threads`.
pub struct WorkerPool {
    shared: Arc<Shared>,
    manager: Mutex<Option<JoinHandle<()>>>,
}

impl WorkerPool {
    pub fn new(min_threads: usize, max_threads: usize) -> Self {
        let min_threads = min_threads.max(1);
        let max_threads = max_threads.max(min_threads);

        let shared = Arc::new(Shared {
            tasks: SegQueue::new(),
            queue_cv: Condvar::new(),
            queue_lock: Mutex::new(()),
            min: AtomicUsize::new(min_threads),
            max: AtomicUsize::new(max_threads),
            idle: AtomicUsize::new(min_threads),
            current: AtomicUsize::new(min_threads),
            pending_exit: AtomicUsize::new(0),
            stop: AtomicBool::new(false),
            exited_ids: Mutex::new(Vec::new()),
            workers: Mutex::new(Vec::with_capacity(min_threads)),
        });

        for _ in 0..min_threads {
            let worker = spawn_worker(Arc::clone(&shared));
            shared.workers.lock().unwrap().push(worker);
        }

        let manager = {
            let shared = Arc::clone(&shared);
            std::thread::Builder::new()
                .name("asynclog-pool-manager".to_string())
                .spawn(move || manager_loop(shared))
                .expect("failed to spawn asynclog pool manager thread")
        };

        Self {
            shared,
            manager: Mutex::new(Some(manager)),
        }
    }

    /// Enqueues `task`, returning a [`Future`] the caller may [`Future::wait`]
    /// on. Fails only once the pool has been shut down.
    pub fn submit<F, T>(&self, task: F) -> Result<Future<T>, PoolClosedError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        if self.shared.stop.load(Ordering::SeqCst) {
            return Err(PoolClosedError);
        }
        let result = OneShot::new();
        let result_clone = Arc::clone(&result);
        let boxed: Task = Box::new(move || {
            let value = task();
            result_clone.set(value);
        });

        {
            let _guard = self.shared.queue_lock.lock().unwrap();
            self.shared.tasks.push(boxed);
        }
        self.shared.queue_cv.notify_one();

        Ok(Future { inner: result })
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shared.stop.store(true, Ordering::SeqCst);
        self.shared.queue_cv.notify_all();
        for (_, handle) in self.shared.workers.lock().unwrap().drain(..) {
            let _ = handle.join();
        }
        if let Some(handle) = self.manager.lock().unwrap().take() {
            let _ = handle.join();
        }
    }
}

fn spawn_worker(shared: Arc<Shared>) -> (std::thread::ThreadId, JoinHandle<()>) {
    let handle = std::thread::Builder::new()
        .name("asynclog-pool-worker".to_string())
        .spawn(move || worker_loop(shared))
        .expect("failed to spawn asynclog pool worker thread");
    (handle.thread().id(), handle)
}

fn worker_loop(shared: Arc<Shared>) {
    loop {
        let task = {
            let mut guard = shared.queue_lock.lock().unwrap();
            loop {
                if shared.pending_exit.load(Ordering::SeqCst) > 0 {
                    shared.current.fetch_sub(1, Ordering::SeqCst);
                    shared.idle.fetch_sub(1, Ordering::SeqCst);
                    shared.pending_exit.fetch_sub(1, Ordering::SeqCst);
                    shared
                        .exited_ids
                        .lock()
                        .unwrap()
                        .push(std::thread::current().id());
                    return;
                }
                if let Some(task) = shared.tasks.pop() {
                    break Some(task);
                }
                if shared.stop.load(Ordering::SeqCst) {
                    break None;
                }
                guard = shared.queue_cv.wait(guard).unwrap();
            }
        };

        let Some(task) = task else { return };
        shared.idle.fetch_sub(1, Ordering::SeqCst);
        task();
        shared.idle.fetch_add(1, Ordering::SeqCst);
    }
}

fn manager_loop(shared: Arc<Shared>) {
    while !shared.stop.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_secs(1));

        let idle = shared.idle.load(Ordering::SeqCst);
        let current = shared.current.load(Ordering::SeqCst);
        let min = shared.min.load(Ordering::SeqCst);
        let max = shared.max.load(Ordering::SeqCst);

        if idle > current / 2 && current > min {
            shared.pending_exit.store(2, Ordering::SeqCst);
            shared.queue_cv.notify_all();
            while shared.exited_ids.lock().unwrap().is_empty()
                && shared.pending_exit.load(Ordering::SeqCst) > 0
            {
                std::thread::sleep(Duration::from_millis(10));
            }
            let retired: Vec<_> = shared.exited_ids.lock().unwrap().drain(..).collect();
            let mut workers = shared.workers.lock().unwrap();
            for id in retired {
                if let Some(pos) = workers.iter().position(|(wid, _)| *wid == id) {
                    let (_, handle) = workers.remove(pos);
                    let _ = handle.join();
                }
            }
        } else if idle == 0 && current < max && !shared.stop.load(Ordering::SeqCst) {
            let worker = spawn_worker(Arc::clone(&shared));
            shared.workers.lock().unwrap().push(worker);
            shared.current.fetch_add(1, Ordering::SeqCst);
            shared.idle.fetch_add(1, Ordering::SeqCst);
        }
    }
}

static GLOBAL_POOL: Lazy<WorkerPool> = Lazy::new(|| {
    let config = Config::load();
    let max = config.thread_count.max(1);
    let min = (max / 2).max(1);
    WorkerPool::new(min, max)
});

/// The process-wide pool remote-backup sends are routed through.
/// Sized from [`Config::load`] on first access.
pub fn global() -> &'static WorkerPool {
    &GLOBAL_POOL
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize as Counter;

    #[test]
    fn submit_runs_task_and_future_yields_its_result() {
        let pool = WorkerPool::new(2, 4);
        let future = pool.submit(|| 2 + 2).unwrap();
        assert_eq!(future.wait(), 4);
    }

    #[test]
    fn many_tasks_all_complete() {
        let pool = WorkerPool::new(2, 4);
        let counter = Arc::new(Counter::new(0));
        let futures: Vec<_> = (0..50)
            .map(|i| {
                let counter = Arc::clone(&counter);
                pool.submit(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    i
                })
                .unwrap()
            })
            .collect();
        let results: Vec<i32> = futures.into_iter().map(Future::wait).collect();
        assert_eq!(counter.load(Ordering::SeqCst), 50);
        assert_eq!(results.len(), 50);
    }

    #[test]
    fn submit_after_drop_is_rejected() {
        let pool = WorkerPool::new(1, 1);
        pool.shared.stop.store(true, Ordering::SeqCst);
        let err = pool.submit(|| ()).unwrap_err();
        assert_eq!(err, PoolClosedError);
    }
}

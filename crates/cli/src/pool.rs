//! Fixed-width worker pool over a shared work queue.

use std::collections::VecDeque;
use std::sync::Mutex;

/// Run `job` over every item with `width` workers pulling from a shared
/// queue. Items are claimed in order but complete in arbitrary order;
/// shared sinks (writers, counters) belong behind their own mutex in the
/// caller. Returns once the queue is drained and every worker has exited.
pub fn run_pool<T, F>(width: usize, items: Vec<T>, job: F)
where
    T: Send,
    F: Fn(T) + Sync,
{
    let queue = Mutex::new(VecDeque::from(items));
    let width = width.max(1);

    std::thread::scope(|scope| {
        for _ in 0..width {
            scope.spawn(|| loop {
                let item = queue.lock().expect("work queue poisoned").pop_front();
                match item {
                    Some(item) => job(item),
                    None => break,
                }
            });
        }
    });
}

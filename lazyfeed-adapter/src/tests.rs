use crate::*;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use lazyfeed::{
    Intersection, LoadOutcome, LoadState, LoaderOptions, TriggerOptions, WindowOptions,
};
use tokio::sync::watch;
use tokio::time::{Instant, sleep};
use tokio_test::{assert_pending, assert_ready};

fn numbers(page: u32, page_size: usize, total: u32) -> Vec<u32> {
    let start = page * page_size as u32;
    let end = (start + page_size as u32).min(total);
    (start..end).collect()
}

struct Contacts {
    total: u32,
    calls: AtomicUsize,
}

#[async_trait]
impl PageFetcher for Contacts {
    type Item = u32;
    type Error = String;

    async fn fetch_page(&self, page: u32, page_size: usize) -> Result<Vec<u32>, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        sleep(Duration::from_millis(10)).await;
        Ok(numbers(page, page_size, self.total))
    }
}

fn contacts(total: u32) -> Contacts {
    Contacts {
        total,
        calls: AtomicUsize::new(0),
    }
}

#[tokio::test(start_paused = true)]
async fn feed_appends_pages_until_exhausted() {
    let feed = InfiniteFeed::new(contacts(7), LoaderOptions::new(3));

    assert_eq!(feed.load_more().await, Some(LoadOutcome::Appended { count: 3 }));
    assert_eq!(feed.load_more().await, Some(LoadOutcome::Appended { count: 3 }));
    assert_eq!(feed.load_more().await, Some(LoadOutcome::Exhausted { count: 1 }));
    assert_eq!(feed.items(), (0..7).collect::<Vec<_>>());
    assert_eq!(feed.state(), LoadState::Exhausted);

    assert_eq!(feed.load_more().await, None);
    assert_eq!(feed.fetcher().calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn concurrent_load_more_fetches_once() {
    let feed = InfiniteFeed::new(contacts(100), LoaderOptions::new(10));

    let (a, b) = tokio::join!(feed.load_more(), feed.load_more());
    assert_eq!(a, Some(LoadOutcome::Appended { count: 10 }));
    assert_eq!(b, None);
    assert_eq!(feed.fetcher().calls.load(Ordering::SeqCst), 1);
    assert_eq!(feed.len(), 10);
}

#[tokio::test(start_paused = true)]
async fn fetch_error_is_stored_and_retry_succeeds() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let fetcher = fetch_fn(move |page, page_size| {
        let n = counter.fetch_add(1, Ordering::SeqCst);
        async move {
            if n == 1 {
                Err("503 from backend".to_string())
            } else {
                Ok(numbers(page, page_size, 100))
            }
        }
    });
    let feed = InfiniteFeed::new(fetcher, LoaderOptions::new(2));

    assert_eq!(feed.load_more().await, Some(LoadOutcome::Appended { count: 2 }));
    assert_eq!(feed.load_more().await, Some(LoadOutcome::Failed));
    assert_eq!(feed.state(), LoadState::Error);
    feed.with_error(|e| {
        let e = e.expect("error stored");
        assert_eq!(e.page, 1);
        assert_eq!(e.source.fetch_error().map(String::as_str), Some("503 from backend"));
    });
    assert_eq!(feed.len(), 2);

    assert_eq!(feed.load_more().await, Some(LoadOutcome::Appended { count: 2 }));
    assert_eq!(feed.items(), vec![0, 1, 2, 3]);
    feed.with_error(|e| assert!(e.is_none()));
}

#[tokio::test(start_paused = true)]
async fn reset_mid_flight_drops_the_late_page() {
    let feed = InfiniteFeed::new(contacts(100), LoaderOptions::new(5));
    let mut rx = feed.subscribe();

    let background = feed.clone();
    let task = tokio::spawn(async move { background.load_more().await });
    rx.wait_for(|s| s.state == LoadState::Loading).await.unwrap();

    feed.reset();
    assert_eq!(task.await.unwrap(), Some(LoadOutcome::Stale));
    assert!(feed.is_empty());
    assert_eq!(feed.state(), LoadState::Idle);

    assert_eq!(feed.load_more().await, Some(LoadOutcome::Appended { count: 5 }));
    assert_eq!(feed.items(), vec![0, 1, 2, 3, 4]);
}

#[tokio::test(start_paused = true)]
async fn dropping_load_more_cancels_and_allows_retry() {
    let fetcher = fetch_fn(|page, page_size| async move {
        sleep(Duration::from_millis(50)).await;
        Ok::<_, String>(numbers(page, page_size, 100))
    });
    let feed = InfiniteFeed::new(fetcher, LoaderOptions::new(4));

    let timed_out = tokio::time::timeout(Duration::from_millis(5), feed.load_more()).await;
    assert!(timed_out.is_err());
    assert_eq!(feed.state(), LoadState::Error);
    feed.with_error(|e| assert!(matches!(e.map(|e| &e.source), Some(FeedError::Cancelled))));

    assert_eq!(feed.load_more().await, Some(LoadOutcome::Appended { count: 4 }));
}

#[tokio::test]
async fn panicking_fetcher_is_reported_as_an_error() {
    let fetcher = fetch_fn(|page, _| async move {
        if page == 0 {
            panic!("backend client bug");
        }
        Ok::<Vec<u32>, String>(Vec::new())
    });
    let feed = InfiniteFeed::new(fetcher, LoaderOptions::new(4));

    assert_eq!(feed.load_more().await, Some(LoadOutcome::Failed));
    feed.with_error(|e| assert!(matches!(e.map(|e| &e.source), Some(FeedError::Panicked))));
    assert_eq!(feed.take_error().map(|e| e.page), Some(0));
    assert_eq!(feed.state(), LoadState::Idle);
}

#[tokio::test(start_paused = true)]
async fn subscribers_see_progress() {
    let feed = InfiniteFeed::new(contacts(100), LoaderOptions::new(3));
    let mut rx = feed.subscribe();
    assert!(!rx.has_changed().unwrap());

    feed.load_more().await;
    assert!(rx.has_changed().unwrap());
    let snap = *rx.borrow_and_update();
    assert_eq!(snap.state, LoadState::Idle);
    assert_eq!(snap.len, 3);
    assert_eq!(snap.next_page, 1);

    feed.reset();
    assert_eq!(rx.borrow_and_update().len, 0);
}

#[tokio::test(start_paused = true)]
async fn debounce_watch_publishes_only_the_settled_value() {
    let start = Instant::now();
    let (tx, rx) = watch::channel(String::new());
    let mut out = debounce_watch(rx, Duration::from_millis(50));

    tx.send_replace("a".to_string());
    sleep(Duration::from_millis(10)).await;
    tx.send_replace("ab".to_string());
    sleep(Duration::from_millis(10)).await;
    tx.send_replace("abc".to_string());

    out.changed().await.unwrap();
    let elapsed = start.elapsed();
    assert_eq!(*out.borrow(), "abc");
    assert!(elapsed >= Duration::from_millis(70), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(72), "{elapsed:?}");
    assert!(!out.receiver().has_changed().unwrap());
}

#[tokio::test(start_paused = true)]
async fn debounce_watch_flushes_when_input_closes() {
    let (tx, rx) = watch::channel(0u32);
    let mut out = debounce_watch(rx, Duration::from_secs(10));
    tx.send_replace(5);
    drop(tx);

    out.changed().await.unwrap();
    assert_eq!(*out.borrow(), 5);
    assert!(out.changed().await.is_err());
}

#[tokio::test(start_paused = true)]
async fn debouncer_runs_once_with_last_args() {
    let start = Instant::now();
    let fired = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&fired);
    let d = Debouncer::new(Duration::from_millis(50), move |q: &'static str| {
        sink.lock().unwrap().push((start.elapsed(), q));
    });

    d.call("a");
    sleep(Duration::from_millis(10)).await;
    d.call("ab");
    sleep(Duration::from_millis(10)).await;
    d.call("abc");
    assert!(d.is_pending());
    sleep(Duration::from_millis(200)).await;

    let fired = fired.lock().unwrap();
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].1, "abc");
    assert!(fired[0].0 >= Duration::from_millis(70));
    assert!(!d.is_pending());
}

#[tokio::test(start_paused = true)]
async fn dropping_the_debouncer_cancels_the_pending_call() {
    let fired = Arc::new(AtomicUsize::new(0));
    let sink = Arc::clone(&fired);
    let d = Debouncer::new(Duration::from_millis(20), move |_: ()| {
        sink.fetch_add(1, Ordering::SeqCst);
    });
    d.call(());
    drop(d);
    sleep(Duration::from_millis(100)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn debouncer_flush_and_cancel() {
    let fired = Arc::new(AtomicUsize::new(0));
    let sink = Arc::clone(&fired);
    let d = Debouncer::new(Duration::from_millis(20), move |n: usize| {
        sink.fetch_add(n, Ordering::SeqCst);
    });

    d.call(3);
    assert!(d.flush());
    assert_eq!(fired.load(Ordering::SeqCst), 3);
    assert!(!d.flush());

    d.call(10);
    d.cancel();
    sleep(Duration::from_millis(100)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 3);
    assert_eq!(d.delay(), Duration::from_millis(20));
}

fn hit() -> Intersection {
    Intersection::new(true, 1.0)
}

#[tokio::test(start_paused = true)]
async fn trigger_without_delay_is_eligible_on_mount() {
    let t = TriggerTask::mount(TriggerOptions::new().with_delay_ms(0));
    assert!(t.status().eligible);
    assert!(t.is_observing());
    assert!(!t.should_load());

    assert!(t.report(hit()));
    assert!(t.should_load());
    assert!(!t.is_observing());
}

#[tokio::test(start_paused = true)]
async fn trigger_with_delay_waits_even_when_intersecting() {
    let start = Instant::now();
    let t = TriggerTask::mount(TriggerOptions::new().with_delay_ms(100));
    let mut loaded = tokio_test::task::spawn(t.loaded());
    assert_pending!(loaded.poll());

    assert!(!t.report(hit()));
    sleep(Duration::from_millis(99)).await;
    assert!(!t.status().eligible);
    assert!(!t.report(hit()));
    assert_pending!(loaded.poll());

    let mut rx = t.subscribe();
    rx.wait_for(|s| s.eligible).await.unwrap();
    assert!(start.elapsed() >= Duration::from_millis(100));
    // Already intersecting before the delay ended: loads as soon as it is eligible.
    assert!(t.should_load());
    assert!(!t.is_observing());
    assert_ready!(loaded.poll());
}

#[tokio::test(start_paused = true)]
async fn trigger_with_delay_observes_after_an_offscreen_report() {
    let t = TriggerTask::mount(TriggerOptions::new().with_delay_ms(100));
    assert!(!t.report(Intersection::new(false, 0.0)));

    let mut rx = t.subscribe();
    rx.wait_for(|s| s.eligible).await.unwrap();
    assert!(!t.should_load());
    assert!(t.is_observing());

    assert!(t.report(hit()));
    assert!(t.should_load());
}

#[tokio::test(start_paused = true)]
async fn unmounted_trigger_never_becomes_eligible() {
    let mut t = TriggerTask::mount(TriggerOptions::new().with_delay_ms(50));
    t.unmount();
    sleep(Duration::from_millis(500)).await;
    assert!(!t.status().eligible);
    assert!(!t.report(hit()));
    assert!(!t.should_load());
}

#[test]
fn list_controller_windows_its_items() {
    let items: Vec<u32> = (0..1000).collect();
    let mut c = ListController::from_items(items, WindowOptions::new(0, 40, 400).with_overscan(5));
    assert_eq!(c.windowed_list().count(), 1000);

    c.on_scroll(0);
    let w = c.window();
    assert_eq!(w.range.start_index, 0);
    assert_eq!(w.range.end_index, 15);
    assert_eq!(w.total_height, 40_000);

    let off = c.scroll_to_index(999, lazyfeed::Align::End);
    assert_eq!(off, 39_600);
    assert_eq!(c.window().range.end_index, 1000);
    assert!(c.near_end(0));

    c.clear();
    assert!(c.window().is_empty());
    assert_eq!(c.windowed_list().scroll_offset(), 0);
}

#[test]
fn sync_items_appends_and_detects_reset() {
    let mut c = ListController::new(10, 100);
    c.sync_items(0, &[1, 2, 3]);
    c.sync_items(0, &[1, 2, 3, 4]);
    assert_eq!(c.items(), &[1, 2, 3, 4]);
    assert_eq!(c.windowed_list().count(), 4);

    c.sync_items(1, &[9]);
    assert_eq!(c.items(), &[9]);
}

#[test]
fn sync_items_replaces_a_refilled_source_of_equal_or_greater_length() {
    let mut c = ListController::new(10, 20);
    c.sync_items(0, &[1, 2, 3, 4]);
    c.on_scroll(20);
    assert_eq!(c.windowed_list().scroll_offset(), 20);

    c.sync_items(1, &[10, 20, 30, 40]);
    assert_eq!(c.items(), &[10, 20, 30, 40]);
    assert_eq!(c.windowed_list().scroll_offset(), 0);

    c.sync_items(2, &[5, 6, 7, 8, 9, 11]);
    assert_eq!(c.items(), &[5, 6, 7, 8, 9, 11]);
    assert_eq!(c.windowed_list().count(), 6);
}

#[tokio::test(start_paused = true)]
async fn controller_drops_stale_items_when_the_feed_is_reset_and_refilled() {
    let feed = InfiniteFeed::new(contacts(100), LoaderOptions::new(10));
    let mut list = ListController::new(10, 100);
    feed.load_more().await;
    list.sync_with(&feed);
    assert_eq!(list.items(), (0..10).collect::<Vec<_>>().as_slice());

    feed.reset();
    feed.load_more().await;
    feed.load_more().await;
    assert_eq!(feed.generation(), 1);
    assert_eq!(feed.snapshot().generation, 1);

    list.sync_with(&feed);
    assert_eq!(list.items(), (0..20).collect::<Vec<_>>().as_slice());
    assert_eq!(list.len(), 20);
}

#[tokio::test(start_paused = true)]
async fn feed_and_controller_scroll_to_the_end() {
    let feed = InfiniteFeed::new(contacts(45), LoaderOptions::new(20));
    let mut list = ListController::new(10, 100);

    while feed.has_more() {
        if list.near_end(10) {
            feed.load_more().await;
            list.sync_with(&feed);
        }
        let next = list.windowed_list().scroll_offset() + 50;
        list.on_scroll(next);
    }
    assert_eq!(list.len(), 45);
    assert_eq!(list.items(), (0..45).collect::<Vec<_>>().as_slice());

    feed.reset();
    list.sync_with(&feed);
    assert!(list.is_empty());
}

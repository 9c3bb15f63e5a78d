// Example: an infinite contact list fed by an async backend, with a debounced search box.
use std::time::Duration;

use lazyfeed::{LoaderOptions, WindowOptions};
use lazyfeed_adapter::{InfiniteFeed, ListController, debounce_watch, fetch_fn};
use tokio::sync::watch;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let (query_tx, query_rx) = watch::channel(String::new());
    let mut query = debounce_watch(query_rx, Duration::from_millis(300));

    let fetcher = fetch_fn(|page, page_size| async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        let start = page as usize * page_size;
        let end = (start + page_size).min(130);
        Ok::<_, String>((start..end).map(|i| format!("client #{i}")).collect::<Vec<_>>())
    });
    let feed = InfiniteFeed::new(fetcher, LoaderOptions::new(25));
    let mut list = ListController::from_items(Vec::new(), WindowOptions::new(0, 48, 480));

    let mut offset = 0;
    while feed.has_more() {
        if list.near_end(10) {
            let outcome = feed.load_more().await;
            list.sync_with(&feed);
            println!("{outcome:?}: {} clients", list.len());
        }
        offset += 240;
        list.on_scroll(offset);
    }

    let w = list.window();
    println!("rendering {:?} at y={} of {}", w.range, w.offset_y, w.total_height);

    for q in ["a", "ac", "acm", "acme"] {
        query_tx.send_replace(q.to_string());
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    query.changed().await.ok();
    println!("searching for {:?}", *query.borrow());
}

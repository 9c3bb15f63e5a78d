// Example: drive a PageLoader from scroll position, rendering through a WindowedList.
use lazyfeed::{LoaderOptions, PageLoader, WindowOptions, WindowedList};

fn fetch_page(page: u32) -> Result<Vec<String>, String> {
    const TOTAL: u32 = 95;
    let start = page * 20;
    let end = (start + 20).min(TOTAL);
    Ok((start..end).map(|i| format!("contact #{i}")).collect())
}

fn main() {
    let mut loader = PageLoader::<String, String>::new(LoaderOptions::new(20));
    let mut window = WindowedList::new(WindowOptions::new(0, 10, 100).with_overscan(3));

    let mut offset = 0u64;
    while loader.has_more() {
        if window.range().end_index + 10 >= loader.len() {
            let outcome = loader.load_more_with(fetch_page);
            window.set_count(loader.len());
            println!("page loaded: {outcome:?} (items={})", loader.len());
        }
        offset += 50;
        window.on_scroll(offset);
    }

    let win = window.slice(loader.items());
    println!(
        "rendering {:?} at offset_y={} of total_height={}",
        win.range, win.offset_y, win.total_height
    );
    println!("first={:?} last={:?}", win.items.first(), win.items.last());
}

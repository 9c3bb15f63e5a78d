// Example: defer a section until it is near the viewport, debouncing a search box meanwhile.
use lazyfeed::{Bounds, DebounceOptions, Debounced, TriggerOptions, ViewportTrigger};

fn main() {
    let mut trigger = ViewportTrigger::new(
        TriggerOptions::new()
            .with_delay_ms(100)
            .with_root_margin(50.0),
    );
    let mut search = Debounced::new(String::new(), DebounceOptions::new(300));

    let viewport = Bounds::new(0.0, 0.0, 800.0, 600.0);
    trigger.mount(0);

    for now_ms in (0..=1_000u64).step_by(50) {
        // The section sits below the fold and scrolls up 40px per frame.
        let y = 1_200.0 - now_ms as f32 * 0.8;
        let section = Bounds::new(0.0, y, 800.0, 300.0);

        if trigger.tick(now_ms) {
            println!("{now_ms}ms: eligible");
        }
        if trigger.report_bounds(section, viewport) {
            println!("{now_ms}ms: section visible, loading");
        }

        if now_ms < 200 {
            search.set(format!("query@{now_ms}"), now_ms);
        }
        if search.poll(now_ms) {
            println!("{now_ms}ms: search for {:?}", search.value());
        }
    }

    assert!(trigger.should_load());
}

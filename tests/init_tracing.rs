#![cfg(all(feature = "tracing", not(feature = "loom")))]

use lite_channel::{init_tracing, spsc};

#[test]
fn test_init_tracing_installs_once() {
    init_tracing();
    // A second call finds the global subscriber already set and leaves it alone
    init_tracing();

    assert!(tracing::dispatcher::has_been_set());

    let (tx, rx) = spsc::channel::<u8>(2);
    tx.try_send(1).unwrap();
    assert_eq!(rx.try_recv(), Ok(1));
}

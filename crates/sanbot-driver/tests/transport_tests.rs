//! 传输管理器集成测试（Mock 后端）

use sanbot_driver::{DriverError, ManagerConfig, UsbManager};
use sanbot_protocol::*;
use sanbot_usb::rusb;
use sanbot_usb::{MockBackend, MockWrite};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const VID: u16 = SANBOT_VENDOR_ID;
const HEAD: u16 = SANBOT_HEAD_PRODUCT_ID;
const BOTTOM: u16 = SANBOT_BOTTOM_PRODUCT_ID;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn both_boards() -> MockBackend {
    MockBackend::new()
        .with_device(MockBackend::board_info(VID, HEAD))
        .with_device(MockBackend::board_info(VID, BOTTOM))
}

fn manager(backend: &MockBackend) -> UsbManager<MockBackend> {
    UsbManager::with_backend(backend.clone(), ManagerConfig::default()).unwrap()
}

#[test]
fn routed_wheel_command_reaches_bottom_without_tag() {
    init_tracing();
    let backend = both_boards();
    let mgr = manager(&backend);

    let routed = build_wheel_distance(WheelAction::Forward, 50, 1000);
    mgr.send_to_point(routed.clone()).unwrap();
    mgr.wait_for_pending_sends();

    let writes = backend.writes_for(BOTTOM);
    assert_eq!(writes.len(), 1);
    assert_eq!(&writes[0][..], &routed[..routed.len() - 1]);
    assert!(backend.writes_for(HEAD).is_empty());
}

#[test]
fn tag_both_writes_to_each_endpoint() {
    let backend = both_boards();
    let mgr = manager(&backend);

    let payload = CommandPayload::new(CommandMode::Head).byte(0x01u8).byte(0x00u8);
    let routed = assemble_routed(&payload, &FrameParams::default(), RoutingTag::Both);
    mgr.send_to_point(routed.clone()).unwrap();
    mgr.wait_for_pending_sends();

    let frame = &routed[..routed.len() - 1];
    assert_eq!(backend.writes_for(HEAD), vec![frame.to_vec()]);
    assert_eq!(backend.writes_for(BOTTOM), vec![frame.to_vec()]);

    let snap = mgr.metrics();
    assert_eq!(snap.head.transfers_ok, 1);
    assert_eq!(snap.bottom.transfers_ok, 1);
    assert!(snap.head.is_open && snap.bottom.is_open);
}

#[test]
fn tag_both_failures_are_counted_per_endpoint() {
    let backend = both_boards();
    backend.script_writes(HEAD, [MockWrite::Fail(rusb::Error::Io)]);
    let mgr = manager(&backend);

    mgr.send_to_point(vec![0xAAu8, 0xBB, 0x03]).unwrap();
    mgr.wait_for_pending_sends();

    let snap = mgr.metrics();
    assert_eq!(snap.head.transfer_failures, 1);
    assert_eq!(snap.bottom.transfer_failures, 0);
    assert_eq!(snap.bottom.transfers_ok, 1);
}

#[test]
fn malformed_tags_are_dropped_silently() {
    let backend = both_boards();
    let mgr = manager(&backend);

    mgr.send_to_point(vec![0xAAu8, 0xBB, 0x00]).unwrap();
    mgr.send_to_point(vec![0xAAu8, 0xBB, 0x04]).unwrap();
    mgr.send_to_point(vec![0x01u8]).unwrap();
    mgr.send_to_point(Vec::<u8>::new()).unwrap();
    mgr.wait_for_pending_sends();

    let snap = mgr.metrics();
    assert_eq!(snap.malformed_tags, 4);
    assert_eq!(snap.total_failures(), 0);
    assert_eq!(snap.dispatched, 4);
    assert_eq!(backend.enumerate_count(), 0);
}

#[test]
fn sends_from_one_thread_keep_fifo_order() {
    let backend = both_boards();
    let mgr = manager(&backend);

    mgr.send_to_head(vec![1u8]).unwrap();
    mgr.send_to_head(vec![2u8]).unwrap();
    mgr.send_to_head(vec![3u8]).unwrap();
    mgr.wait_for_pending_sends();

    assert_eq!(backend.writes_for(HEAD), vec![vec![1], vec![2], vec![3]]);
}

#[test]
fn concurrent_producers_preserve_per_thread_order() {
    let backend = both_boards();
    let mgr = Arc::new(manager(&backend));

    let handles: Vec<_> = (0..4u8)
        .map(|t| {
            let mgr = Arc::clone(&mgr);
            thread::spawn(move || {
                for i in 0..25u8 {
                    mgr.send_to_bottom(vec![t, i]).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    mgr.wait_for_pending_sends();

    let writes = backend.writes_for(BOTTOM);
    assert_eq!(writes.len(), 100);
    for t in 0..4u8 {
        let seq: Vec<u8> = writes.iter().filter(|w| w[0] == t).map(|w| w[1]).collect();
        assert_eq!(seq, (0..25u8).collect::<Vec<_>>());
    }
    assert_eq!(mgr.metrics().enqueued, 100);
}

#[test]
fn wait_for_pending_sends_drains_slow_device() {
    let backend = both_boards();
    backend.set_write_delay(Duration::from_millis(10));
    let mgr = manager(&backend);

    for i in 0..5u8 {
        mgr.send_to_head(vec![i]).unwrap();
    }
    assert!(!mgr.wait_for_pending_sends_timeout(Duration::from_millis(1)));
    mgr.wait_for_pending_sends();

    assert_eq!(mgr.pending(), 0);
    assert_eq!(backend.writes_for(HEAD).len(), 5);
    assert_eq!(mgr.metrics().dispatched, 5);
}

#[test]
fn ten_failures_trigger_one_reconnect() {
    let backend = both_boards();
    backend.script_writes(HEAD, [MockWrite::Fail(rusb::Error::Pipe); 10]);
    let mgr = manager(&backend);

    for i in 0..11u8 {
        mgr.send_to_head(vec![i]).unwrap();
    }
    mgr.wait_for_pending_sends();

    assert_eq!(backend.claim_count(HEAD), 2);
    assert_eq!(backend.release_count(HEAD), 1);
    let snap = mgr.metrics();
    assert_eq!(snap.head.transfer_failures, 10);
    assert_eq!(snap.head.transfers_ok, 1);
    assert_eq!(snap.head.reconnects, 1);
}

#[test]
fn missing_device_drops_send() {
    let backend = MockBackend::new().with_device(MockBackend::board_info(VID, HEAD));
    let mgr = manager(&backend);

    mgr.send_to_bottom(vec![1u8, 2, 3]).unwrap();
    mgr.wait_for_pending_sends();

    let snap = mgr.metrics();
    assert_eq!(snap.bottom.resolution_failures, 1);
    assert!(!snap.bottom.is_open);
    assert!(backend.writes_for(BOTTOM).is_empty());

    backend.add_device(MockBackend::board_info(VID, BOTTOM));
    mgr.send_to_bottom(vec![4u8]).unwrap();
    mgr.wait_for_pending_sends();
    assert_eq!(backend.writes_for(BOTTOM), vec![vec![4]]);
}

#[test]
fn empty_sends_never_touch_the_device() {
    let backend = both_boards();
    let mgr = manager(&backend);

    for _ in 0..10 {
        mgr.send_to_head(Vec::<u8>::new()).unwrap();
        mgr.send_to_bottom(Vec::<u8>::new()).unwrap();
    }
    mgr.wait_for_pending_sends();

    let snap = mgr.metrics();
    assert_eq!(snap.dispatched, 20);
    assert_eq!(snap.total_failures(), 0);
    assert_eq!(snap.head.reconnects, 0);
    assert_eq!(snap.bottom.reconnects, 0);
    assert_eq!(backend.enumerate_count(), 0);
    assert_eq!(backend.claim_count(HEAD), 0);
}

#[test]
fn sends_without_any_board_are_counted_as_dropped() {
    let backend = MockBackend::new();
    let mgr = manager(&backend);

    mgr.send_to_point(build_head_centre_lock()).unwrap();
    mgr.send_to_point(build_wheel_distance(WheelAction::Forward, 50, 1000)).unwrap();
    mgr.wait_for_pending_sends();

    let snap = mgr.metrics();
    assert_eq!(snap.head.resolution_failures, 1);
    assert_eq!(snap.bottom.resolution_failures, 1);
    assert_eq!(snap.head.transfer_failures, 0);
    assert_eq!(snap.total_failures(), 2);
}

#[test]
fn shutdown_releases_both_endpoints() {
    let backend = both_boards();
    let mut mgr = manager(&backend);

    mgr.send_to_head(vec![1u8]).unwrap();
    mgr.send_to_bottom(vec![2u8]).unwrap();
    mgr.wait_for_pending_sends();
    assert!(mgr.is_running());

    mgr.shutdown();
    assert!(!mgr.is_running());
    assert_eq!(backend.release_count(HEAD), 1);
    assert_eq!(backend.release_count(BOTTOM), 1);

    assert!(matches!(mgr.send_to_head(vec![3u8]), Err(DriverError::ShutDown)));
    mgr.wait_for_pending_sends();

    // 重复关闭无副作用
    mgr.shutdown();
    assert_eq!(backend.release_count(HEAD), 1);
}

#[test]
fn drop_shuts_down_worker() {
    let backend = both_boards();
    {
        let mgr = manager(&backend);
        mgr.send_to_head(vec![1u8]).unwrap();
        mgr.wait_for_pending_sends();
    }
    assert_eq!(backend.release_count(HEAD), 1);
    assert_eq!(backend.release_count(BOTTOM), 0);
}

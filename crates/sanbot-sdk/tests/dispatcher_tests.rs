//! 命令分发集成测试（Mock 后端）

use sanbot_sdk::prelude::*;
use sanbot_sdk::protocol::{SANBOT_BOTTOM_PRODUCT_ID, SANBOT_HEAD_PRODUCT_ID, SANBOT_VENDOR_ID};
use sanbot_sdk::usb::MockBackend;

fn dispatcher(backend: &MockBackend) -> Dispatcher<MockBackend> {
    let manager = UsbManager::with_backend(backend.clone(), ManagerConfig::default()).unwrap();
    Dispatcher::new(manager, SafetyValidator::default())
}

fn both_boards() -> MockBackend {
    MockBackend::new()
        .with_device(MockBackend::board_info(SANBOT_VENDOR_ID, SANBOT_HEAD_PRODUCT_ID))
        .with_device(MockBackend::board_info(SANBOT_VENDOR_ID, SANBOT_BOTTOM_PRODUCT_ID))
}

#[test]
fn commands_are_routed_to_their_board() {
    let backend = both_boards();
    let mut d = dispatcher(&backend);

    let wheel = d
        .execute(&RobotCommand::WheelDistance {
            action: WheelAction::Forward,
            speed: 50,
            distance: 1000,
        })
        .unwrap();
    let head = d.execute(&RobotCommand::HeadCentre).unwrap();
    d.flush();

    assert_eq!(backend.writes_for(SANBOT_BOTTOM_PRODUCT_ID), vec![wheel[..wheel.len() - 1].to_vec()]);
    assert_eq!(backend.writes_for(SANBOT_HEAD_PRODUCT_ID), vec![head[..head.len() - 1].to_vec()]);
}

#[test]
fn unsafe_command_is_not_enqueued() {
    let backend = both_boards();
    let mut d = dispatcher(&backend);

    let result = d.execute(&RobotCommand::ArmAbsolute {
        part: ArmPart::Left,
        speed: 10,
        angle: 180,
    });
    assert!(matches!(result, Err(DispatchError::Safety(_))));
    d.flush();

    assert_eq!(d.manager().metrics().enqueued, 0);
    assert!(backend.writes_for(SANBOT_HEAD_PRODUCT_ID).is_empty());
}

#[test]
fn executed_commands_are_logged() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("commands.log");

    let backend = both_boards();
    let mut d = dispatcher(&backend).with_log(CommandLog::open(&path).unwrap());
    d.execute(&RobotCommand::HeadCentre).unwrap();
    d.execute(&RobotCommand::ArmNoAngle {
        part: ArmPart::Both,
        speed: 5,
        action: ArmAction::Reset,
    })
    .unwrap();
    d.flush();

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains(" head-centre | A4 03 00 00"));
    assert!(lines[0].ends_with(" 01"));
    assert!(lines[1].contains(" arm-no-angle both 5 reset | A4 03"));
    assert!(lines[1].ends_with(" 02"));
}

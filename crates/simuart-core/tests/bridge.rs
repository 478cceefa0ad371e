mod common;

use std::thread;
use std::time::{Duration, Instant};

use common::{quiet_transactor, Peer};
use simuart_core::{Bridge, BridgeError, Error, SimArg, SimValue, SystemTask};

fn name(n: &str) -> Vec<SimArg> {
    vec![SimArg::StringConst(n.to_string())]
}

#[test]
fn system_tasks_drive_a_round_trip() {
    let mut bridge = Bridge::new(quiet_transactor());

    let created = bridge.call_by_name("$uart_create", &name("uart0")).unwrap();
    assert!(matches!(created, SimValue::Handle(h) if h.index() == 0));

    let path = bridge.transactor().device_path("uart0").unwrap().to_string();
    let mut peer = Peer::attach(&path);
    peer.send(b"A");

    let start = Instant::now();
    loop {
        match bridge.call(SystemTask::TransmitValid, &name("uart0")).unwrap() {
            SimValue::Int(1) => break,
            SimValue::Int(0) => {
                assert!(start.elapsed() < Duration::from_secs(2), "byte never arrived");
                thread::sleep(Duration::from_millis(2));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
    assert_eq!(
        bridge.call(SystemTask::TransmitData, &name("uart0")).unwrap(),
        SimValue::Byte(b'A')
    );

    let args = [SimArg::Parameter("uart0".into()), SimArg::Net(0x142)];
    assert_eq!(bridge.call(SystemTask::ReceiveData, &args).unwrap(), SimValue::Void);
    assert_eq!(peer.recv(1), [0x42]);
}

#[test]
fn create_twice_is_rejected_through_the_bridge() {
    let mut bridge = Bridge::new(quiet_transactor());
    bridge.call(SystemTask::UartCreate, &name("uart0")).unwrap();

    let err = bridge.call(SystemTask::UartCreate, &name("uart0")).unwrap_err();
    assert!(matches!(err, BridgeError::Transactor(Error::DuplicateName(_))));
    assert_eq!(bridge.into_transactor().registry().len(), 1);
}

//! Read path of the bus master

use crate::common::{BusEvent, SimController};
use mpu6050_dmp::bus::{BusError, BusMaster, BusTiming, NoAcknowledgeSource};

const WHO_AM_I: u8 = 0x75;

fn master_with_limit(limit: u32) -> (BusMaster<SimController>, SimController) {
    let sim = SimController::new();
    let timing = BusTiming::default()
        .with_ready_poll_limit(limit)
        .with_recovery_settle_spins(0);
    let mut master = BusMaster::with_timing(sim.clone(), timing);
    master.initialize();
    (master, sim)
}

#[test]
fn test_single_byte_read() {
    let (mut master, sim) = master_with_limit(100);
    let mut byte = [0u8; 1];
    master.read_bytes(0x68, WHO_AM_I, &mut byte).unwrap();
    assert_eq!(byte, [0x68]);

    // Register phase, then a counted receive
    let starts: Vec<_> = sim
        .events()
        .into_iter()
        .filter(|event| matches!(event, BusEvent::Start { .. }))
        .collect();
    assert_eq!(
        starts,
        vec![
            BusEvent::Start {
                address: 0x68,
                transmit: true
            },
            BusEvent::Start {
                address: 0x68,
                transmit: false
            }
        ]
    );
}

#[test]
fn test_multi_byte_read() {
    let (mut master, sim) = master_with_limit(100);
    sim.with_model(|model| {
        model.set_register(0x41, 0xF1);
        model.set_register(0x42, 0x5C);
    });

    let mut bytes = [0u8; 2];
    master.read_bytes(0x68, 0x41, &mut bytes).unwrap();
    assert_eq!(bytes, [0xF1, 0x5C]);
}

#[test]
fn test_empty_read_is_noop() {
    let (mut master, sim) = master_with_limit(100);
    master.read_bytes(0x68, WHO_AM_I, &mut []).unwrap();
    assert!(sim.events().is_empty());
}

#[test]
fn test_oversized_read_rejected() {
    let (mut master, sim) = master_with_limit(100);
    let mut buffer = vec![0u8; usize::from(u16::MAX) + 1];
    assert_eq!(
        master.read_bytes(0x68, 0x74, &mut buffer),
        Err(BusError::TransferTooLong)
    );
    assert!(sim.events().is_empty());
}

#[test]
fn test_timeout_recovers_controller() {
    let (mut master, sim) = master_with_limit(50);
    assert_eq!(sim.init_count(), 1);
    sim.set_wedged(true);

    let mut byte = [0u8; 1];
    assert_eq!(
        master.read_bytes(0x68, WHO_AM_I, &mut byte),
        Err(BusError::Timeout)
    );
    assert_eq!(sim.init_count(), 2);
    assert!(sim.events().contains(&BusEvent::Reset));

    sim.set_wedged(false);
    master.read_bytes(0x68, WHO_AM_I, &mut byte).unwrap();
    assert_eq!(byte, [0x68]);
}

#[test]
fn test_read_register_nack_not_retried() {
    let (mut master, sim) = master_with_limit(100);
    sim.nack_register_byte(1);

    let mut byte = [0u8; 1];
    assert_eq!(
        master.read_bytes(0x68, WHO_AM_I, &mut byte),
        Err(BusError::NoAcknowledge(NoAcknowledgeSource::Address))
    );
    assert_eq!(sim.starts(), 1);
}

#[test]
fn test_hal_write_read() {
    use embedded_hal::i2c::I2c;

    let (mut master, _sim) = master_with_limit(100);
    let mut byte = [0u8; 1];
    master.write_read(0x68, &[WHO_AM_I], &mut byte).unwrap();
    assert_eq!(byte, [0x68]);
}

#[test]
fn test_error_kinds() {
    use embedded_hal::i2c::{Error, ErrorKind};

    assert_eq!(BusError::ArbitrationLoss.kind(), ErrorKind::ArbitrationLoss);
    assert_eq!(
        BusError::NoAcknowledge(NoAcknowledgeSource::Data).kind(),
        ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data)
    );
    assert_eq!(BusError::Timeout.kind(), ErrorKind::Other);
}

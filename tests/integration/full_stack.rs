//! Driver over the bus master and the simulated controller

use crate::common::mpu_model::INT_ENABLE;
use crate::common::{
    BusEvent, MockDelay, PacketBuilder, SimController, assert_float_eq, test_firmware,
};
use mpu6050_dmp::bus::BusMaster;
use mpu6050_dmp::dmp::DmpFailure;
use mpu6050_dmp::{DeviceStatus, Error, I2cBus, Mpu6050Driver};

fn assert_firmware_loaded(sim: &SimController) {
    let program = &crate::common::test_utils::TEST_PROGRAM;
    sim.with_model(|model| {
        assert_eq!(model.memory_at(0, 0), 0x01);
        assert_eq!(model.memory_at(0, 3), 0x04);
        assert_eq!(model.memory_at(0, 200), program[200]);
        assert_eq!(model.memory_at(1, 0), 0xAA);
        assert_eq!(model.memory_at(1, 1), 0xBB);
        assert_eq!(model.memory_at(1, 43), program[299]);
        assert_eq!(model.register(INT_ENABLE), 0x32);
        assert_eq!(model.register(0x70), 0x03);
        assert_eq!(model.register(0x71), 0x00);
    });
}

#[test]
fn test_setup_and_read_through_bus_master() {
    let sim = SimController::new();
    let mut driver = Mpu6050Driver::new(BusMaster::new(sim.clone()));

    driver.setup(&test_firmware(), &mut MockDelay).unwrap();

    assert_eq!(driver.status(), DeviceStatus::DmpReady);
    assert_eq!(sim.init_count(), 1);
    assert_firmware_loaded(&sim);

    sim.with_model(|model| {
        model.repeat_packet = Some(PacketBuilder::new().gyro([-655, 1310, 0]).build());
    });
    let sample = driver.read_sample().unwrap();

    assert_float_eq(sample.roll_rate, -10.0, 1e-4);
    assert_float_eq(sample.pitch_rate, 20.0, 1e-4);
    assert_float_eq(sample.roll, 0.0, 1e-4);
    assert_float_eq(sample.temperature_f, 97.754, 1e-3);
}

#[test]
fn test_setup_through_embedded_hal_adapter() {
    let sim = SimController::new();
    let bus = I2cBus::new(BusMaster::new(sim.clone()));
    let mut driver = Mpu6050Driver::new(bus);

    driver.setup(&test_firmware(), &mut MockDelay).unwrap();

    assert_eq!(driver.status(), DeviceStatus::DmpReady);
    assert_firmware_loaded(&sim);

    sim.with_model(|model| {
        model
            .pending_packets
            .push_back(PacketBuilder::new().accel([0, 4096, 4096]).build());
    });
    let sample = driver.read_sample().unwrap();
    assert_float_eq(sample.accel_y, 1.0, 1e-5);
    assert_float_eq(sample.accel_magnitude, 1.0, 1e-5);

    // The adapter hands the controller back untouched
    let _master: BusMaster<SimController> = driver.release().release();
}

#[test]
fn test_identity_nack_absorbed_by_retries() {
    let sim = SimController::new();
    let mut driver = Mpu6050Driver::new(BusMaster::new(sim.clone()));
    sim.nack_register_byte(3);

    driver.setup(&test_firmware(), &mut MockDelay).unwrap();

    assert_eq!(driver.status(), DeviceStatus::DmpReady);
    let nacks = sim
        .events()
        .iter()
        .filter(|event| matches!(event, BusEvent::Nack))
        .count();
    assert_eq!(nacks, 3);
}

#[test]
fn test_payload_nack_during_upload_fails_setup() {
    let sim = SimController::new();
    let mut driver = Mpu6050Driver::new(BusMaster::new(sim.clone()));
    // The program upload is the first frame with more than one data byte
    driver.setup(&test_firmware(), &mut MockDelay).unwrap();
    sim.nack_payload_byte(1);

    assert!(matches!(
        driver.setup(&test_firmware(), &mut MockDelay),
        Err(Error::DmpInitFailed(DmpFailure::Bus))
    ));
    assert_eq!(driver.status(), DeviceStatus::Connected);
}

#[test]
fn test_fifo_read_is_one_counted_receive() {
    let sim = SimController::new();
    let mut driver = Mpu6050Driver::new(BusMaster::new(sim.clone()));
    driver.setup(&test_firmware(), &mut MockDelay).unwrap();
    sim.with_model(|model| model.pending_packets.push_back(PacketBuilder::new().build()));
    sim.clear_events();

    driver.read_sample().unwrap();

    sim.with_model(|model| assert!(model.fifo.is_empty()));
    // count, status, packet, temperature: a register frame and a receive each
    assert_eq!(sim.starts(), 8);
}

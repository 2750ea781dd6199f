//! Sample acquisition over the mock bus

use crate::common::mpu_model::{FIFO_R_W, INT_STATUS, USER_CTRL};
use crate::common::{
    MockDelay, MockInterface, Operation, PacketBuilder, assert_float_eq, create_mock_driver,
    create_ready_driver, test_firmware,
};
use mpu6050_dmp::{
    BitField, DeviceInterface, DeviceStatus, Error, MotionApps20, Mpu6050Driver, RegisterMap,
    Sample,
};

#[test]
fn test_read_before_setup_is_rejected() {
    let (mut driver, interface) = create_mock_driver();
    assert_eq!(driver.status(), DeviceStatus::Disconnected);
    assert!(matches!(driver.read_sample(), Err(Error::NotReady)));
    assert!(interface.operations().is_empty());
}

#[test]
fn test_setup_configures_device_and_starts_dmp() {
    let (mut driver, interface) = create_mock_driver();
    driver.setup(&test_firmware(), &mut MockDelay).unwrap();

    assert_eq!(driver.status(), DeviceStatus::DmpReady);
    assert_eq!(interface.init_count(), 1);
    interface.with_model(|model| {
        assert_eq!(model.device_resets, 1);
        assert_eq!(model.register(0x6B), 0x03); // awake, PLL with Z gyro
        assert_eq!(model.register(0x19), 4);
        assert_eq!(model.register(0x1A), 3);
        assert_eq!(model.register(0x1B), 0x08); // ±500 °/s
        assert_eq!(model.register(0x1C), 0x10); // ±8 g
        assert_eq!(model.register(0x38), 0x32);
        assert_eq!(model.register(0x70), 0x03);
        assert_eq!(model.register(0x71), 0x00);
        assert_eq!(model.register(0x6A) & 0xC0, 0xC0);
        assert_eq!(model.fifo_resets, 1);

        // Program bytes outside the configuration blocks are intact
        let program = &crate::common::test_utils::TEST_PROGRAM;
        for (i, &byte) in program.iter().enumerate() {
            match i {
                0..=3 => assert_eq!(model.memory[i], i as u8 + 1),
                256 => assert_eq!(model.memory[i], 0xAA),
                257 => assert_eq!(model.memory[i], 0xBB),
                _ => assert_eq!(model.memory[i], byte),
            }
        }
    });
}

#[test]
fn test_sample_conversion() {
    let (mut driver, interface) = create_ready_driver();
    let packet = PacketBuilder::new()
        .gyro([655, 0, -655])
        .accel([4096, 0, 4096])
        .build();
    interface.with_model(|model| model.pending_packets.push_back(packet));

    let sample = driver.read_sample().unwrap();

    assert_float_eq(sample.roll, 0.0, 1e-4);
    assert_float_eq(sample.pitch, 0.0, 1e-4);
    assert_float_eq(sample.yaw, 0.0, 1e-4);
    assert_float_eq(sample.roll_rate, 10.0, 1e-4);
    assert_float_eq(sample.pitch_rate, 0.0, 1e-4);
    assert_float_eq(sample.yaw_rate, -10.0, 1e-4);
    // Gravity (0, 0, 1) removed
    assert_float_eq(sample.accel_x, 1.0, 1e-5);
    assert_float_eq(sample.accel_y, 0.0, 1e-5);
    assert_float_eq(sample.accel_z, 0.0, 1e-5);
    assert_float_eq(sample.accel_magnitude, 1.0, 1e-5);
}

#[test]
fn test_yaw_quarter_turn_in_degrees() {
    let (mut driver, interface) = create_ready_driver();
    let packet = PacketBuilder::new().quaternion([11585, 0, 0, 11585]).build();
    interface.with_model(|model| model.pending_packets.push_back(packet));

    let sample = driver.read_sample().unwrap();
    assert_float_eq(sample.yaw, -90.0, 0.01);
}

#[test]
fn test_reads_exactly_one_packet() {
    let (mut driver, interface) = create_ready_driver();
    interface.with_model(|model| {
        model.pending_packets.push_back(PacketBuilder::new().build());
        model.pending_packets.push_back(PacketBuilder::new().build());
    });

    driver.read_sample().unwrap();

    let fifo_reads: Vec<_> = interface
        .operations()
        .into_iter()
        .filter(|op| matches!(op, Operation::Read { register, .. } if *register == FIFO_R_W))
        .collect();
    assert_eq!(
        fifo_reads,
        vec![Operation::Read {
            register: FIFO_R_W,
            len: 42
        }]
    );
}

#[test]
fn test_overflow_flag_resets_fifo_once() {
    let (mut driver, interface) = create_ready_driver();
    interface.with_model(|model| {
        model.repeat_packet = Some(PacketBuilder::new().gyro([131, 0, 0]).build());
        model.set_register(INT_STATUS, 0x10);
    });
    let resets = interface.fifo_resets();

    let sample = driver.read_sample().unwrap();

    assert_eq!(interface.fifo_resets(), resets + 1);
    assert_float_eq(sample.roll_rate, 2.0, 1e-3);
}

#[test]
fn test_count_threshold_resets_fifo_once() {
    let (mut driver, interface) = create_ready_driver();
    interface.with_model(|model| {
        model.fifo.extend(std::iter::repeat(0xEE).take(1024));
        model.repeat_packet = Some(PacketBuilder::new().build());
    });
    let resets = interface.fifo_resets();

    let sample = driver.read_sample().unwrap();

    assert_eq!(interface.fifo_resets(), resets + 1);
    // Stale 0xEE bytes were discarded
    assert_float_eq(sample.roll_rate, 0.0, 1e-6);
}

#[test]
fn test_below_threshold_is_consumed() {
    let (mut driver, interface) = create_ready_driver();
    interface.with_model(|model| {
        for _ in 0..24 {
            model.fifo.extend(PacketBuilder::new().build());
        }
    });
    let resets = interface.fifo_resets();

    driver.read_sample().unwrap();

    // 1008 bytes buffered is under the threshold
    assert_eq!(interface.fifo_resets(), resets);
}

#[test]
fn test_average_of_one_equals_single_read() {
    let (mut driver, interface) = create_ready_driver();
    let packet = PacketBuilder::new()
        .quaternion([15000, 3000, -2000, 5000])
        .gyro([100, -200, 300])
        .accel([1000, 2000, 3000])
        .build();
    interface.with_model(|model| model.repeat_packet = Some(packet));

    let single = driver.read_sample().unwrap();
    let averaged = driver.read_averaged_sample(1).unwrap();

    assert_eq!(single, averaged);
}

#[test]
fn test_average_is_per_field_mean() {
    let (mut driver, interface) = create_ready_driver();
    interface.with_model(|model| {
        for gyro_x in [655, 1310, 1965] {
            model
                .pending_packets
                .push_back(PacketBuilder::new().gyro([gyro_x, 0, 0]).build());
        }
    });

    let sample = driver.read_averaged_sample(3).unwrap();

    assert_float_eq(sample.roll_rate, 20.0, 1e-3);
    assert_float_eq(sample.accel_z, -1.0, 1e-5);
}

fn queue_varied_packets(interface: &MockInterface) {
    interface.with_model(|model| {
        let packets = [
            PacketBuilder::new()
                .gyro([655, 0, -131])
                .accel([4096, 0, 4096])
                .build(),
            PacketBuilder::new()
                .quaternion([11585, 0, 0, 11585])
                .gyro([1310, 131, 0])
                .accel([0, 4096, 8192])
                .build(),
            PacketBuilder::new()
                .quaternion([15000, 3000, -2000, 5000])
                .gyro([-655, 262, 393])
                .accel([1000, -2000, 3000])
                .build(),
        ];
        model.pending_packets.extend(packets);
        model.pending_temperatures.extend([0, 340, -680]);
    });
}

fn numeric_fields(sample: &Sample) -> [f32; 11] {
    [
        sample.roll,
        sample.pitch,
        sample.yaw,
        sample.roll_rate,
        sample.pitch_rate,
        sample.yaw_rate,
        sample.accel_x,
        sample.accel_y,
        sample.accel_z,
        sample.accel_magnitude,
        sample.temperature_f,
    ]
}

#[test]
fn test_average_matches_mean_of_single_reads() {
    let (mut single, single_interface) = create_ready_driver();
    queue_varied_packets(&single_interface);
    let reads: Vec<[f32; 11]> = (0..3)
        .map(|_| numeric_fields(&single.read_sample().unwrap()))
        .collect();

    let (mut averaging, averaging_interface) = create_ready_driver();
    queue_varied_packets(&averaging_interface);
    let averaged = numeric_fields(&averaging.read_averaged_sample(3).unwrap());

    // The inputs really differ in every group of fields
    assert!(reads[0][2] != reads[1][2]);
    assert!(reads[0][3] != reads[2][3]);
    assert!(reads[0][6] != reads[1][6]);
    assert!(reads[0][10] != reads[1][10]);

    for field in 0..11 {
        let mean = (reads[0][field] + reads[1][field] + reads[2][field]) / 3.0;
        assert_float_eq(averaged[field], mean, 1e-3);
    }
}

#[test]
fn test_average_of_zero_rejected() {
    let (mut driver, interface) = create_ready_driver();
    assert!(matches!(
        driver.read_averaged_sample(0),
        Err(Error::InvalidSampleCount)
    ));
    assert!(interface.operations().is_empty());
}

#[test]
fn test_offsets_written_big_endian() {
    let (mut driver, interface) = create_mock_driver();

    driver.set_gyro_offsets(-1, 2, 0x1234).unwrap();
    driver.set_accel_offsets(0x0102, -2, 0).unwrap();

    interface.with_model(|model| {
        let gyro: Vec<u8> = (0x13..=0x18).map(|r| model.register(r)).collect();
        assert_eq!(gyro, vec![0xFF, 0xFF, 0x00, 0x02, 0x12, 0x34]);
        let accel: Vec<u8> = (0x06..=0x0B).map(|r| model.register(r)).collect();
        assert_eq!(accel, vec![0x01, 0x02, 0xFF, 0xFE, 0x00, 0x00]);
    });
}

#[test]
fn test_fifo_count_and_reset() {
    let (mut driver, interface) = create_ready_driver();
    interface.with_model(|model| model.fifo.extend([0u8; 100]));

    assert_eq!(driver.fifo_count().unwrap(), 100);
    driver.reset_fifo().unwrap();
    assert_eq!(driver.fifo_count().unwrap(), 0);
}

#[test]
fn test_interrupt_status_clears_on_read() {
    let (mut driver, interface) = create_ready_driver();
    interface.set_register(INT_STATUS, 0x11);

    let status = driver.interrupt_status().unwrap();
    assert!(status.fifo_overflow);
    assert!(status.data_ready);
    assert!(!driver.interrupt_status().unwrap().any_set());
}

#[test]
fn test_overflow_bit_comes_from_register_map() {
    let interface = MockInterface::new();
    let mut map = RegisterMap::MPU6050;
    map.fields.fifo_overflow = BitField::new(INT_STATUS, 7, 1);
    let mut driver =
        Mpu6050Driver::with_math(DeviceInterface::with_map(interface.clone(), map), MotionApps20);
    driver.setup(&test_firmware(), &mut MockDelay).unwrap();
    interface.with_model(|model| model.repeat_packet = Some(PacketBuilder::new().build()));

    // 0x10 is not the overflow bit in this map
    let resets = interface.fifo_resets();
    interface.set_register(INT_STATUS, 0x10);
    driver.read_sample().unwrap();
    assert_eq!(interface.fifo_resets(), resets);

    interface.set_register(INT_STATUS, 0x01);
    driver.read_sample().unwrap();
    assert_eq!(interface.fifo_resets(), resets + 1);
}

#[test]
fn test_dmp_reset_leaves_other_user_ctrl_bits() {
    let (mut driver, interface) = create_ready_driver();
    assert_eq!(interface.register(USER_CTRL), 0xC0);
    let fifo_resets = interface.fifo_resets();

    driver.reset_dmp().unwrap();

    interface.with_model(|model| assert_eq!(model.dmp_resets, 1));
    assert_eq!(interface.register(USER_CTRL), 0xC0);
    assert_eq!(interface.fifo_resets(), fifo_resets);
    assert_eq!(driver.status(), DeviceStatus::DmpReady);
}

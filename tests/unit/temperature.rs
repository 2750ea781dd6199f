//! Die temperature conversion

use crate::common::mpu_model::TEMP_OUT_H;
use crate::common::{PacketBuilder, assert_float_eq, create_mock_driver, create_ready_driver};

fn set_raw_temperature(interface: &crate::common::MockInterface, raw: i16) {
    let [high, low] = raw.to_be_bytes();
    interface.set_register(TEMP_OUT_H, high);
    interface.set_register(TEMP_OUT_H + 1, low);
}

#[test]
fn test_zero_raw_is_97_754_f() {
    let (mut driver, interface) = create_mock_driver();
    set_raw_temperature(&interface, 0);

    assert_eq!(driver.read_temperature_raw().unwrap(), 0);
    assert_float_eq(driver.read_temperature_celsius().unwrap(), 36.53, 1e-4);
    assert_float_eq(driver.read_temperature_fahrenheit().unwrap(), 97.754, 1e-3);
}

#[test]
fn test_negative_raw() {
    let (mut driver, interface) = create_mock_driver();
    set_raw_temperature(&interface, -340);

    assert_eq!(driver.read_temperature_raw().unwrap(), -340);
    assert_float_eq(driver.read_temperature_celsius().unwrap(), 35.53, 1e-4);
    assert_float_eq(driver.read_temperature_fahrenheit().unwrap(), 95.954, 1e-3);
}

#[test]
fn test_sample_carries_temperature() {
    let (mut driver, interface) = create_ready_driver();
    set_raw_temperature(&interface, 3400);
    interface.with_model(|model| model.repeat_packet = Some(PacketBuilder::new().build()));

    let sample = driver.read_sample().unwrap();
    // 46.53 °C
    assert_float_eq(sample.temperature_f, 115.754, 1e-3);
}

//! Typed bit-level views of the bitfield registers.
//!
//! The catalog reads these registers as opaque [`Value::Bitfield`](crate::Value::Bitfield)
//! patterns; the views below name the individual flags. Read them through the driver with
//! `BatteryStatus::read_async(&mut gauge)` or convert a raw pattern with `Proxy::from_bits`.
//! Reserved bits have no accessor.

device_descriptor::device! {
    BatteryMode(u16, addr = 0x03, default = 0x0000) {
        internal_charge_controller(pos = 0, width = 1): bool,
        primary_battery_support(pos = 1, width = 1): bool,
        condition_flag(pos = 7, width = 1): bool,
        charge_controller_enabled(pos = 8, width = 1): bool,
        primary_battery(pos = 9, width = 1): bool,
        alarm_mode_disabled(pos = 13, width = 1): bool,
        charger_mode_disabled(pos = 14, width = 1): bool,
        capacity_mode(pos = 15, width = 1): CapacityMode {
            // mAh and mA
            Current = 0,
            // 10 mWh and 10 mW
            Power = 1
        }
    }

    BatteryStatus(u16, addr = 0x16) {
        // Result of the last SMBus command.
        error_code(pos = 0, width = 4): ErrorCode {
            Ok = 0,
            Busy = 1,
            ReservedCommand = 2,
            UnsupportedCommand = 3,
            AccessDenied = 4,
            OverflowUnderflow = 5,
            BadSize = 6,
            UnknownError = 7
        },
        fully_discharged(pos = 4, width = 1): bool,
        fully_charged(pos = 5, width = 1): bool,
        discharging(pos = 6, width = 1): bool,
        initialized(pos = 7, width = 1): bool,
        remaining_time_alarm(pos = 8, width = 1): bool,
        remaining_capacity_alarm(pos = 9, width = 1): bool,
        terminate_discharge_alarm(pos = 11, width = 1): bool,
        overtemperature_alarm(pos = 12, width = 1): bool,
        terminate_charge_alarm(pos = 14, width = 1): bool,
        overcharged_alarm(pos = 15, width = 1): bool
    }

    SafetyAlert(u32, addr = 0x50) {
        cell_undervoltage(pos = 0, width = 1): bool,
        cell_overvoltage(pos = 1, width = 1): bool,
        overcurrent_charge_1(pos = 2, width = 1): bool,
        overcurrent_charge_2(pos = 3, width = 1): bool,
        overcurrent_discharge_1(pos = 4, width = 1): bool,
        overcurrent_discharge_2(pos = 5, width = 1): bool,
        overload_discharge(pos = 6, width = 1): bool,
        overload_discharge_latch(pos = 7, width = 1): bool,
        short_circuit_charge(pos = 8, width = 1): bool,
        short_circuit_charge_latch(pos = 9, width = 1): bool,
        short_circuit_discharge(pos = 10, width = 1): bool,
        short_circuit_discharge_latch(pos = 11, width = 1): bool,
        overtemperature_charge(pos = 12, width = 1): bool,
        overtemperature_discharge(pos = 13, width = 1): bool,
        cell_undervoltage_compensated(pos = 14, width = 1): bool,
        overtemperature_fet(pos = 16, width = 1): bool,
        precharge_timeout(pos = 18, width = 1): bool,
        precharge_timeout_suspend(pos = 19, width = 1): bool,
        charge_timeout(pos = 20, width = 1): bool,
        charge_timeout_suspend(pos = 21, width = 1): bool,
        overcharge(pos = 22, width = 1): bool,
        overcharging_current(pos = 23, width = 1): bool,
        overcharging_voltage(pos = 24, width = 1): bool,
        over_precharge_current(pos = 25, width = 1): bool,
        undertemperature_charge(pos = 26, width = 1): bool,
        undertemperature_discharge(pos = 27, width = 1): bool
    }

    SafetyStatus(u32, addr = 0x51) {
        cell_undervoltage(pos = 0, width = 1): bool,
        cell_overvoltage(pos = 1, width = 1): bool,
        overcurrent_charge_1(pos = 2, width = 1): bool,
        overcurrent_charge_2(pos = 3, width = 1): bool,
        overcurrent_discharge_1(pos = 4, width = 1): bool,
        overcurrent_discharge_2(pos = 5, width = 1): bool,
        overload_discharge(pos = 6, width = 1): bool,
        overload_discharge_latch(pos = 7, width = 1): bool,
        short_circuit_charge(pos = 8, width = 1): bool,
        short_circuit_charge_latch(pos = 9, width = 1): bool,
        short_circuit_discharge(pos = 10, width = 1): bool,
        short_circuit_discharge_latch(pos = 11, width = 1): bool,
        overtemperature_charge(pos = 12, width = 1): bool,
        overtemperature_discharge(pos = 13, width = 1): bool,
        cell_undervoltage_compensated(pos = 14, width = 1): bool,
        overtemperature_fet(pos = 16, width = 1): bool,
        precharge_timeout(pos = 18, width = 1): bool,
        charge_timeout(pos = 20, width = 1): bool,
        overcharge(pos = 22, width = 1): bool,
        overcharging_current(pos = 23, width = 1): bool,
        overcharging_voltage(pos = 24, width = 1): bool,
        over_precharge_current(pos = 25, width = 1): bool,
        undertemperature_charge(pos = 26, width = 1): bool,
        undertemperature_discharge(pos = 27, width = 1): bool
    }

    OperationStatus(u32, addr = 0x54) {
        system_present_low(pos = 0, width = 1): bool,
        discharge_fet(pos = 1, width = 1): bool,
        charge_fet(pos = 2, width = 1): bool,
        precharge_fet(pos = 3, width = 1): bool,
        fuse(pos = 5, width = 1): bool,
        btp_interrupt(pos = 7, width = 1): bool,
        // SEC1:SEC0
        security_mode(pos = 8, width = 2): SecurityMode {
            Reserved = 0,
            FullAccess = 1,
            Unsealed = 2,
            Sealed = 3
        },
        shutdown_low_voltage(pos = 10, width = 1): bool,
        safety_status(pos = 11, width = 1): bool,
        permanent_failure(pos = 12, width = 1): bool,
        discharge_disabled(pos = 13, width = 1): bool,
        charge_disabled(pos = 14, width = 1): bool,
        sleep(pos = 15, width = 1): bool,
        shutdown_via_mac(pos = 16, width = 1): bool,
        led_display(pos = 17, width = 1): bool,
        authenticating(pos = 18, width = 1): bool,
        auto_offset_calibration(pos = 19, width = 1): bool,
        calibration_output(pos = 20, width = 1): bool,
        calibration_offset_output(pos = 21, width = 1): bool,
        cell_balancing_xl(pos = 22, width = 1): bool,
        sleep_via_mac(pos = 23, width = 1): bool,
        initializing(pos = 24, width = 1): bool,
        smbus_low_calibration(pos = 25, width = 1): bool,
        sleep_adc_measurement(pos = 26, width = 1): bool,
        sleep_coulomb_counter(pos = 27, width = 1): bool,
        cell_balancing(pos = 28, width = 1): bool,
        emergency_shutdown(pos = 29, width = 1): bool
    }
}

//! Catalog of device model codes.

/// Model names by model code, sorted by code.
///
/// Some names occur under more than one code.
pub static MODELS: &[(u8, &str)] = &[
    (0x01, "AN-301"),
    (0x02, "AN-302"),
    (0x03, "AN-303"),
    (0x04, "AN-304"),
    (0x05, "AN-102D"),
    (0x07, "M100C"),
    (0x08, "M101A"),
    (0x09, "M102A"),
    (0x0a, "M300C"),
    (0x0b, "AN-103A"),
    (0x0c, "AN-101"),
    (0x0d, "AN-102C"),
    (0x0e, "AN-106"),
    (0x0f, "AN-202A"),
    (0x10, "AN-203A"),
    (0x11, "AN-204A"),
    (0x12, "EFM02"),
    (0x13, "kongqihezi"),
    (0x14, "lajitong"),
    (0x15, "GPS"),
    (0x16, "AN-305D"),
    (0x17, "EL300A"),
    (0x18, "CM101"),
    (0x19, "AN-217"),
    (0x1a, "kongqikaiguan"),
    (0x1b, "JTY-GD-H605"),
    (0x1c, "AN-219"),
    (0x1d, "WN_SJSYOA"),
    (0x1e, "xiongpai"),
    (0x20, "AN-220"),
    (0x21, "IA100A"),
    (0x22, "AN-214"),
    (0x23, "AN-215"),
    (0x24, "AN-305A"),
    (0x25, "AN-305B"),
    (0x26, "AN-305C"),
    (0x27, "AN-310"),
    (0x29, "FP100A"),
    (0x2a, "SENSOR_BOX_AGRIC"),
    (0x2b, "SENSOR_BOX_MODBUS"),
    (0x2c, "AN-207"),
    (0x2d, "AN-208"),
    (0x2e, "AN-108B"),
    (0x2f, "AN-122"),
    (0x30, "AN-201C"),
    (0x31, "CU300A"),
    (0x32, "JTY-GD-H605"),
    (0x33, "Ci-TC-01"),
    (0x34, "AN-211A"),
    (0x35, "AN-307"),
    (0x3b, "M101A-AN-113"),
    (0x3c, "M300C-AN-113"),
    (0x3d, "Q9_AN204C"),
    (0x3e, "AJ761"),
    (0x3f, "AN-103C"),
    (0x40, "D-BOX"),
    (0x41, "AN-223"),
    (0x42, "AN_JTY_GD_H386"),
    (0x43, "JC-RS801"),
    (0x44, "AN-306"),
    (0x45, "AN-308"),
    (0x46, "CU803"),
    (0x47, "DS803"),
    (0x48, "DS501"),
    (0x49, "CU600"),
    (0x4a, "CU601"),
    (0x4b, "CU606"),
    (0x4e, "AN-224"),
    (0x4f, "EX-201"),
    (0x50, "M200C"),
    (0x51, "JTY-AN-503A"),
    (0x55, "EX-205"),
];

/// Look up the model name for a model code.
pub fn name(code: u8) -> Option<&'static str> {
    MODELS
        .binary_search_by_key(&code, |(c, _)| *c)
        .ok()
        .map(|i| MODELS[i].1)
}

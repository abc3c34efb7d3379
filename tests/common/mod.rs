#![allow(dead_code)]

use fusion_config::Configurable;
use std::path::PathBuf;

#[derive(Debug, Default, Clone, PartialEq, Configurable)]
#[fusion(rename_all = "PascalCase")]
pub struct Foo {
    pub val_string: String,
}

#[derive(Debug, Default, Clone, PartialEq, Configurable)]
#[fusion(rename_all = "PascalCase")]
pub struct Configuration {
    pub val_string: String,
    pub val_struct: Foo,
    pub val_bool: bool,
    pub val_int: i64,
    pub val_int8: i8,
    pub val_int16: i16,
    pub val_int32: i32,
    pub val_int64: i64,
    pub val_uint: u64,
    pub val_uint8: u8,
    pub val_uint16: u16,
    pub val_uint32: u32,
    pub val_uint64: u64,
    pub val_float32: f32,
    pub val_float64: f64,
    pub val_slice: Vec<String>,
}

pub const ENV_VARS: &[(&str, &str)] = &[
    ("ValString", "abc"),
    ("ValStruct.ValString", "abc"),
    ("ValBool", "true"),
    ("ValInt", "42"),
    ("ValInt8", "5"),
    ("ValInt16", "22"),
    ("ValInt32", "24"),
    ("ValInt64", "-45"),
    ("ValUint", "6246"),
    ("ValUint8", "15"),
    ("ValUint16", "77"),
    ("ValUint32", "2516"),
    ("ValUint64", "156365"),
    ("ValFloat32", "245.5"),
    ("ValFloat64", "11111.5"),
    ("ValSlice", "string1,string2"),
];

pub fn set_envs() {
    for (key, value) in ENV_VARS {
        std::env::set_var(key, value);
    }
}

pub fn clear_envs() {
    for (key, _) in ENV_VARS {
        std::env::remove_var(key);
    }
}

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

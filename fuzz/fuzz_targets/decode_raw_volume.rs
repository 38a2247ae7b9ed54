#![no_main]
use libfuzzer_sys::fuzz_target;
use nifti_mosaic::{Endianness, InMemVolume, NiftiHeader};

fuzz_target!(|data: &[u8]| {
    if data.len() < 8 {
        return;
    }
    let header = NiftiHeader {
        dim: [3, 1 + u16::from(data[0] % 5), 1 + u16::from(data[1] % 5), 1, 1, 1, 1, 1],
        datatype: i16::from_le_bytes([data[2], data[3]]),
        scl_slope: f32::from(data[4]) / 16.,
        ..NiftiHeader::default()
    };
    let endianness = if data[5] % 2 == 0 {
        Endianness::Little
    } else {
        Endianness::Big
    };
    let _ = InMemVolume::from_raw_bytes(&header, data[8..].to_vec(), endianness);
});

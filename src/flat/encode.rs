//! Lossy 8-bit encodings used by the flat records.
//!
//! Normals are stored as signed bytes scaled by [`NORMAL_SCALE`]; crease and
//! bevel weights are stored as unsigned bytes scaled by [`UNIT_SCALE`].
//! Decoding then re-encoding a stored byte always gives the same byte back.
//!
//! A signed byte cannot hold 255, so normals use 127. Encoding a float normal
//! and decoding it again is off by at most `0.5 / 127` (about 0.0039) per
//! component. That is slightly coarser than the `1 / 255` bound of the
//! weights, and the price of keeping the full `[-1, 1]` range in an `i8`.

use nalgebra::Vector3;

/// Scale between a unit normal component and its signed byte.
pub const NORMAL_SCALE: f32 = 127.0;

/// Scale between a [0, 1] weight and its unsigned byte.
pub const UNIT_SCALE: f32 = 255.0;

/// Encode a unit normal as three signed bytes.
#[inline]
pub fn pack_normal(n: &Vector3<f32>) -> [i8; 3] {
    [pack_component(n.x), pack_component(n.y), pack_component(n.z)]
}

#[inline]
fn pack_component(c: f32) -> i8 {
    (c.clamp(-1.0, 1.0) * NORMAL_SCALE).round() as i8
}

/// Decode three signed bytes into a normal.
#[inline]
pub fn unpack_normal(n: [i8; 3]) -> Vector3<f32> {
    Vector3::new(
        n[0] as f32 / NORMAL_SCALE,
        n[1] as f32 / NORMAL_SCALE,
        n[2] as f32 / NORMAL_SCALE,
    )
}

/// Encode a [0, 1] weight as a byte. Out-of-range input is clamped.
#[inline]
pub fn pack_unit(x: f32) -> u8 {
    (x.clamp(0.0, 1.0) * UNIT_SCALE).round() as u8
}

/// Decode a byte into a [0, 1] weight.
#[inline]
pub fn unpack_unit(b: u8) -> f32 {
    b as f32 / UNIT_SCALE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_are_stable() {
        for b in 0..=255u8 {
            assert_eq!(pack_unit(unpack_unit(b)), b);
        }
        for b in -127..=127i8 {
            let n = unpack_normal([b, -b, 0]);
            assert_eq!(pack_normal(&n), [b, -b, 0]);
        }
    }

    #[test]
    fn test_quantization_error() {
        let n = Vector3::new(0.3, -0.8, 0.52);
        let back = unpack_normal(pack_normal(&n));
        for i in 0..3 {
            assert!((back[i] - n[i]).abs() <= 0.5 / NORMAL_SCALE + 1e-6);
        }

        for x in [0.0, 0.1, 0.333, 0.5, 0.999, 1.0] {
            assert!((unpack_unit(pack_unit(x)) - x).abs() <= 1.0 / UNIT_SCALE);
        }
    }

    #[test]
    fn test_clamping() {
        assert_eq!(pack_unit(-0.5), 0);
        assert_eq!(pack_unit(3.0), 255);
        assert_eq!(pack_normal(&Vector3::new(2.0, -2.0, 1.0)), [127, -127, 127]);
    }
}

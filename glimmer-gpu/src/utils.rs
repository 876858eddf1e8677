use core::ops;

use glam::Vec2;

pub fn lerp<T>(a: T, b: T, t: f32) -> T
where
    T: ops::Add<Output = T>,
    T: ops::Sub<Output = T>,
    T: ops::Mul<f32, Output = T>,
    T: Copy,
{
    a + (b - a) * t.clamp(0.0, 1.0)
}

pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();

    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::vec2;

    use super::*;

    #[test]
    fn lerp_clamps() {
        assert_eq!(1.0, lerp(0.0, 1.0, 7.0));
        assert_eq!(0.0, lerp(0.0, 1.0, -7.0));
        assert_eq!(0.5, lerp(0.0, 1.0, 0.5));
    }

    #[test]
    fn rotate_quarter_turn() {
        let v = rotate(vec2(1.0, 0.0), core::f32::consts::FRAC_PI_2);

        assert_relative_eq!(0.0, v.x, epsilon = 1e-6);
        assert_relative_eq!(1.0, v.y, epsilon = 1e-6);
    }
}

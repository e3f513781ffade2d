//! Maps how lucky a roll was onto a colour between red and green.

const HUE_RANGE: f64 = 120.0;
const SATURATION: f64 = 0.8;
const BRIGHTNESS: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn from_hsv(hue: f64, saturation: f64, value: f64) -> Self {
        let (r, g, b) = hsv_to_rgb(hue, saturation, value);
        Self {
            r: (r * 255.0) as u8,
            g: (g * 255.0) as u8,
            b: (b * 255.0) as u8,
        }
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// `0.0` is red, `1.0` is green. Values outside that range are clamped.
pub fn interpolate(value: f64) -> Rgb {
    let value = value.clamp(0.0, 1.0);
    Rgb::from_hsv(value * HUE_RANGE / 360.0, SATURATION, BRIGHTNESS)
}

/// Mean of several normalized values, `None` when there are none.
pub fn average(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// `hue` is a fraction of the full circle.
fn hsv_to_rgb(hue: f64, saturation: f64, value: f64) -> (f64, f64, f64) {
    if saturation == 0.0 {
        return (value, value, value);
    }

    let sector = (hue * 6.0).floor();
    let f = hue * 6.0 - sector;
    let p = value * (1.0 - saturation);
    let q = value * (1.0 - saturation * f);
    let t = value * (1.0 - saturation * (1.0 - f));

    match (sector as i64).rem_euclid(6) {
        0 => (value, t, p),
        1 => (q, value, p),
        2 => (p, value, t),
        3 => (p, q, value),
        4 => (t, p, value),
        _ => (value, p, q),
    }
}

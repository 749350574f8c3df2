pub const IMAGE_SIDE: usize = 28;
pub const IMAGE_PIXELS: usize = IMAGE_SIDE * IMAGE_SIDE;
pub const CLASSES: usize = 10;

/// One labelled 28×28 grayscale digit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub label: u8,
    pub pixels: [u8; IMAGE_PIXELS],
}

impl Sample {
    /// Pixel intensities scaled to [0, 1] (`value / 255.0`), row-major.
    pub fn input(&self) -> Vec<f32> {
        self.pixels.iter().map(|&p| p as f32 / 255.0).collect()
    }

    /// One-hot target over the ten digit classes.
    pub fn target(&self) -> Vec<f32> {
        one_hot(self.label as usize)
    }
}

/// One-hot vector of length [`CLASSES`]; an out-of-range class gives all zeros.
pub fn one_hot(class: usize) -> Vec<f32> {
    let mut v = vec![0.0; CLASSES];
    if let Some(slot) = v.get_mut(class) {
        *slot = 1.0;
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_is_normalized() {
        let mut pixels = [0u8; IMAGE_PIXELS];
        pixels[0] = 255;
        pixels[1] = 51;
        let s = Sample { label: 3, pixels };
        let input = s.input();
        assert_eq!(input.len(), IMAGE_PIXELS);
        assert_eq!(input[0], 1.0);
        assert_eq!(input[1], 0.2);
        assert_eq!(input[2], 0.0);
    }

    #[test]
    fn target_is_one_hot() {
        let s = Sample { label: 7, pixels: [0; IMAGE_PIXELS] };
        let t = s.target();
        assert_eq!(t.len(), CLASSES);
        assert_eq!(t[7], 1.0);
        assert_eq!(t.iter().sum::<f32>(), 1.0);
    }
}

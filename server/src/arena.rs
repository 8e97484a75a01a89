/// Rectangular playing field spanning `[0, width] x [0, height]`.
///
/// Built once per session and only ever read afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arena {
    width: f64,
    height: f64,
}

impl Arena {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }

    /// Edges are inside.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        (0.0..=self.width).contains(&x) && (0.0..=self.height).contains(&y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains() {
        let arena = Arena::new(100.0, 80.0);

        assert!(arena.contains(0.0, 0.0));
        assert!(arena.contains(100.0, 80.0));
        assert!(arena.contains(50.0, 40.0));
        assert!(!arena.contains(-0.1, 40.0));
        assert!(!arena.contains(50.0, 80.1));
        assert!(!arena.contains(f64::NAN, 10.0));
    }

    #[test]
    fn test_center() {
        let arena = Arena::new(100.0, 80.0);
        assert_eq!(arena.center(), (50.0, 40.0));
    }
}

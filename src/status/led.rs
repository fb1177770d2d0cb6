// Scanning LED animation: a cursor bounces along the strip leaving a fading trail

use crate::messages::Rgb;

/// Brightness multiples for the cursor pixel and the two trailing pixels
const TRAIL: [f32; 3] = [2.0, 1.0, 0.5];

/// Pixels to light for one animation frame. Every other LED is off.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LedFrame {
    pub pixels: Vec<(usize, Rgb)>,
}

#[derive(Debug, Clone)]
pub struct LedAnimator {
    count: usize,
    position: isize,
    direction: isize,
    interval: u32,
    cycles: u32,
}

impl LedAnimator {
    pub fn new(count: usize, interval: u32) -> Self {
        Self {
            count,
            position: 0,
            direction: 1,
            interval: interval.max(1),
            cycles: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.position as usize
    }

    pub fn direction(&self) -> isize {
        self.direction
    }

    /// Advance one control cycle; true on the cycles the animation should draw
    pub fn cycle_due(&mut self) -> bool {
        self.cycles += 1;
        if self.cycles >= self.interval {
            self.cycles = 0;
            true
        } else {
            false
        }
    }

    /// Render the current frame in `color`, then move the cursor
    pub fn tick(&mut self, color: Rgb) -> LedFrame {
        if self.count == 0 {
            return LedFrame::default();
        }

        let mut frame = LedFrame::default();
        let mut pos = self.position;
        for &brightness in TRAIL.iter() {
            if self.in_range(pos) {
                frame.pixels.push((pos as usize, color.scaled(brightness)));
            }
            pos -= self.direction;
        }

        let last = self.count as isize - 1;
        self.position += self.direction;
        if self.position > last {
            self.direction = -1;
            self.position = last;
        } else if self.position < 0 {
            self.direction = 1;
            self.position = 0;
        }

        frame
    }

    fn in_range(&self, pos: isize) -> bool {
        pos >= 0 && pos < self.count as isize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const C: Rgb = Rgb::new(40, 20, 10);

    #[test]
    fn test_first_frame_has_only_cursor() {
        let mut a = LedAnimator::new(8, 2);
        let frame = a.tick(C);
        // Trail pixels at -1 and -2 are off the strip
        assert_eq!(frame.pixels, vec![(0, Rgb::new(80, 40, 20))]);
        assert_eq!(a.position(), 1);
    }

    #[test]
    fn test_trail_brightness() {
        let mut a = LedAnimator::new(8, 2);
        a.tick(C);
        a.tick(C);
        let frame = a.tick(C);
        assert_eq!(
            frame.pixels,
            vec![
                (2, Rgb::new(80, 40, 20)),
                (1, Rgb::new(40, 20, 10)),
                (0, Rgb::new(20, 10, 5)),
            ]
        );
    }

    #[test]
    fn test_bounces_at_ends() {
        let mut a = LedAnimator::new(8, 2);
        let mut positions = Vec::new();
        for _ in 0..18 {
            positions.push(a.position());
            a.tick(C);
        }
        assert_eq!(
            positions,
            vec![0, 1, 2, 3, 4, 5, 6, 7, 7, 6, 5, 4, 3, 2, 1, 0, 0, 1]
        );
    }

    #[test]
    fn test_direction_inverts_only_at_boundary() {
        let mut a = LedAnimator::new(5, 1);
        let mut prev_dir = a.direction();
        for _ in 0..100 {
            let before = a.position();
            a.tick(C);
            assert!(a.position() < 5);
            if a.direction() != prev_dir {
                // Flip happens on the tick that would step past an end
                assert!(before == 0 || before == 4, "flipped at {}", before);
                assert_eq!(a.position(), before);
            }
            prev_dir = a.direction();
        }
    }

    #[test]
    fn test_trail_after_bounce_stays_on_strip() {
        let mut a = LedAnimator::new(4, 2);
        for _ in 0..4 {
            a.tick(C);
        }
        // Cursor clamped to 3 and now moving down; trail extends upwards off the strip
        let frame = a.tick(C);
        assert_eq!(frame.pixels, vec![(3, Rgb::new(80, 40, 20))]);
    }

    #[test]
    fn test_empty_strip() {
        let mut a = LedAnimator::new(0, 2);
        assert!(a.tick(C).pixels.is_empty());
        assert_eq!(a.position(), 0);
    }

    #[test]
    fn test_single_led() {
        let mut a = LedAnimator::new(1, 2);
        for _ in 0..5 {
            let frame = a.tick(C);
            assert_eq!(frame.pixels.len(), 1);
            assert_eq!(a.position(), 0);
        }
    }

    #[test]
    fn test_cycle_due_every_other_cycle() {
        let mut a = LedAnimator::new(8, 2);
        let due: Vec<bool> = (0..6).map(|_| a.cycle_due()).collect();
        assert_eq!(due, vec![false, true, false, true, false, true]);
    }
}

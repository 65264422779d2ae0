/// Share of a whole, in percent. Values above 100 are allowed, presentation decides whether to
/// clamp.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percentage(f64);

impl Percentage {
    /// `part` out of `whole`. A zero `whole` counts as complete.
    pub fn of(part: u32, whole: u32) -> Percentage {
        if whole == 0 {
            return Percentage(100.);
        }
        Percentage(part as f64 / whole as f64 * 100.)
    }

    /// Rounded to a whole percent and capped at 100, the way progress is displayed.
    pub fn display_clamped(self) -> u32 {
        self.0.round().min(100.) as u32
    }
}

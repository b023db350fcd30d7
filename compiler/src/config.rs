/// The repetition bound above which a repeat is treated as unbounded.
pub const DEFAULT_REPEAT_CUTOFF: usize = 100;

/// Options shared by the translator and both automaton builders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Upper repetition bounds greater than this are compiled as if
    /// unbounded.
    pub repeat_cutoff: usize,
}

impl Config {
    #[must_use]
    pub fn with_repeat_cutoff(mut self, repeat_cutoff: usize) -> Self {
        self.repeat_cutoff = repeat_cutoff;
        self
    }

    /// Returns the bound a repetition is compiled with, `None` meaning
    /// unbounded.
    pub(crate) fn effective_max(&self, max: Option<usize>) -> Option<usize> {
        max.filter(|&max| max <= self.repeat_cutoff)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repeat_cutoff: DEFAULT_REPEAT_CUTOFF,
        }
    }
}

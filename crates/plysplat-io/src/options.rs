use plysplat_core::math_utils::MAX_SH_DEGREE;

/// Settings for decoding a splat PLY file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    sh_degree: u8,
    parallel: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            sh_degree: 0,
            parallel: false,
        }
    }
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requested harmonics degree. Requests above what a file provides are
    /// clamped during decoding, never rejected.
    pub fn sh_degree(&self) -> u8 {
        self.sh_degree
    }

    pub fn set_sh_degree(&mut self, degree: u8) {
        self.sh_degree = degree.min(MAX_SH_DEGREE);
    }

    pub fn with_sh_degree(mut self, degree: u8) -> Self {
        self.set_sh_degree(degree);
        self
    }

    /// Whether packed serialization should split rows across threads.
    ///
    /// Has no effect unless the `parallel` feature is enabled.
    pub fn parallel(&self) -> bool {
        self.parallel
    }

    pub fn set_parallel(&mut self, parallel: bool) {
        self.parallel = parallel;
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.set_parallel(parallel);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_setters() {
        let options = DecodeOptions::new();
        assert_eq!(options.sh_degree(), 0);
        assert!(!options.parallel());

        let options = options.with_sh_degree(9).with_parallel(true);
        assert_eq!(options.sh_degree(), MAX_SH_DEGREE);
        assert!(options.parallel());
    }
}

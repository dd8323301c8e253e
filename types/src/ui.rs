/// UI configuration options derived from config/environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiOptions {
    pub ascii_only: bool,
    pub high_contrast: bool,
    /// Freeze flicker and confetti; layers still drop so landings are reported.
    pub reduced_motion: bool,
}

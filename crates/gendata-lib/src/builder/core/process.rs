#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x08000000;

/// Extension trait for child processes spawned by the builder.
pub trait GeneratorCommandExt {
    /// Hides the console window on Windows. No-op on other platforms.
    fn suppress_console(&mut self) -> &mut Self;
}

impl GeneratorCommandExt for tokio::process::Command {
    fn suppress_console(&mut self) -> &mut Self {
        #[cfg(windows)]
        {
            self.creation_flags(CREATE_NO_WINDOW);
        }
        self
    }
}

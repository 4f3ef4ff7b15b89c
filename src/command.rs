use std::process::Command;

/// External-command capability behind `chart`/`dchart`.
///
/// The engine never spawns processes directly; it goes through this trait
/// so tests can substitute a fake.
pub trait CommandRunner {
    /// Run a command line, returning its captured standard output.
    fn run(&self, cmdline: &str) -> Result<Vec<u8>, String>;
}

/// Production runner: hands the command line to `sh -c`.
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    fn run(&self, cmdline: &str) -> Result<Vec<u8>, String> {
        let output = Command::new("sh")
            .arg("-c")
            .arg(cmdline)
            .output()
            .map_err(|e| e.to_string())?;
        if !output.status.success() {
            return Err(format!("exit status {}", output.status));
        }
        Ok(output.stdout)
    }
}

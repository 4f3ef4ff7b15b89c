use proptest::prelude::*;

use decksh::{CommandRunner, Interp};

/// No real subprocesses under fuzzing.
struct NullRunner;

impl CommandRunner for NullRunner {
    fn run(&self, _cmdline: &str) -> Result<Vec<u8>, String> {
        Ok(Vec::new())
    }
}

proptest! {
    #[test]
    fn doesnt_crash(s in "\\PC*") {
        let mut out = Vec::new();
        let mut interp = Interp::new(Box::new(NullRunner));
        let _ = interp.run(&s, &mut out);
    }

    #[test]
    fn statement_lines_dont_crash(s in "(text|rect|circle|for|li|slide|x)( [-0-9a-z\"=\\[\\]]{0,12}){0,6}\n?") {
        let mut out = Vec::new();
        let mut interp = Interp::new(Box::new(NullRunner));
        let _ = interp.run(&s, &mut out);
    }
}

//! Pipeline driver.
//!
//! Lines stream through tokenize, resolve, dispatch. A `for` header
//! switches to buffering: body lines are collected verbatim up to the
//! first `efor`, then replayed once per iteration value with the loop
//! variable substituted wherever it stands alone as a token. Replay
//! re-enters the pipeline, so a buffered inner `for` triggers buffering
//! again; the end of a line source acts as an implicit terminator, which
//! is what lets a tail-nested inner loop replay at all.

use std::fs;
use std::io::{self, Write};

use crate::command::CommandRunner;
use crate::dispatch::{self, Stmt};
use crate::error::Error;
use crate::eval::{self, Environment};
use crate::lexer;

pub struct Interp {
    pub(crate) env: Environment,
    pub(crate) runner: Box<dyn CommandRunner>,
    errors: Vec<Error>,
}

impl Interp {
    pub fn new(runner: Box<dyn CommandRunner>) -> Interp {
        Interp {
            env: Environment::new(),
            runner,
            errors: Vec::new(),
        }
    }

    /// Compile a whole script. Returns `Err` only when the output sink
    /// fails; statement-level errors accumulate and are retrievable from
    /// [`Interp::errors`] afterwards.
    pub fn run(&mut self, src: &str, w: &mut dyn Write) -> io::Result<()> {
        let lines: Vec<(usize, String)> = src
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.to_string()))
            .collect();
        self.run_lines(&lines, w)
    }

    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<Error> {
        self.errors
    }

    pub(crate) fn report(&mut self, e: Error) {
        self.errors.push(e);
    }

    pub(crate) fn run_lines(
        &mut self,
        lines: &[(usize, String)],
        w: &mut dyn Write,
    ) -> io::Result<()> {
        let mut i = 0;
        while i < lines.len() {
            let (line, raw) = &lines[i];
            let tokens = match lexer::tokenize(raw) {
                Ok(t) => t,
                Err(_) => {
                    self.report(Error::UnterminatedQuote { line: *line });
                    i += 1;
                    continue;
                }
            };
            if tokens.is_empty() {
                i += 1;
                continue;
            }
            match tokens[0].as_str() {
                "for" => {
                    let end = body_end(lines, i + 1, "efor");
                    self.run_for(*line, &tokens, &lines[i + 1..end], w)?;
                    i = end + 1;
                }
                "data" => {
                    let end = body_end(lines, i + 1, "edata");
                    self.write_data(*line, &tokens, &lines[i + 1..end]);
                    i = end + 1;
                }
                // stray terminators are skipped, not errors
                "efor" | "edata" => i += 1,
                _ => {
                    self.statement(*line, tokens, w)?;
                    i += 1;
                }
            }
        }
        Ok(())
    }

    /// Resolve and dispatch one statement line.
    pub(crate) fn statement(
        &mut self,
        line: usize,
        mut tokens: Vec<String>,
        w: &mut dyn Write,
    ) -> io::Result<()> {
        // eager substitution: everything after the keyword/target sees
        // the results of prior assignments
        for t in tokens.iter_mut().skip(1) {
            *t = self.env.resolve(t);
        }
        let keyword = tokens[0].clone();
        let result = if let Some(gen) = dispatch::generator(&keyword) {
            let stmt = Stmt {
                line,
                keyword: &keyword,
                args: &tokens[1..],
            };
            gen(self, w, &stmt)
        } else if Environment::is_assignment(&tokens) {
            self.env.assign(&tokens, line)
        } else {
            // unrecognized keyword: not an error
            Ok(())
        };
        match result {
            Ok(()) => Ok(()),
            Err(Error::Io(e)) => Err(e),
            Err(e) => {
                self.report(e);
                Ok(())
            }
        }
    }

    fn run_for(
        &mut self,
        line: usize,
        header: &[String],
        body: &[(usize, String)],
        w: &mut dyn Write,
    ) -> io::Result<()> {
        let values = match self.loop_values(line, header) {
            Ok(v) => v,
            Err(e) => {
                // body already consumed; emit nothing for this loop
                self.report(e);
                return Ok(());
            }
        };
        let var = &header[1];
        for value in &values {
            let replay: Vec<(usize, String)> = body
                .iter()
                .map(|(n, raw)| (*n, substitute(raw, var, value)))
                .collect();
            self.run_lines(&replay, w)?;
        }
        Ok(())
    }

    /// Compute the iteration values for a loop header, trying the vector,
    /// file, and numeric shapes in that order.
    fn loop_values(&self, line: usize, header: &[String]) -> Result<Vec<String>, Error> {
        let shape = || Error::BadLoop {
            line,
            reason: "expected var=begin end [incr], var=[items], or var=\"file\"".to_string(),
        };
        if header.len() < 4 || header[2] != "=" {
            return Err(shape());
        }
        let args: Vec<String> = header[3..].iter().map(|t| self.env.resolve(t)).collect();

        if args[0] == "[" {
            if args.last().map(String::as_str) != Some("]") {
                return Err(shape());
            }
            return Ok(args[1..args.len() - 1].to_vec());
        }

        if args.len() == 1 && lexer::is_quoted(&args[0]) {
            let path = lexer::unquote(&args[0]);
            let text = fs::read_to_string(path).map_err(|e| Error::File {
                line,
                path: path.to_string(),
                source: e,
            })?;
            // file contents iterate as strings
            return Ok(text.lines().map(|l| format!("\"{l}\"")).collect());
        }

        if args.len() == 2 || args.len() == 3 {
            let begin = eval::number(&args[0], line)?;
            let end = eval::number(&args[1], line)?;
            let incr = match args.get(2) {
                Some(t) => eval::number(t, line)?,
                None => 1.0,
            };
            if incr <= 0.0 {
                return Err(Error::BadLoop {
                    line,
                    reason: "increment must be positive".to_string(),
                });
            }
            let mut values = Vec::new();
            let mut v = begin;
            while v <= end {
                values.push(eval::fmt_num(v));
                v += incr;
            }
            return Ok(values);
        }

        Err(shape())
    }

    /// `data "file"` ... `edata`: the body is written verbatim to the
    /// named file; nothing reaches the markup stream.
    fn write_data(&mut self, line: usize, header: &[String], body: &[(usize, String)]) {
        if header.len() != 2 {
            self.report(Error::Usage {
                line,
                usage: "data \"file\"".to_string(),
            });
            return;
        }
        let path = self.env.resolve(&header[1]);
        let path = lexer::unquote(&path).to_string();
        let mut text = String::new();
        for (_, raw) in body {
            text.push_str(raw);
            text.push('\n');
        }
        if let Err(e) = fs::write(&path, text) {
            self.report(Error::File {
                line,
                path,
                source: e,
            });
        }
    }
}

/// Index of the line whose first token is `term`, or `lines.len()` when
/// the source runs out first.
fn body_end(lines: &[(usize, String)], from: usize, term: &str) -> usize {
    let mut j = from;
    while j < lines.len() {
        if let Ok(t) = lexer::tokenize(&lines[j].1) {
            if t.first().map(String::as_str) == Some(term) {
                return j;
            }
        }
        j += 1;
    }
    j
}

/// Replace the loop variable wherever it appears as a standalone token.
fn substitute(raw: &str, var: &str, value: &str) -> String {
    match lexer::tokenize(raw) {
        Ok(tokens) if !tokens.is_empty() => tokens
            .iter()
            .map(|t| if t == var { value } else { t.as_str() })
            .collect::<Vec<_>>()
            .join(" "),
        _ => raw.to_string(),
    }
}

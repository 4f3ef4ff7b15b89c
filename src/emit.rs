//! Markup emitter.
//!
//! Pure formatting over `io::Write`: one tag (or a start/end pair) per
//! validated statement. Arity and type checks happen before control gets
//! here. Optional trailing arguments become attributes positionally; an
//! absent argument produces no attribute.

use std::io::{self, Write};

pub const TEXT_OPTS: &[&str] = &["font", "color", "opacity", "link"];
pub const FILE_OPTS: &[&str] = &["font", "color", "opacity", "lp"];
pub const LIST_OPTS: &[&str] = &["font", "color", "opacity", "lp"];
pub const IMAGE_OPTS: &[&str] = &["scale", "link"];
pub const SHAPE_OPTS: &[&str] = &["color", "opacity"];
pub const LINE_OPTS: &[&str] = &["sp", "color", "opacity"];

/// Escape free text for markup content.
pub fn xmlesc(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}

fn attrs(w: &mut dyn Write, names: &[&str], vals: &[String]) -> io::Result<()> {
    for (name, val) in names.iter().zip(vals.iter()) {
        write!(w, " {name}=\"{}\"", crate::lexer::unquote(val))?;
    }
    Ok(())
}

pub fn open(w: &mut dyn Write, tag: &str) -> io::Result<()> {
    writeln!(w, "<{tag}>")
}

pub fn close(w: &mut dyn Write, tag: &str) -> io::Result<()> {
    writeln!(w, "</{tag}>")
}

pub fn canvas(w: &mut dyn Write, width: &str, height: &str) -> io::Result<()> {
    writeln!(w, "<canvas width=\"{width}\" height=\"{height}\"/>")
}

pub fn slide(w: &mut dyn Write, opts: &[String]) -> io::Result<()> {
    write!(w, "<slide")?;
    attrs(w, &["bg", "fg"], opts)?;
    writeln!(w, ">")
}

pub fn text(
    w: &mut dyn Write,
    content: &str,
    x: &str,
    y: &str,
    size: &str,
    align: Option<&str>,
    opts: &[String],
) -> io::Result<()> {
    write!(w, "<text xp=\"{x}\" yp=\"{y}\" sp=\"{size}\"")?;
    if let Some(a) = align {
        write!(w, " align=\"{a}\"")?;
    }
    attrs(w, TEXT_OPTS, opts)?;
    writeln!(w, ">{}</text>", xmlesc(content))
}

pub fn textblock(
    w: &mut dyn Write,
    content: &str,
    x: &str,
    y: &str,
    width: &str,
    size: &str,
    opts: &[String],
) -> io::Result<()> {
    write!(w, "<text xp=\"{x}\" yp=\"{y}\" wp=\"{width}\" sp=\"{size}\"")?;
    attrs(w, TEXT_OPTS, opts)?;
    writeln!(w, ">{}</text>", xmlesc(content))
}

pub fn textfile(
    w: &mut dyn Write,
    file: &str,
    x: &str,
    y: &str,
    size: &str,
    opts: &[String],
) -> io::Result<()> {
    write!(w, "<text file=\"{file}\" xp=\"{x}\" yp=\"{y}\" sp=\"{size}\"")?;
    attrs(w, FILE_OPTS, opts)?;
    writeln!(w, "/>")
}

pub fn textcode(
    w: &mut dyn Write,
    file: &str,
    x: &str,
    y: &str,
    width: &str,
    size: &str,
    color: Option<&str>,
) -> io::Result<()> {
    write!(
        w,
        "<text file=\"{file}\" xp=\"{x}\" yp=\"{y}\" wp=\"{width}\" sp=\"{size}\" type=\"code\""
    )?;
    if let Some(c) = color {
        write!(w, " color=\"{c}\"")?;
    }
    writeln!(w, "/>")
}

#[allow(clippy::too_many_arguments)]
pub fn image(
    w: &mut dyn Write,
    name: &str,
    caption: Option<&str>,
    x: &str,
    y: &str,
    width: &str,
    height: &str,
    opts: &[String],
) -> io::Result<()> {
    write!(w, "<image name=\"{name}\"")?;
    if let Some(c) = caption {
        write!(w, " caption=\"{}\"", xmlesc(c))?;
    }
    write!(
        w,
        " xp=\"{x}\" yp=\"{y}\" width=\"{width}\" height=\"{height}\""
    )?;
    attrs(w, IMAGE_OPTS, opts)?;
    writeln!(w, "/>")
}

pub fn list_open(
    w: &mut dyn Write,
    x: &str,
    y: &str,
    size: &str,
    ltype: Option<&str>,
    align: Option<&str>,
    opts: &[String],
) -> io::Result<()> {
    write!(w, "<list xp=\"{x}\" yp=\"{y}\" sp=\"{size}\"")?;
    if let Some(t) = ltype {
        write!(w, " type=\"{t}\"")?;
    }
    if let Some(a) = align {
        write!(w, " align=\"{a}\"")?;
    }
    attrs(w, LIST_OPTS, opts)?;
    writeln!(w, ">")
}

pub fn listitem(w: &mut dyn Write, content: &str) -> io::Result<()> {
    writeln!(w, "<li>{}</li>", xmlesc(content))
}

/// Four-sided shapes: `rect`, `ellipse`, and the rounded rect.
pub fn quad(
    w: &mut dyn Write,
    tag: &str,
    x: &str,
    y: &str,
    width: &str,
    height: &str,
    radius: Option<&str>,
    opts: &[String],
) -> io::Result<()> {
    write!(w, "<{tag} xp=\"{x}\" yp=\"{y}\" wp=\"{width}\" hp=\"{height}\"")?;
    if let Some(r) = radius {
        write!(w, " r=\"{r}\"")?;
    }
    attrs(w, SHAPE_OPTS, opts)?;
    writeln!(w, "/>")
}

pub fn polygon(w: &mut dyn Write, xs: &str, ys: &str, opts: &[String]) -> io::Result<()> {
    write!(w, "<polygon xc=\"{xs}\" yc=\"{ys}\"")?;
    attrs(w, SHAPE_OPTS, opts)?;
    writeln!(w, "/>")
}

pub fn line(
    w: &mut dyn Write,
    x1: &str,
    y1: &str,
    x2: &str,
    y2: &str,
    opts: &[String],
) -> io::Result<()> {
    write!(w, "<line xp1=\"{x1}\" yp1=\"{y1}\" xp2=\"{x2}\" yp2=\"{y2}\"")?;
    attrs(w, LINE_OPTS, opts)?;
    writeln!(w, "/>")
}

#[allow(clippy::too_many_arguments)]
pub fn curve(
    w: &mut dyn Write,
    x1: &str,
    y1: &str,
    x2: &str,
    y2: &str,
    x3: &str,
    y3: &str,
    opts: &[String],
) -> io::Result<()> {
    write!(
        w,
        "<curve xp1=\"{x1}\" yp1=\"{y1}\" xp2=\"{x2}\" yp2=\"{y2}\" xp3=\"{x3}\" yp3=\"{y3}\""
    )?;
    attrs(w, LINE_OPTS, opts)?;
    writeln!(w, "/>")
}

#[allow(clippy::too_many_arguments)]
pub fn arc(
    w: &mut dyn Write,
    x: &str,
    y: &str,
    width: &str,
    height: &str,
    a1: &str,
    a2: &str,
    opts: &[String],
) -> io::Result<()> {
    write!(
        w,
        "<arc xp=\"{x}\" yp=\"{y}\" wp=\"{width}\" hp=\"{height}\" a1=\"{a1}\" a2=\"{a2}\""
    )?;
    attrs(w, LINE_OPTS, opts)?;
    writeln!(w, "/>")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn escapes_content() {
        assert_eq!(xmlesc("a < b & c > d"), "a &lt; b &amp; c &gt; d");
    }

    #[test]
    fn optional_attrs_fill_left_to_right() {
        let mut out = Vec::new();
        text(&mut out, "hi", "10", "20", "3", None, &s(&["serif", "red"])).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "<text xp=\"10\" yp=\"20\" sp=\"3\" font=\"serif\" color=\"red\">hi</text>\n"
        );
    }

    #[test]
    fn no_opts_no_attrs() {
        let mut out = Vec::new();
        quad(&mut out, "rect", "1", "2", "3", "4", None, &[]).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "<rect xp=\"1\" yp=\"2\" wp=\"3\" hp=\"4\"/>\n"
        );
    }
}
